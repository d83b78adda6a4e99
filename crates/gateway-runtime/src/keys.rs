//! # Key Provisioning
//!
//! Loads the gateway and sensor keypairs from a key directory, or generates
//! them, and builds the fleet from them.
//!
//! Layout: `<name>_priv.pem` (PKCS#8) and `<name>_pub.pem` (SPKI) per node,
//! where `<name>` is a sensor id or the gateway id.

use crate::config::KeyConfig;
use sg_04_simulation::{Fleet, SimulationError};
use shared_crypto::{load_private_key, save_private_key, save_public_key, CryptoError, SensorKeyPair};
use shared_types::SensorId;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Key file missing and generation disabled: {0}")]
    Missing(PathBuf),

    #[error("Failed to create key directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Key material error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Fleet provisioning failed: {0}")]
    Provisioning(#[from] SimulationError),
}

pub fn private_key_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}_priv.pem"))
}

pub fn public_key_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}_pub.pem"))
}

/// Load `<name>_priv.pem`, or create it (and `<name>_pub.pem`) when allowed.
pub fn load_or_create(dir: &Path, name: &str, generate_missing: bool) -> Result<SensorKeyPair, KeyError> {
    let private_path = private_key_path(dir, name);
    if private_path.exists() {
        debug!(name, path = %private_path.display(), "Loaded keypair");
        return Ok(load_private_key(&private_path)?);
    }
    if !generate_missing {
        return Err(KeyError::Missing(private_path));
    }

    let keypair = SensorKeyPair::generate();
    save_private_key(&keypair, &private_path)?;
    save_public_key(&keypair.public_key(), &public_key_path(dir, name))?;
    info!(name, path = %private_path.display(), "Generated keypair");
    Ok(keypair)
}

/// Gateway keypair plus a fleet provisioned against it.
pub fn provision_fleet(
    config: &KeyConfig,
    gateway_id: &str,
    sensor_ids: &[SensorId],
    require_signatures: bool,
) -> Result<(SensorKeyPair, Fleet), KeyError> {
    let Some(dir) = config.key_dir.as_deref() else {
        let gateway = SensorKeyPair::generate();
        let fleet = Fleet::generate(&gateway, sensor_ids, require_signatures)?;
        info!(sensors = sensor_ids.len(), "Keys generated in memory");
        return Ok((gateway, fleet));
    };

    std::fs::create_dir_all(dir).map_err(|source| KeyError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let gateway = load_or_create(dir, gateway_id, config.generate_missing)?;
    let members = sensor_ids
        .iter()
        .map(|id| Ok((id.clone(), load_or_create(dir, id.as_str(), config.generate_missing)?)))
        .collect::<Result<Vec<_>, KeyError>>()?;
    let fleet = Fleet::provision(&gateway, members, require_signatures)?;

    info!(
        sensors = sensor_ids.len(),
        key_dir = %dir.display(),
        "Keys provisioned from directory"
    );
    Ok((gateway, fleet))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::load_public_key;

    #[test]
    fn test_generates_then_reloads_same_keys() {
        let dir = tempfile::tempdir().unwrap();
        let first = load_or_create(dir.path(), "soil_01", true).unwrap();
        assert!(public_key_path(dir.path(), "soil_01").exists());

        let second = load_or_create(dir.path(), "soil_01", false).unwrap();
        assert_eq!(first.public_key(), second.public_key());
        assert_eq!(
            load_public_key(&public_key_path(dir.path(), "soil_01")).unwrap(),
            first.public_key()
        );
    }

    #[test]
    fn test_missing_key_without_generation() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_or_create(dir.path(), "soil_02", false),
            Err(KeyError::Missing(_))
        ));
    }

    #[test]
    fn test_provision_from_directory_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let config = KeyConfig {
            key_dir: Some(dir.path().join("keys")),
            generate_missing: true,
        };
        let ids = [SensorId::new("soil_01"), SensorId::new("plant_03")];

        let (gateway_a, fleet_a) = provision_fleet(&config, "gateway_1", &ids, true).unwrap();
        let (gateway_b, fleet_b) = provision_fleet(&config, "gateway_1", &ids, true).unwrap();
        assert_eq!(gateway_a.public_key(), gateway_b.public_key());
        assert_eq!(fleet_a.registry.len(), 2);
        assert_eq!(
            fleet_a.registry.lookup_credential(&ids[1]).unwrap().symmetric_key(),
            fleet_b.registry.lookup_credential(&ids[1]).unwrap().symmetric_key()
        );
    }

    #[test]
    fn test_provision_in_memory() {
        let (_, fleet) = provision_fleet(
            &KeyConfig::default(),
            "gateway_1",
            &[SensorId::new("water_01")],
            false,
        )
        .unwrap();
        assert_eq!(fleet.sensors.len(), 1);
    }
}
