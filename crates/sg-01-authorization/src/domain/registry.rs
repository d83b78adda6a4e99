//! # Authorization Registry
//!
//! Per-type allow-lists plus the credential of every provisioned sensor.

use super::entities::{Credential, SensorIdentity};
use super::errors::AuthorizationError;
use shared_types::{SensorId, SensorType};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Allow-lists and credentials, keyed by sensor id.
#[derive(Debug, Default)]
pub struct AuthorizationRegistry {
    allow_lists: HashMap<SensorType, HashSet<SensorId>>,
    identities: HashMap<SensorId, SensorIdentity>,
}

impl AuthorizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the id prefix names a known type and the id is on that
    /// type's allow-list.
    pub fn is_authorized(&self, sensor_id: &SensorId) -> bool {
        sensor_id
            .sensor_type()
            .and_then(|t| self.allow_lists.get(&t))
            .is_some_and(|allowed| allowed.contains(sensor_id))
    }

    /// Credential of a registered sensor.
    pub fn lookup_credential(&self, sensor_id: &SensorId) -> Result<&Credential, AuthorizationError> {
        self.identities
            .get(sensor_id)
            .map(|identity| &identity.credential)
            .ok_or_else(|| AuthorizationError::NotFound(sensor_id.clone()))
    }

    /// Full identity of a registered sensor.
    pub fn identity(&self, sensor_id: &SensorId) -> Option<&SensorIdentity> {
        self.identities.get(sensor_id)
    }

    /// Provision a sensor: add it to its type's allow-list and store its
    /// credential.
    ///
    /// # Errors
    ///
    /// - `DuplicateSensor` if the id already has a credential
    /// - `TypeMismatch` if the id prefix disagrees with the declared type
    pub fn register(&mut self, identity: SensorIdentity) -> Result<(), AuthorizationError> {
        if identity.sensor_id.sensor_type() != Some(identity.sensor_type) {
            return Err(AuthorizationError::TypeMismatch {
                sensor_id: identity.sensor_id,
                declared: identity.sensor_type,
            });
        }
        if self.identities.contains_key(&identity.sensor_id) {
            return Err(AuthorizationError::DuplicateSensor(identity.sensor_id));
        }

        debug!(
            sensor_id = %identity.sensor_id,
            signed = identity.credential.requires_signature(),
            "[sg-01] Sensor registered"
        );
        self.allow_lists
            .entry(identity.sensor_type)
            .or_default()
            .insert(identity.sensor_id.clone());
        self.identities.insert(identity.sensor_id.clone(), identity);
        Ok(())
    }

    /// Put an id on its type's allow-list without a credential. Such a sensor
    /// passes `is_authorized` but fails `lookup_credential`.
    pub fn allow(&mut self, sensor_id: SensorId) -> Result<(), AuthorizationError> {
        let sensor_type = sensor_id
            .sensor_type()
            .ok_or_else(|| AuthorizationError::UnknownType(sensor_id.clone()))?;
        self.allow_lists.entry(sensor_type).or_default().insert(sensor_id);
        Ok(())
    }

    /// Number of sensors with a credential.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Registered identities, ordered by id.
    pub fn identities(&self) -> Vec<&SensorIdentity> {
        let mut all: Vec<_> = self.identities.values().collect();
        all.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::default_fleet;
    use shared_crypto::SymmetricKey;

    fn registry() -> AuthorizationRegistry {
        let mut registry = AuthorizationRegistry::new();
        for id in default_fleet() {
            let sensor_type = id.sensor_type().unwrap();
            let credential = Credential::symmetric(SymmetricKey::generate());
            registry
                .register(SensorIdentity::new(id, sensor_type, credential))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_fleet_members_are_authorized() {
        let registry = registry();
        for id in default_fleet() {
            assert!(registry.is_authorized(&id), "{id} should be authorized");
            assert!(registry.lookup_credential(&id).is_ok());
        }
        assert_eq!(registry.len(), 25);
    }

    #[test]
    fn test_unlisted_and_unknown_types_are_unauthorized() {
        let registry = registry();
        assert!(!registry.is_authorized(&SensorId::new("soil_06")));
        assert!(!registry.is_authorized(&SensorId::new("bogus_01")));
        assert!(!registry.is_authorized(&SensorId::new("gitthreat_04")));
        assert!(!registry.is_authorized(&SensorId::new("")));
        assert!(!registry.is_authorized(&SensorId::new("soil")));
    }

    #[test]
    fn test_allowed_without_credential() {
        let mut registry = AuthorizationRegistry::new();
        registry.allow(SensorId::new("water_09")).unwrap();
        assert!(registry.is_authorized(&SensorId::new("water_09")));
        assert_eq!(
            registry.lookup_credential(&SensorId::new("water_09")).unwrap_err(),
            AuthorizationError::NotFound(SensorId::new("water_09"))
        );
        assert!(matches!(
            registry.allow(SensorId::new("bogus_01")),
            Err(AuthorizationError::UnknownType(_))
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry();
        let again = SensorIdentity::new(
            SensorId::new("soil_01"),
            SensorType::Soil,
            Credential::symmetric(SymmetricKey::generate()),
        );
        assert_eq!(
            registry.register(again).unwrap_err(),
            AuthorizationError::DuplicateSensor(SensorId::new("soil_01"))
        );
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut registry = AuthorizationRegistry::new();
        let identity = SensorIdentity::new(
            SensorId::new("soil_01"),
            SensorType::Water,
            Credential::symmetric(SymmetricKey::generate()),
        );
        assert!(matches!(
            registry.register(identity),
            Err(AuthorizationError::TypeMismatch { declared: SensorType::Water, .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_identities_sorted() {
        let registry = registry();
        let ids: Vec<_> = registry.identities().iter().map(|i| i.sensor_id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
