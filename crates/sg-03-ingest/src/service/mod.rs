//! # Service Layer
//!
//! - `pipeline`: `GatewayIngestPipeline`, the `IngestApi` implementation
//! - `flush`: `FlushCoordinator`, the periodic snapshot-and-clear

pub mod flush;
pub mod pipeline;
