//! In-process gateway: the sg-03 pipeline and flush coordinator sharing one
//! store.

use crate::ports::outbound::TelemetryGateway;
use sg_03_ingest::{
    FlushCoordinator, FlushReport, GatewayIngestPipeline, IngestApi, IngestResult,
    SensorAuthorizer, SnapshotSink, StorageError, TelemetryLog,
};
use shared_types::{EncryptedMessage, Timestamp};
use std::sync::Arc;

pub struct LocalGateway<A: SensorAuthorizer, L: TelemetryLog, S: SnapshotSink> {
    pipeline: Arc<GatewayIngestPipeline<A, L>>,
    flush: Arc<FlushCoordinator<S>>,
}

impl<A: SensorAuthorizer, L: TelemetryLog, S: SnapshotSink> LocalGateway<A, L, S> {
    /// Wire a pipeline to a flush coordinator over the pipeline's store.
    pub fn new(pipeline: GatewayIngestPipeline<A, L>, sink: S) -> Self {
        let flush = FlushCoordinator::new(pipeline.store(), sink);
        Self::from_parts(Arc::new(pipeline), Arc::new(flush))
    }

    /// Use an existing pipeline and coordinator. They must share a store.
    pub fn from_parts(
        pipeline: Arc<GatewayIngestPipeline<A, L>>,
        flush: Arc<FlushCoordinator<S>>,
    ) -> Self {
        Self { pipeline, flush }
    }

    pub fn pipeline(&self) -> &Arc<GatewayIngestPipeline<A, L>> {
        &self.pipeline
    }

    pub fn flush_coordinator(&self) -> &Arc<FlushCoordinator<S>> {
        &self.flush
    }
}

impl<A: SensorAuthorizer, L: TelemetryLog, S: SnapshotSink> TelemetryGateway
    for LocalGateway<A, L, S>
{
    fn deliver(&self, message: &EncryptedMessage, now: Timestamp) -> IngestResult {
        self.pipeline.receive(message, now)
    }

    fn flush(&self, now: Timestamp) -> Result<FlushReport, StorageError> {
        self.flush.flush(now)
    }
}
