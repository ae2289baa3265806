//! End-to-end replica pipeline
//!
//! ingest → verify → emit → validate → detect → split → write.
//!
//! Ingestion per-item failures and dependency violations are collected in
//! the [`PipelineReport`]; invariant and partition violations stop the run
//! before anything is written.

use crate::config::ReplicaConfig;
use crate::emit::{ConfigEmitter, EmittedConfig};
use crate::error::ReplicaError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use twin_graph::{DualGraphStore, DualNodeProcessor, IngestReport, Ingestor, IntegrityReport};
use twin_model::{AbstractedId, DiscoveredRelationship, DiscoveredResource};
use twin_split::{
    split, CommunityDetector, CommunityManifest, CommunitySet, ConnectedComponentsDetector,
};
use twin_validate::{SuiteReport, ValidatorSuite};

/// Outcome of one pipeline run
#[derive(Debug)]
pub struct PipelineReport {
    pub ingest: IngestReport,
    pub integrity: IntegrityReport,
    pub validation: SuiteReport,
    pub manifest: CommunityManifest,
    /// Written paths, manifest last
    pub files: Vec<PathBuf>,
    pub duration_ms: u64,
}

impl PipelineReport {
    /// Nothing skipped and no dependency gaps
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.ingest.is_clean() && self.validation.is_valid()
    }

    /// Turn dependency violations into an error
    ///
    /// # Errors
    /// [`ReplicaError::Validation`] carrying every violation
    pub fn into_result(self) -> Result<Self, ReplicaError> {
        self.validation.clone().into_result()?;
        Ok(self)
    }
}

/// Runs discovered resources through to split configuration files
#[derive(Debug)]
pub struct ReplicaPipeline {
    ingestor: Ingestor,
    store: Arc<DualGraphStore>,
    emitter: Box<dyn ConfigEmitter>,
    detector: Box<dyn CommunityDetector>,
    suite: ValidatorSuite,
    output_dir: PathBuf,
}

impl ReplicaPipeline {
    /// Pipeline over a fresh store
    ///
    /// # Errors
    /// Invalid configuration or unusable seed directory
    pub fn from_config(
        config: &ReplicaConfig,
        emitter: Box<dyn ConfigEmitter>,
    ) -> Result<Self, ReplicaError> {
        Self::with_store(config, emitter, Arc::new(DualGraphStore::new()))
    }

    /// Pipeline over an existing store
    ///
    /// # Errors
    /// Invalid configuration or unusable seed directory
    pub fn with_store(
        config: &ReplicaConfig,
        emitter: Box<dyn ConfigEmitter>,
        store: Arc<DualGraphStore>,
    ) -> Result<Self, ReplicaError> {
        config.validate()?;
        let processor = DualNodeProcessor::new(Arc::clone(&store), Arc::new(config.seed_registry()?))
            .with_abstractor(config.abstractor())
            .with_schema(config.identifier_schema()?);

        Ok(Self {
            ingestor: Ingestor::new(processor),
            store,
            emitter,
            detector: Box::new(ConnectedComponentsDetector),
            suite: config.validator_suite(),
            output_dir: config.output_dir.clone(),
        })
    }

    /// Replace the community detector
    #[must_use]
    pub fn with_detector(mut self, detector: Box<dyn CommunityDetector>) -> Self {
        self.detector = detector;
        self
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<DualGraphStore> {
        &self.store
    }

    /// # Errors
    /// Fatal graph invariant violation, emitter failure, cross-community
    /// references, or a failed write
    pub fn run(
        &self,
        resources: &[DiscoveredResource],
        relationships: &[DiscoveredRelationship],
    ) -> Result<PipelineReport, ReplicaError> {
        let start = Instant::now();

        let ingest = self.ingestor.ingest(resources, relationships)?;
        let integrity = self.store.verify()?;

        let (emitted, topology) = {
            let view = self.store.abstracted();
            (self.emitter.emit(&view)?, view.topology())
        };
        let EmittedConfig { mut config, addresses } = emitted;
        tracing::info!(
            emitter = self.emitter.name(),
            declarations = config.resource_count(),
            "configuration emitted"
        );

        let validation = self.suite.run(&mut config);

        let detected = self.detector.detect(&topology);
        tracing::info!(
            detector = self.detector.name(),
            communities = detected.len(),
            "communities detected"
        );
        let communities = CommunitySet::from_detected(detected)?.relabel(|id| {
            addresses
                .get(&AbstractedId::new(id))
                .map(ToString::to_string)
        });

        let output = split(&config, &communities)?;
        let files = output.write_to_dir(&self.output_dir)?;

        let report = PipelineReport {
            ingest,
            integrity,
            validation,
            manifest: output.manifest,
            files,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        tracing::info!(
            files = report.files.len(),
            violations = report.validation.violation_count(),
            duration_ms = report.duration_ms,
            "pipeline complete"
        );
        Ok(report)
    }
}
