//! Two-phase parallel ingestion
//!
//! Phase 1 processes every resource in parallel and drains completely before
//! phase 2 mirrors any relationship, so an edge never races its endpoints'
//! pair creation. Per-item failures are collected; an invariant violation
//! in phase 1 stops ingestion before any relationship is touched.

use crate::duplicator::RelationshipDuplicator;
use crate::error::GraphError;
use crate::processor::DualNodeProcessor;
use crate::store::{CommitOutcome, LinkOutcome};
use rayon::prelude::*;
use std::time::Instant;
use twin_model::{DiscoveredRelationship, DiscoveredResource};

/// Ingestion phase of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Resources,
    Relationships,
}

/// One resource or relationship that could not be ingested
#[derive(Debug)]
pub struct IngestFailure {
    pub phase: IngestPhase,
    /// Human-readable item label (original id or `from -[type]-> to`)
    pub item: String,
    pub error: GraphError,
}

/// Aggregated ingestion outcome
#[derive(Debug, Default)]
pub struct IngestReport {
    pub pairs_created: usize,
    pub pairs_updated: usize,
    pub edges_created: usize,
    pub edges_updated: usize,
    pub failures: Vec<IngestFailure>,
    pub duration_ms: u64,
}

impl IngestReport {
    /// Whether every item was ingested
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures of one phase
    pub fn failures_in(&self, phase: IngestPhase) -> impl Iterator<Item = &IngestFailure> {
        self.failures.iter().filter(move |f| f.phase == phase)
    }
}

/// Runs both ingestion phases
#[derive(Debug, Clone)]
pub struct Ingestor {
    processor: DualNodeProcessor,
    duplicator: RelationshipDuplicator,
}

impl Ingestor {
    #[must_use]
    pub fn new(processor: DualNodeProcessor) -> Self {
        let duplicator = RelationshipDuplicator::new(std::sync::Arc::clone(processor.store()));
        Self {
            processor,
            duplicator,
        }
    }

    /// Ingest resources, then relationships
    ///
    /// # Errors
    /// Returns the first fatal (invariant) error; per-item failures are
    /// reported in [`IngestReport::failures`]
    pub fn ingest(
        &self,
        resources: &[DiscoveredResource],
        relationships: &[DiscoveredRelationship],
    ) -> Result<IngestReport, GraphError> {
        let start = Instant::now();
        let mut report = IngestReport::default();

        // Phase 1; collect() is the barrier
        let processed: Vec<_> = resources
            .par_iter()
            .map(|resource| (resource, self.processor.process(resource)))
            .collect();

        for (resource, result) in processed {
            match result {
                Ok(outcome) => match outcome.commit {
                    CommitOutcome::Created => report.pairs_created += 1,
                    CommitOutcome::Updated => report.pairs_updated += 1,
                },
                Err(error) if error.is_fatal() => {
                    tracing::error!(
                        resource = %resource.original_id,
                        %error,
                        "invariant violation, aborting ingestion"
                    );
                    return Err(error);
                }
                Err(error) => {
                    tracing::warn!(resource = %resource.original_id, %error, "resource skipped");
                    report.failures.push(IngestFailure {
                        phase: IngestPhase::Resources,
                        item: resource.original_id.to_string(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            created = report.pairs_created,
            updated = report.pairs_updated,
            failed = report.failures.len(),
            "resource phase complete"
        );

        // Phase 2
        let linked: Vec<_> = relationships
            .par_iter()
            .map(|rel| (rel, self.duplicator.duplicate(rel)))
            .collect();

        for (rel, result) in linked {
            match result {
                Ok(LinkOutcome::Created) => report.edges_created += 1,
                Ok(LinkOutcome::Updated) => report.edges_updated += 1,
                Err(error) => {
                    tracing::warn!(%error, "relationship skipped");
                    report.failures.push(IngestFailure {
                        phase: IngestPhase::Relationships,
                        item: format!("{} -[{}]-> {}", rel.from_id, rel.rel_type, rel.to_id),
                        error,
                    });
                }
            }
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            edges_created = report.edges_created,
            edges_updated = report.edges_updated,
            failed = report.failures.len(),
            duration_ms = report.duration_ms,
            "relationship phase complete"
        );

        Ok(report)
    }
}
