//! Engine facade
//!
//! This module provides the public API of the engine: per-principal summary,
//! per-principal timeline, and population rollup. It owns the orchestration
//! (aggregate, then run the pure stages) and the rollup fan-out across many
//! principals. All three operations are read-only and safe to call
//! repeatedly.

use crate::aggregator::{ActivityAggregator, AggregatorConfig};
use crate::error::EngineError;
use crate::rollup::{FailedAggregation, PopulationAnalyzer, RollupOutcome, DEFAULT_TOP_N};
use crate::scorer::ScoringWeights;
use crate::source::SourceReader;
use crate::summary::SummaryBuilder;
use crate::timeline::TimelineBuilder;
use crate::types::{PrincipalActivitySummary, Timeline};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// How a population rollup treats per-principal aggregation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// First failure aborts the rollup and cancels in-flight aggregations
    FailFast,
    /// Failed principals are excluded and listed in the outcome
    Tolerate,
}

/// Restricts which principals a population rollup covers
#[derive(Debug, Clone, Default)]
pub struct RollupFilter {
    /// Only include principals currently flagged active
    pub active_only: bool,
    /// Only include principals of this organization type
    pub organization_type: Option<String>,
}

impl RollupFilter {
    fn matches(&self, summary: &PrincipalActivitySummary) -> bool {
        if self.active_only && !summary.active {
            return false;
        }
        if let Some(ref organization_type) = self.organization_type {
            if summary.organization_type != *organization_type {
                return false;
            }
        }
        true
    }
}

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub aggregator: AggregatorConfig,
    /// Concurrent per-principal aggregations during a rollup
    pub rollup_concurrency: usize,
    pub failure_policy: FailurePolicy,
    /// Size of the rollup's top-principals ranking
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            aggregator: AggregatorConfig::default(),
            rollup_concurrency: 8,
            failure_policy: FailurePolicy::FailFast,
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Activity and engagement analytics over a record store.
///
/// # Example
/// ```ignore
/// let engine = ActivityEngine::new(Arc::new(source));
/// let summary = engine.principal_summary(principal_id).await?;
/// println!("{} scored {}", summary.principal_name, summary.engagement_score);
/// ```
pub struct ActivityEngine {
    source: Arc<dyn SourceReader>,
    aggregator: ActivityAggregator,
    config: EngineConfig,
}

impl ActivityEngine {
    /// Create an engine with default configuration
    pub fn new(source: Arc<dyn SourceReader>) -> Self {
        Self::with_config(source, EngineConfig::default())
    }

    pub fn with_config(source: Arc<dyn SourceReader>, config: EngineConfig) -> Self {
        let aggregator =
            ActivityAggregator::with_config(Arc::clone(&source), config.aggregator.clone());
        Self {
            source,
            aggregator,
            config,
        }
    }

    /// Build the activity summary for one principal, evaluated at the
    /// current instant
    pub async fn principal_summary(
        &self,
        principal_id: Uuid,
    ) -> Result<PrincipalActivitySummary, EngineError> {
        self.principal_summary_at(principal_id, Utc::now()).await
    }

    /// Build the activity summary evaluated at an explicit instant.
    ///
    /// For a fixed store state and fixed `now`, repeated calls return
    /// identical summaries.
    pub async fn principal_summary_at(
        &self,
        principal_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<PrincipalActivitySummary, EngineError> {
        let bundle = self.aggregator.aggregate(principal_id).await?;
        Ok(SummaryBuilder::build(&bundle, now, &self.config.weights))
    }

    /// Reconstruct the merged event timeline for one principal
    pub async fn timeline(&self, principal_id: Uuid) -> Result<Timeline, EngineError> {
        let bundle = self.aggregator.aggregate(principal_id).await?;
        Ok(TimelineBuilder::build(&bundle))
    }

    /// Roll up the whole principal population, evaluated at the current
    /// instant
    pub async fn population_rollup(
        &self,
        filter: Option<RollupFilter>,
    ) -> Result<RollupOutcome, EngineError> {
        self.population_rollup_at(filter, Utc::now()).await
    }

    /// Roll up the population at an explicit instant.
    ///
    /// Per-principal aggregations run concurrently, bounded by
    /// `rollup_concurrency`. Under `FailFast` the first failure aborts the
    /// rollup and dropping the stream cancels in-flight aggregations; under
    /// `Tolerate` failed principals are excluded and listed in the outcome.
    pub async fn population_rollup_at(
        &self,
        filter: Option<RollupFilter>,
        now: DateTime<Utc>,
    ) -> Result<RollupOutcome, EngineError> {
        let ids = self.source.fetch_all_principal_ids().await?;
        info!(principals = ids.len(), "building population rollup");

        let mut results = stream::iter(ids)
            .map(|id| async move { (id, self.principal_summary_at(id, now).await) })
            .buffer_unordered(self.config.rollup_concurrency.max(1));

        let mut summaries = Vec::new();
        let mut failures = Vec::new();
        while let Some((principal_id, result)) = results.next().await {
            match result {
                Ok(summary) => summaries.push(summary),
                Err(error) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(error),
                    FailurePolicy::Tolerate => {
                        warn!(
                            principal_id = %principal_id,
                            error = %error,
                            "excluding principal from rollup"
                        );
                        failures.push(FailedAggregation {
                            principal_id,
                            error,
                        });
                    }
                },
            }
        }

        if let Some(filter) = filter {
            summaries.retain(|s| filter.matches(s));
        }

        let rollup = PopulationAnalyzer::rollup(&summaries, self.config.top_n);
        Ok(RollupOutcome { rollup, failures })
    }
}
