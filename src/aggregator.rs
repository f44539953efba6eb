//! Multi-source activity aggregation
//!
//! For one principal, fans out to the four record sources concurrently and
//! assembles the raw activity bundle. Partial results are never returned; a
//! summary built on incomplete data would silently understate engagement, so
//! the fan-out fails fast on the first hard error instead.

use crate::error::EngineError;
use crate::source::SourceReader;
use crate::types::RawActivityBundle;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default backoff before the single retry of a failed source read
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Aggregator tuning knobs
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Deadline for one whole aggregation; `None` disables the deadline
    pub deadline: Option<Duration>,
    /// Backoff before the single retry of a `SourceUnavailable` read
    pub retry_backoff: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            deadline: None,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Fans out source reads for one principal and assembles the bundle
pub struct ActivityAggregator {
    source: Arc<dyn SourceReader>,
    config: AggregatorConfig,
}

impl ActivityAggregator {
    pub fn new(source: Arc<dyn SourceReader>) -> Self {
        Self::with_config(source, AggregatorConfig::default())
    }

    pub fn with_config(source: Arc<dyn SourceReader>, config: AggregatorConfig) -> Self {
        Self { source, config }
    }

    /// Fetch everything the record store holds for `principal_id`.
    ///
    /// The principal is resolved first; an unknown id fails with `NotFound`.
    /// The four record reads then run concurrently. Each read is retried once
    /// after a backoff when it fails with `SourceUnavailable`; the first error
    /// that survives retry cancels the remaining in-flight reads. When a
    /// deadline is configured and elapses, the call fails with `Cancelled`
    /// and no partial bundle escapes.
    pub async fn aggregate(&self, principal_id: Uuid) -> Result<RawActivityBundle, EngineError> {
        match self.config.deadline {
            Some(deadline) => {
                match tokio::time::timeout(deadline, self.fan_out(principal_id)).await {
                    Ok(result) => result,
                    Err(_) => Err(EngineError::Cancelled(deadline)),
                }
            }
            None => self.fan_out(principal_id).await,
        }
    }

    async fn fan_out(&self, principal_id: Uuid) -> Result<RawActivityBundle, EngineError> {
        let principal = self
            .read_with_retry(|| self.source.fetch_principal(principal_id))
            .await?
            .ok_or(EngineError::NotFound(principal_id))?;

        let (interactions, opportunities, product_associations, distributor_relationships) =
            tokio::try_join!(
                self.read_with_retry(|| self.source.fetch_interactions(principal_id)),
                self.read_with_retry(|| self.source.fetch_opportunities(principal_id)),
                self.read_with_retry(|| self.source.fetch_product_associations(principal_id)),
                self.read_with_retry(|| self.source.fetch_distributor_relationships(principal_id)),
            )?;

        debug!(
            principal_id = %principal_id,
            interactions = interactions.len(),
            opportunities = opportunities.len(),
            products = product_associations.len(),
            distributors = distributor_relationships.len(),
            "aggregated activity bundle"
        );

        Ok(RawActivityBundle {
            principal,
            interactions,
            opportunities,
            product_associations,
            distributor_relationships,
        })
    }

    /// Run a source read, retrying exactly once on `SourceUnavailable`.
    /// `NotFound` and `Cancelled` are surfaced without retry.
    async fn read_with_retry<T, F, Fut>(&self, read: F) -> Result<T, EngineError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        match read().await {
            Err(err) if err.is_retryable() => {
                warn!(
                    error = %err,
                    backoff_ms = self.config.retry_backoff.as_millis() as u64,
                    "source read failed, retrying once"
                );
                tokio::time::sleep(self.config.retry_backoff).await;
                read().await
            }
            other => other,
        }
    }
}
