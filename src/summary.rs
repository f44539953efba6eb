//! Summary assembly
//!
//! Composes the scorer's output with the bundle's derived counts into the
//! immutable `PrincipalActivitySummary` record consumed by the presentation
//! layer. Pure composition over an already-fetched bundle; the async
//! orchestration around it lives on the engine facade.

use crate::scorer::{EngagementScorer, ScoringWeights, ACTIVE_WINDOW_DAYS, COOLING_WINDOW_DAYS};
use crate::types::{EngagementTier, PrincipalActivitySummary, RawActivityBundle};
use chrono::{DateTime, Utc};

/// Builds the per-principal summary record from a bundle
pub struct SummaryBuilder;

impl SummaryBuilder {
    /// Assemble a summary at the given instant.
    ///
    /// Total over any bundle; a bundle with no events yields a valid
    /// `no_activity` summary, which is distinct from a failed aggregation.
    pub fn build(
        bundle: &RawActivityBundle,
        now: DateTime<Utc>,
        weights: &ScoringWeights,
    ) -> PrincipalActivitySummary {
        let engagement = EngagementScorer::score(bundle, now, weights);

        PrincipalActivitySummary {
            principal_id: bundle.principal.id,
            principal_name: bundle.principal.name.clone(),
            organization_type: bundle.principal.organization_type.clone(),
            active: bundle.principal.active,
            contact_count: bundle.distinct_contact_count() as u32,
            opportunity_count: bundle.opportunities.len() as u32,
            open_opportunity_count: bundle.open_opportunity_count() as u32,
            product_count: bundle.product_associations.len() as u32,
            distributor_count: bundle.distributor_relationships.len() as u32,
            total_interactions: bundle.interactions.len() as u32,
            interactions_last_30_days: bundle.interactions_within_days(now, ACTIVE_WINDOW_DAYS)
                as u32,
            interactions_last_90_days: bundle.interactions_within_days(now, COOLING_WINDOW_DAYS)
                as u32,
            last_activity_date: bundle.last_activity_date(),
            activity_status: engagement.status,
            engagement_score: engagement.score,
            engagement_tier: EngagementTier::from_score(engagement.score),
            avg_interaction_rating: bundle.avg_interaction_rating(),
            follow_ups_required: bundle.follow_ups_required() as u32,
            summary_generated_at: now,
        }
    }
}
