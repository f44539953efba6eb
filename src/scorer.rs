//! Engagement scoring
//!
//! This module derives the engagement score and activity status for one
//! principal from its raw activity bundle:
//! - Activity-status buckets from days since the most recent event
//! - Weighted score terms, each clamped to its sub-range before summing
//!
//! Scoring is a pure function of `(bundle, now, weights)`: regenerating a
//! score for unchanged source data at the same instant yields an identical
//! result.

use crate::types::{ActivityStatus, RawActivityBundle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A principal is `active` while its latest event is at most this old
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// Beyond the active window, a principal is `cooling` up to this age and
/// `dormant` past it
pub const COOLING_WINDOW_DAYS: i64 = 90;

/// Weight constants for the engagement score.
///
/// Recency dominates: a currently-quiet principal with historical volume is
/// still a churn risk, and the per-term caps keep any single dimension from
/// saturating the score and masking recency decay. The defaults reconstruct
/// the production weighting; hosts may tune them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Cap of the recency term
    pub recency_max: f64,
    /// Days over which the recency term decays to zero
    pub recency_horizon_days: f64,
    /// Cap of the interaction-volume term
    pub volume_max: f64,
    /// Points per interaction in the trailing 30 days
    pub volume_per_interaction: f64,
    /// Cap of the pipeline term
    pub pipeline_max: f64,
    /// Points per open opportunity
    pub pipeline_per_opportunity: f64,
    /// Cap of the relationship-breadth term
    pub breadth_max: f64,
    /// Points per product or distributor link
    pub breadth_per_link: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            recency_max: 40.0,
            recency_horizon_days: 90.0,
            volume_max: 25.0,
            volume_per_interaction: 5.0,
            pipeline_max: 20.0,
            pipeline_per_opportunity: 4.0,
            breadth_max: 15.0,
            breadth_per_link: 3.0,
        }
    }
}

/// Scored result with its full term breakdown, so hosts can explain a score
/// exactly the way the engine computed it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementScore {
    /// Final 0-100 score
    pub score: u8,
    pub status: ActivityStatus,
    /// Whole days since the latest event; `None` when nothing is dated
    pub days_since_last_activity: Option<i64>,
    pub recency_term: f64,
    pub volume_term: f64,
    pub pipeline_term: f64,
    pub breadth_term: f64,
}

/// Scorer for deriving engagement from a raw activity bundle
pub struct EngagementScorer;

impl EngagementScorer {
    /// Score a bundle at the given instant.
    ///
    /// Total over any well-formed bundle: an empty bundle yields score 0 and
    /// `no_activity`, never an error.
    pub fn score(
        bundle: &RawActivityBundle,
        now: DateTime<Utc>,
        weights: &ScoringWeights,
    ) -> EngagementScore {
        let days = bundle.days_since_last_activity(now);
        let status = classify_status(days, bundle.has_overdue_follow_up(now));

        let recency_term = compute_recency_term(days, weights);
        let volume_term = compute_volume_term(
            bundle.interactions_within_days(now, ACTIVE_WINDOW_DAYS),
            weights,
        );
        let pipeline_term = compute_pipeline_term(bundle.open_opportunity_count(), weights);
        let breadth_term = compute_breadth_term(bundle.relationship_link_count(), weights);

        let total = recency_term + volume_term + pipeline_term + breadth_term;
        let score = total.round().clamp(0.0, 100.0) as u8;

        EngagementScore {
            score,
            status,
            days_since_last_activity: days,
            recency_term,
            volume_term,
            pipeline_term,
            breadth_term,
        }
    }
}

/// Classify activity status from recency and follow-up urgency.
///
/// Re-evaluated fresh on every call; the bucket is whichever applies at the
/// evaluation instant. An overdue follow-up upgrades `cooling`/`dormant` to
/// `at_risk`; it never touches an `active` principal's label.
fn classify_status(days_since_last_activity: Option<i64>, overdue_follow_up: bool) -> ActivityStatus {
    match days_since_last_activity {
        None => ActivityStatus::NoActivity,
        Some(days) if days <= ACTIVE_WINDOW_DAYS => ActivityStatus::Active,
        Some(days) => {
            if overdue_follow_up {
                ActivityStatus::AtRisk
            } else if days <= COOLING_WINDOW_DAYS {
                ActivityStatus::Cooling
            } else {
                ActivityStatus::Dormant
            }
        }
    }
}

/// Recency term: linear decay from the cap to zero over the horizon
fn compute_recency_term(days_since_last_activity: Option<i64>, weights: &ScoringWeights) -> f64 {
    match days_since_last_activity {
        Some(days) => {
            let decay = 1.0 - (days as f64) / weights.recency_horizon_days;
            (weights.recency_max * decay).clamp(0.0, weights.recency_max)
        }
        None => 0.0,
    }
}

/// Volume term: points per recent interaction, capped
fn compute_volume_term(interactions_last_30_days: usize, weights: &ScoringWeights) -> f64 {
    (weights.volume_per_interaction * interactions_last_30_days as f64).min(weights.volume_max)
}

/// Pipeline term: points per open opportunity, capped
fn compute_pipeline_term(open_opportunities: usize, weights: &ScoringWeights) -> f64 {
    (weights.pipeline_per_opportunity * open_opportunities as f64).min(weights.pipeline_max)
}

/// Breadth term: points per product/distributor link, capped
fn compute_breadth_term(relationship_links: usize, weights: &ScoringWeights) -> f64 {
    (weights.breadth_per_link * relationship_links as f64).min(weights.breadth_max)
}
