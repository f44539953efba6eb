//! Population rollup
//!
//! Cross-principal statistics over a batch of activity summaries: counts per
//! activity status, population mean engagement, engagement-tier breakdown,
//! and a deterministic top-N ranking. The rollup reads summaries, never
//! mutates them.

use crate::error::EngineError;
use crate::types::{
    ActivityStatus, EngagementTier, PopulationRollup, PrincipalActivitySummary, PrincipalRanking,
    StatusBreakdown, TierBreakdown,
};
use uuid::Uuid;

/// Default size of the top-principals ranking
pub const DEFAULT_TOP_N: usize = 10;

/// One principal that could not be aggregated during a tolerant rollup
#[derive(Debug)]
pub struct FailedAggregation {
    pub principal_id: Uuid,
    pub error: EngineError,
}

/// Rollup paired with the principals that failed to aggregate.
///
/// Under `FailurePolicy::FailFast` the failure list is always empty; under
/// `FailurePolicy::Tolerate` excluded principals are listed here explicitly,
/// never silently dropped.
#[derive(Debug)]
pub struct RollupOutcome {
    pub rollup: PopulationRollup,
    pub failures: Vec<FailedAggregation>,
}

/// Computes population statistics from summaries
pub struct PopulationAnalyzer;

impl PopulationAnalyzer {
    /// Roll up a batch of summaries.
    ///
    /// Total over any batch: an empty batch yields a zero-valued rollup with
    /// mean engagement `0.0`, not an error. Top-N ranking is fully
    /// deterministic: score descending, then most recent last activity (with
    /// undated principals last), then principal id ascending.
    pub fn rollup(summaries: &[PrincipalActivitySummary], top_n: usize) -> PopulationRollup {
        let mut status_counts = StatusBreakdown::default();
        let mut tier_counts = TierBreakdown::default();

        for summary in summaries {
            match summary.activity_status {
                ActivityStatus::NoActivity => status_counts.no_activity += 1,
                ActivityStatus::Active => status_counts.active += 1,
                ActivityStatus::Cooling => status_counts.cooling += 1,
                ActivityStatus::Dormant => status_counts.dormant += 1,
                ActivityStatus::AtRisk => status_counts.at_risk += 1,
            }
            match summary.engagement_tier {
                EngagementTier::High => tier_counts.high += 1,
                EngagementTier::Moderate => tier_counts.moderate += 1,
                EngagementTier::Low => tier_counts.low += 1,
                EngagementTier::Minimal => tier_counts.minimal += 1,
            }
        }

        let average_engagement_score = if summaries.is_empty() {
            0.0
        } else {
            let total: u32 = summaries.iter().map(|s| u32::from(s.engagement_score)).sum();
            f64::from(total) / summaries.len() as f64
        };

        let mut ranked: Vec<PrincipalRanking> = summaries
            .iter()
            .map(|s| PrincipalRanking {
                principal_id: s.principal_id,
                principal_name: s.principal_name.clone(),
                engagement_score: s.engagement_score,
                last_activity_date: s.last_activity_date,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.engagement_score
                .cmp(&a.engagement_score)
                .then_with(|| b.last_activity_date.cmp(&a.last_activity_date))
                .then_with(|| a.principal_id.cmp(&b.principal_id))
        });
        ranked.truncate(top_n);

        PopulationRollup {
            total_principals: summaries.len(),
            status_counts,
            average_engagement_score,
            tier_counts,
            top_principals: ranked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;

    fn make_summary(
        name: &str,
        score: u8,
        status: ActivityStatus,
        last_activity: Option<DateTime<Utc>>,
    ) -> PrincipalActivitySummary {
        PrincipalActivitySummary {
            principal_id: Uuid::new_v4(),
            principal_name: name.to_string(),
            organization_type: "manufacturer".to_string(),
            active: true,
            contact_count: 0,
            opportunity_count: 0,
            open_opportunity_count: 0,
            product_count: 0,
            distributor_count: 0,
            total_interactions: 0,
            interactions_last_30_days: 0,
            interactions_last_90_days: 0,
            last_activity_date: last_activity,
            activity_status: status,
            engagement_score: score,
            engagement_tier: EngagementTier::from_score(score),
            avg_interaction_rating: None,
            follow_ups_required: 0,
            summary_generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_batch_yields_zero_valued_rollup() {
        let rollup = PopulationAnalyzer::rollup(&[], DEFAULT_TOP_N);

        assert_eq!(rollup.total_principals, 0);
        assert_eq!(rollup.average_engagement_score, 0.0);
        assert_eq!(rollup.status_counts, StatusBreakdown::default());
        assert_eq!(rollup.tier_counts, TierBreakdown::default());
        assert!(rollup.top_principals.is_empty());
    }

    #[test]
    fn test_mean_and_top_one_over_three_principals() {
        let now = Utc::now();
        let summaries = vec![
            make_summary("Low", 10, ActivityStatus::Dormant, Some(now - Duration::days(120))),
            make_summary("Mid", 50, ActivityStatus::Cooling, Some(now - Duration::days(45))),
            make_summary("Top", 90, ActivityStatus::Active, Some(now - Duration::days(2))),
        ];

        let rollup = PopulationAnalyzer::rollup(&summaries, 1);

        // (10 + 50 + 90) / 3 = 50
        assert_eq!(rollup.average_engagement_score, 50.0);
        assert_eq!(rollup.top_principals.len(), 1);
        assert_eq!(rollup.top_principals[0].principal_name, "Top");
        assert_eq!(rollup.top_principals[0].engagement_score, 90);
    }

    #[test]
    fn test_status_and_tier_breakdowns() {
        let now = Utc::now();
        let summaries = vec![
            make_summary("A", 0, ActivityStatus::NoActivity, None),
            make_summary("B", 80, ActivityStatus::Active, Some(now)),
            make_summary("C", 85, ActivityStatus::Active, Some(now)),
            make_summary("D", 30, ActivityStatus::Cooling, Some(now - Duration::days(50))),
            make_summary("E", 12, ActivityStatus::AtRisk, Some(now - Duration::days(100))),
        ];

        let rollup = PopulationAnalyzer::rollup(&summaries, DEFAULT_TOP_N);

        assert_eq!(
            rollup.status_counts,
            StatusBreakdown {
                no_activity: 1,
                active: 2,
                cooling: 1,
                dormant: 0,
                at_risk: 1,
            }
        );
        assert_eq!(
            rollup.tier_counts,
            TierBreakdown {
                high: 2,
                moderate: 0,
                low: 1,
                minimal: 2,
            }
        );
    }

    #[test]
    fn test_score_ties_break_by_recency_then_id() {
        let now = Utc::now();
        let recent = make_summary("Recent", 70, ActivityStatus::Active, Some(now - Duration::days(1)));
        let stale = make_summary("Stale", 70, ActivityStatus::Cooling, Some(now - Duration::days(60)));
        let undated = make_summary("Undated", 70, ActivityStatus::NoActivity, None);

        let rollup =
            PopulationAnalyzer::rollup(&[stale.clone(), undated.clone(), recent.clone()], 3);

        assert_eq!(rollup.top_principals[0].principal_id, recent.principal_id);
        assert_eq!(rollup.top_principals[1].principal_id, stale.principal_id);
        assert_eq!(rollup.top_principals[2].principal_id, undated.principal_id);
    }

    #[test]
    fn test_full_ties_order_by_principal_id() {
        let now = Utc::now();
        let ts = Some(now - Duration::days(3));
        let a = make_summary("A", 55, ActivityStatus::Active, ts);
        let b = make_summary("B", 55, ActivityStatus::Active, ts);

        let rollup = PopulationAnalyzer::rollup(&[a.clone(), b.clone()], 2);
        let expected_first = a.principal_id.min(b.principal_id);
        assert_eq!(rollup.top_principals[0].principal_id, expected_first);
    }

    #[test]
    fn test_top_n_truncates() {
        let now = Utc::now();
        let summaries: Vec<PrincipalActivitySummary> = (0..15)
            .map(|i| make_summary(&format!("P{i}"), i as u8, ActivityStatus::Active, Some(now)))
            .collect();

        let rollup = PopulationAnalyzer::rollup(&summaries, DEFAULT_TOP_N);
        assert_eq!(rollup.top_principals.len(), DEFAULT_TOP_N);
        assert_eq!(rollup.top_principals[0].engagement_score, 14);
    }

    #[test]
    fn test_rollup_is_deterministic() {
        let now = Utc::now();
        let summaries = vec![
            make_summary("A", 42, ActivityStatus::Active, Some(now - Duration::days(9))),
            make_summary("B", 42, ActivityStatus::Cooling, Some(now - Duration::days(35))),
            make_summary("C", 17, ActivityStatus::Dormant, Some(now - Duration::days(200))),
        ];

        let first = PopulationAnalyzer::rollup(&summaries, DEFAULT_TOP_N);
        let second = PopulationAnalyzer::rollup(&summaries, DEFAULT_TOP_N);

        assert_eq!(first.average_engagement_score, second.average_engagement_score);
        assert_eq!(first.top_principals, second.top_principals);
        assert_eq!(first.status_counts, second.status_counts);
    }
}
