//! Core types for the engagement analytics engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: source records fetched from the record store, the per-principal
//! raw activity bundle, timeline events, and the derived summary and rollup
//! outputs consumed by the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Organization acting as a manufacturer/brand whose relationship engagement
/// is tracked. Owned by the record store; read-only to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    /// Organization type as recorded by the store (free-form, passed through)
    pub organization_type: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind of logged interaction with a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Call,
    Email,
    Meeting,
    SiteVisit,
    SampleDrop,
    Note,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Call => "call",
            InteractionType::Email => "email",
            InteractionType::Meeting => "meeting",
            InteractionType::SiteVisit => "site_visit",
            InteractionType::SampleDrop => "sample_drop",
            InteractionType::Note => "note",
        }
    }
}

/// A single logged interaction with a principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub principal_id: Uuid,
    /// Contact the interaction was held with, if one was recorded
    pub contact_id: Option<Uuid>,
    pub interaction_type: InteractionType,
    pub subject: String,
    /// When the interaction occurred; records imported from legacy systems
    /// occasionally lack this
    pub occurred_at: Option<DateTime<Utc>>,
    /// Outcome rating on a 1-5 scale, if the rep logged one
    pub rating: Option<u8>,
    pub follow_up_required: bool,
    /// Due date for the follow-up, when one is required
    pub follow_up_due: Option<DateTime<Utc>>,
}

/// Sales pipeline stage for an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStage {
    NewLead,
    InitialOutreach,
    SampleVisit,
    AwaitingResponse,
    DemoScheduled,
    ClosedWon,
    ClosedLost,
}

impl OpportunityStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStage::NewLead => "new_lead",
            OpportunityStage::InitialOutreach => "initial_outreach",
            OpportunityStage::SampleVisit => "sample_visit",
            OpportunityStage::AwaitingResponse => "awaiting_response",
            OpportunityStage::DemoScheduled => "demo_scheduled",
            OpportunityStage::ClosedWon => "closed_won",
            OpportunityStage::ClosedLost => "closed_lost",
        }
    }

    /// An opportunity still counts toward the pipeline until it closes
    pub fn is_open(&self) -> bool {
        !matches!(self, OpportunityStage::ClosedWon | OpportunityStage::ClosedLost)
    }
}

/// A recorded stage transition on an opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageChange {
    pub stage: OpportunityStage,
    pub changed_at: Option<DateTime<Utc>>,
}

/// A sales opportunity attached to a principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub name: String,
    pub stage: OpportunityStage,
    pub created_at: Option<DateTime<Utc>>,
    /// Stage transitions in the order the store recorded them
    pub stage_history: Vec<StageChange>,
}

/// A product carried under a principal's line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAssociation {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub associated_at: Option<DateTime<Utc>>,
}

/// A distributor relationship held by a principal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributorRelationship {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub distributor_id: Uuid,
    pub distributor_name: String,
    pub linked_at: Option<DateTime<Utc>>,
}

/// Identifies one of the record-store sources the aggregator reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Principals,
    Interactions,
    Opportunities,
    ProductAssociations,
    DistributorRelationships,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Principals => "principals",
            SourceKind::Interactions => "interactions",
            SourceKind::Opportunities => "opportunities",
            SourceKind::ProductAssociations => "product_associations",
            SourceKind::DistributorRelationships => "distributor_relationships",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// `EngineError::SourceUnavailable` keeps a `source: SourceKind` field, which
// `thiserror` treats as the error's `std::error::Error` source. Implementing
// the (otherwise inert) trait lets the derived `source()` type-check without
// renaming the field.
impl std::error::Error for SourceKind {}

/// Everything fetched for one principal at summary-generation time.
///
/// Exists only for the duration of one aggregation call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawActivityBundle {
    pub principal: Principal,
    pub interactions: Vec<Interaction>,
    pub opportunities: Vec<Opportunity>,
    pub product_associations: Vec<ProductAssociation>,
    pub distributor_relationships: Vec<DistributorRelationship>,
}

impl RawActivityBundle {
    /// Most recent timestamp across all event kinds: interactions,
    /// opportunity creations and stage changes, product associations, and
    /// distributor links. `None` when the bundle has no dated events at all.
    pub fn last_activity_date(&self) -> Option<DateTime<Utc>> {
        let interactions = self.interactions.iter().filter_map(|i| i.occurred_at);
        let creations = self.opportunities.iter().filter_map(|o| o.created_at);
        let stage_changes = self
            .opportunities
            .iter()
            .flat_map(|o| o.stage_history.iter())
            .filter_map(|c| c.changed_at);
        let products = self.product_associations.iter().filter_map(|p| p.associated_at);
        let distributors = self
            .distributor_relationships
            .iter()
            .filter_map(|d| d.linked_at);

        interactions
            .chain(creations)
            .chain(stage_changes)
            .chain(products)
            .chain(distributors)
            .max()
    }

    /// Whole days since the most recent event, floored at zero so a
    /// future-dated record counts as today. `None` when no events are dated.
    pub fn days_since_last_activity(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_activity_date()
            .map(|last| (now - last).num_days().max(0))
    }

    /// Number of interactions that occurred within the trailing window
    /// ending at `now`. Interactions without a timestamp are excluded.
    pub fn interactions_within_days(&self, now: DateTime<Utc>, days: i64) -> usize {
        self.interactions
            .iter()
            .filter_map(|i| i.occurred_at)
            .filter(|t| {
                let age = (now - *t).num_days();
                (0..=days).contains(&age)
            })
            .count()
    }

    /// Opportunities not yet closed won or lost
    pub fn open_opportunity_count(&self) -> usize {
        self.opportunities.iter().filter(|o| o.stage.is_open()).count()
    }

    /// Products plus distributor links, the relationship-breadth input
    pub fn relationship_link_count(&self) -> usize {
        self.product_associations.len() + self.distributor_relationships.len()
    }

    /// True when at least one follow-up-required interaction has a due date
    /// already in the past at `now`
    pub fn has_overdue_follow_up(&self, now: DateTime<Utc>) -> bool {
        self.interactions.iter().any(|i| {
            i.follow_up_required && i.follow_up_due.is_some_and(|due| due < now)
        })
    }

    /// Interactions flagged as requiring a follow-up
    pub fn follow_ups_required(&self) -> usize {
        self.interactions.iter().filter(|i| i.follow_up_required).count()
    }

    /// Distinct contacts referenced by this principal's interactions
    pub fn distinct_contact_count(&self) -> usize {
        self.interactions
            .iter()
            .filter_map(|i| i.contact_id)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Mean of the interaction ratings that were logged, if any
    pub fn avg_interaction_rating(&self) -> Option<f64> {
        let ratings: Vec<f64> = self
            .interactions
            .iter()
            .filter_map(|i| i.rating)
            .map(f64::from)
            .collect();
        if ratings.is_empty() {
            return None;
        }
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}

/// Kind of a derived timeline event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityEventKind {
    OpportunityCreated,
    OpportunityStageChanged,
    Interaction,
    ProductAssociated,
    DistributorLinked,
}

impl ActivityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityEventKind::OpportunityCreated => "opportunity_created",
            ActivityEventKind::OpportunityStageChanged => "opportunity_stage_changed",
            ActivityEventKind::Interaction => "interaction",
            ActivityEventKind::ProductAssociated => "product_associated",
            ActivityEventKind::DistributorLinked => "distributor_linked",
        }
    }

    /// Fixed tie-break order for events sharing a timestamp. Lower sorts
    /// first, keeping timeline output stable across repeated calls.
    pub fn priority(&self) -> u8 {
        match self {
            ActivityEventKind::OpportunityCreated => 0,
            ActivityEventKind::OpportunityStageChanged => 1,
            ActivityEventKind::Interaction => 2,
            ActivityEventKind::ProductAssociated => 3,
            ActivityEventKind::DistributorLinked => 4,
        }
    }
}

/// A single point-in-time occurrence on a principal's timeline.
///
/// Events are immutable once constructed; a new summary generation produces
/// a fresh event set from current source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub principal_id: Uuid,
    pub kind: ActivityEventKind,
    pub occurred_at: DateTime<Utc>,
    /// Short human-readable label for display
    pub label: String,
    /// Reference back to the source record
    pub source_id: Uuid,
}

/// Chronologically ordered event sequence for one principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub events: Vec<ActivityEvent>,
    /// Source records excluded because they carry no timestamp
    pub skipped_missing_timestamp: usize,
}

/// Coarse activity classification derived from recency and follow-up urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    NoActivity,
    Active,
    Cooling,
    Dormant,
    AtRisk,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::NoActivity => "no_activity",
            ActivityStatus::Active => "active",
            ActivityStatus::Cooling => "cooling",
            ActivityStatus::Dormant => "dormant",
            ActivityStatus::AtRisk => "at_risk",
        }
    }
}

/// Engagement tier bucket used in rollup breakdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTier {
    High,
    Moderate,
    Low,
    Minimal,
}

impl EngagementTier {
    /// Classify a 0-100 engagement score into its tier
    pub fn from_score(score: u8) -> Self {
        match score {
            75..=u8::MAX => EngagementTier::High,
            50..=74 => EngagementTier::Moderate,
            25..=49 => EngagementTier::Low,
            0..=24 => EngagementTier::Minimal,
        }
    }
}

/// Per-principal activity summary, the engine's primary output.
///
/// Regenerating a summary for unchanged source data at the same instant
/// always yields identical values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalActivitySummary {
    pub principal_id: Uuid,
    pub principal_name: String,
    pub organization_type: String,
    pub active: bool,
    /// Distinct contacts referenced by the principal's interactions
    pub contact_count: u32,
    pub opportunity_count: u32,
    pub open_opportunity_count: u32,
    pub product_count: u32,
    pub distributor_count: u32,
    pub total_interactions: u32,
    pub interactions_last_30_days: u32,
    pub interactions_last_90_days: u32,
    /// Max timestamp across all event kinds; `None` when nothing is dated
    pub last_activity_date: Option<DateTime<Utc>>,
    pub activity_status: ActivityStatus,
    /// 0-100 integer summarizing relationship health
    pub engagement_score: u8,
    pub engagement_tier: EngagementTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_interaction_rating: Option<f64>,
    pub follow_ups_required: u32,
    pub summary_generated_at: DateTime<Utc>,
}

/// Principal counts per activity-status bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub no_activity: usize,
    pub active: usize,
    pub cooling: usize,
    pub dormant: usize,
    pub at_risk: usize,
}

/// Principal counts per engagement tier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBreakdown {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
    pub minimal: usize,
}

/// One entry in the rollup's top-N ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRanking {
    pub principal_id: Uuid,
    pub principal_name: String,
    pub engagement_score: u8,
    pub last_activity_date: Option<DateTime<Utc>>,
}

/// Cross-principal statistics over a batch of summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationRollup {
    pub total_principals: usize,
    pub status_counts: StatusBreakdown,
    /// Population mean engagement score; `0.0` for an empty population
    pub average_engagement_score: f64,
    pub tier_counts: TierBreakdown,
    /// Top principals by score; ties broken by most recent activity, then id
    pub top_principals: Vec<PrincipalRanking>,
}
