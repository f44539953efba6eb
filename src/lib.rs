//! Principal Pulse - activity and engagement analytics for principal relationships
//!
//! Principal Pulse turns raw CRM records (principal organizations, logged
//! interactions, sales opportunities, product and distributor links) into
//! per-principal activity intelligence through a deterministic pipeline:
//! source aggregation → engagement scoring / timeline reconstruction →
//! summary assembly → population rollup.
//!
//! ## Modules
//!
//! - **Source Readers**: async boundary to the record store, with an
//!   in-memory implementation for hosts and tests
//! - **Aggregator**: concurrent per-principal fan-out with retry and deadline
//! - **Scorer / Timeline / Summary**: pure, total functions over a bundle
//! - **Rollup / Engine**: population statistics and the public facade

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod rollup;
pub mod scorer;
pub mod source;
pub mod summary;
pub mod timeline;
pub mod types;

pub use aggregator::{ActivityAggregator, AggregatorConfig};
pub use engine::{ActivityEngine, EngineConfig, FailurePolicy, RollupFilter};
pub use error::EngineError;
pub use rollup::{FailedAggregation, PopulationAnalyzer, RollupOutcome, DEFAULT_TOP_N};
pub use scorer::{EngagementScore, EngagementScorer, ScoringWeights};
pub use source::{InMemorySource, SourceReader};
pub use summary::SummaryBuilder;
pub use timeline::TimelineBuilder;
pub use types::{
    ActivityEvent, ActivityEventKind, ActivityStatus, EngagementTier, PopulationRollup,
    Principal, PrincipalActivitySummary, PrincipalRanking, RawActivityBundle, SourceKind,
    StatusBreakdown, TierBreakdown, Timeline,
};

/// Engine version embedded in host diagnostics
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
