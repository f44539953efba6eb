//! Source readers for the record-store boundary
//!
//! This module defines the read-only seam between the engine and whatever
//! relational store owns the principal, interaction, opportunity, product,
//! and distributor records. Everything above this trait is pure computation.

mod memory;

pub use memory::InMemorySource;

use crate::error::EngineError;
use crate::types::{
    DistributorRelationship, Interaction, Opportunity, Principal, ProductAssociation,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for typed fetch operations against the record store.
///
/// Implementations must be side-effect free: the engine never writes through
/// this trait. Cancellation is the standard async contract; callers impose
/// deadlines by wrapping reader futures in a timeout, and dropping a future
/// abandons the read.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Resolve a principal by id; `Ok(None)` when the id is unknown
    async fn fetch_principal(&self, principal_id: Uuid)
        -> Result<Option<Principal>, EngineError>;

    async fn fetch_interactions(&self, principal_id: Uuid)
        -> Result<Vec<Interaction>, EngineError>;

    async fn fetch_opportunities(&self, principal_id: Uuid)
        -> Result<Vec<Opportunity>, EngineError>;

    async fn fetch_product_associations(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<ProductAssociation>, EngineError>;

    async fn fetch_distributor_relationships(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<DistributorRelationship>, EngineError>;

    /// All principal ids known to the store, for population rollups
    async fn fetch_all_principal_ids(&self) -> Result<Vec<Uuid>, EngineError>;
}
