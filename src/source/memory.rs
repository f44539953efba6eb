//! In-memory source reader
//!
//! A `SourceReader` backed by plain maps. Used by hosts that already hold
//! records in memory, and by tests and examples that need a store without
//! standing up a database.

use crate::error::EngineError;
use crate::source::SourceReader;
use crate::types::{
    DistributorRelationship, Interaction, Opportunity, Principal, ProductAssociation,
};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// Map-backed record store. Populate it with the `insert_*` methods, then
/// hand it to the engine behind an `Arc`.
#[derive(Debug, Default)]
pub struct InMemorySource {
    principals: HashMap<Uuid, Principal>,
    interactions: HashMap<Uuid, Vec<Interaction>>,
    opportunities: HashMap<Uuid, Vec<Opportunity>>,
    product_associations: HashMap<Uuid, Vec<ProductAssociation>>,
    distributor_relationships: HashMap<Uuid, Vec<DistributorRelationship>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_principal(&mut self, principal: Principal) {
        self.principals.insert(principal.id, principal);
    }

    pub fn insert_interaction(&mut self, interaction: Interaction) {
        self.interactions
            .entry(interaction.principal_id)
            .or_default()
            .push(interaction);
    }

    pub fn insert_opportunity(&mut self, opportunity: Opportunity) {
        self.opportunities
            .entry(opportunity.principal_id)
            .or_default()
            .push(opportunity);
    }

    pub fn insert_product_association(&mut self, association: ProductAssociation) {
        self.product_associations
            .entry(association.principal_id)
            .or_default()
            .push(association);
    }

    pub fn insert_distributor_relationship(&mut self, relationship: DistributorRelationship) {
        self.distributor_relationships
            .entry(relationship.principal_id)
            .or_default()
            .push(relationship);
    }
}

#[async_trait]
impl SourceReader for InMemorySource {
    async fn fetch_principal(
        &self,
        principal_id: Uuid,
    ) -> Result<Option<Principal>, EngineError> {
        Ok(self.principals.get(&principal_id).cloned())
    }

    async fn fetch_interactions(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<Interaction>, EngineError> {
        Ok(self.interactions.get(&principal_id).cloned().unwrap_or_default())
    }

    async fn fetch_opportunities(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<Opportunity>, EngineError> {
        Ok(self.opportunities.get(&principal_id).cloned().unwrap_or_default())
    }

    async fn fetch_product_associations(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<ProductAssociation>, EngineError> {
        Ok(self
            .product_associations
            .get(&principal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_distributor_relationships(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<DistributorRelationship>, EngineError> {
        Ok(self
            .distributor_relationships
            .get(&principal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_all_principal_ids(&self) -> Result<Vec<Uuid>, EngineError> {
        // Sorted so rollup iteration order is stable across runs
        let mut ids: Vec<Uuid> = self.principals.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InteractionType;
    use chrono::Utc;

    fn make_principal(name: &str) -> Principal {
        let now = Utc::now();
        Principal {
            id: Uuid::new_v4(),
            name: name.to_string(),
            organization_type: "manufacturer".to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_fetch_round_trip() {
        let mut source = InMemorySource::new();
        let principal = make_principal("Harbor Mills");
        let pid = principal.id;
        source.insert_principal(principal);
        source.insert_interaction(Interaction {
            id: Uuid::new_v4(),
            principal_id: pid,
            contact_id: None,
            interaction_type: InteractionType::Email,
            subject: "Intro".to_string(),
            occurred_at: Some(Utc::now()),
            rating: None,
            follow_up_required: false,
            follow_up_due: None,
        });

        let fetched = source.fetch_principal(pid).await.unwrap();
        assert_eq!(fetched.unwrap().name, "Harbor Mills");
        assert_eq!(source.fetch_interactions(pid).await.unwrap().len(), 1);
        assert!(source.fetch_opportunities(pid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_principal_resolves_to_none() {
        let source = InMemorySource::new();
        let missing = Uuid::new_v4();

        assert!(source.fetch_principal(missing).await.unwrap().is_none());
        // Record fetches for an unknown id are empty, not errors; existence
        // checks belong to the aggregator
        assert!(source.fetch_interactions(missing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_principal_ids_sorted() {
        let mut source = InMemorySource::new();
        for name in ["A", "B", "C"] {
            source.insert_principal(make_principal(name));
        }

        let ids = source.fetch_all_principal_ids().await.unwrap();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 3);
    }
}
