//! Timeline reconstruction
//!
//! Merges interaction events, opportunity creation and stage-change events,
//! and product/distributor association events into one chronologically
//! ordered sequence. The merge is recomputed fresh on each call; there is no
//! cursor state to resume.

use crate::types::{ActivityEvent, ActivityEventKind, RawActivityBundle, Timeline};
use tracing::debug;

/// Builds the merged event timeline for one principal's bundle
pub struct TimelineBuilder;

impl TimelineBuilder {
    /// Reconstruct the timeline from a bundle.
    ///
    /// Total over any bundle. Records without a timestamp are excluded and
    /// counted in `skipped_missing_timestamp` rather than failing the call.
    /// Output order is timestamp ascending; events sharing a timestamp fall
    /// back to the fixed kind-priority order, so repeated calls on identical
    /// input return identical sequences.
    pub fn build(bundle: &RawActivityBundle) -> Timeline {
        let mut events = Vec::new();
        let mut skipped = 0usize;
        let principal_id = bundle.principal.id;

        for interaction in &bundle.interactions {
            match interaction.occurred_at {
                Some(occurred_at) => events.push(ActivityEvent {
                    principal_id,
                    kind: ActivityEventKind::Interaction,
                    occurred_at,
                    label: format!(
                        "{}: {}",
                        interaction.interaction_type.as_str(),
                        interaction.subject
                    ),
                    source_id: interaction.id,
                }),
                None => skipped += 1,
            }
        }

        for opportunity in &bundle.opportunities {
            match opportunity.created_at {
                Some(occurred_at) => events.push(ActivityEvent {
                    principal_id,
                    kind: ActivityEventKind::OpportunityCreated,
                    occurred_at,
                    label: format!("Opportunity created: {}", opportunity.name),
                    source_id: opportunity.id,
                }),
                None => skipped += 1,
            }

            for change in &opportunity.stage_history {
                match change.changed_at {
                    Some(occurred_at) => events.push(ActivityEvent {
                        principal_id,
                        kind: ActivityEventKind::OpportunityStageChanged,
                        occurred_at,
                        label: format!(
                            "{} moved to {}",
                            opportunity.name,
                            change.stage.as_str()
                        ),
                        source_id: opportunity.id,
                    }),
                    None => skipped += 1,
                }
            }
        }

        for association in &bundle.product_associations {
            match association.associated_at {
                Some(occurred_at) => events.push(ActivityEvent {
                    principal_id,
                    kind: ActivityEventKind::ProductAssociated,
                    occurred_at,
                    label: format!("Product associated: {}", association.product_name),
                    source_id: association.id,
                }),
                None => skipped += 1,
            }
        }

        for relationship in &bundle.distributor_relationships {
            match relationship.linked_at {
                Some(occurred_at) => events.push(ActivityEvent {
                    principal_id,
                    kind: ActivityEventKind::DistributorLinked,
                    occurred_at,
                    label: format!("Distributor linked: {}", relationship.distributor_name),
                    source_id: relationship.id,
                }),
                None => skipped += 1,
            }
        }

        // Stable sort: equal (timestamp, priority) pairs keep insertion order
        events.sort_by(|a, b| {
            a.occurred_at
                .cmp(&b.occurred_at)
                .then_with(|| a.kind.priority().cmp(&b.kind.priority()))
        });

        if skipped > 0 {
            debug!(
                principal_id = %principal_id,
                skipped,
                "excluded records with missing timestamps from timeline"
            );
        }

        Timeline {
            events,
            skipped_missing_timestamp: skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        DistributorRelationship, Interaction, InteractionType, Opportunity, OpportunityStage,
        Principal, ProductAssociation, StageChange,
    };
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn make_bundle() -> RawActivityBundle {
        let now = Utc::now();
        RawActivityBundle {
            principal: Principal {
                id: Uuid::new_v4(),
                name: "Alder Creek Foods".to_string(),
                organization_type: "manufacturer".to_string(),
                active: true,
                created_at: now - Duration::days(365),
                updated_at: now,
            },
            interactions: vec![],
            opportunities: vec![],
            product_associations: vec![],
            distributor_relationships: vec![],
        }
    }

    fn make_interaction(
        principal_id: Uuid,
        occurred_at: Option<DateTime<Utc>>,
        subject: &str,
    ) -> Interaction {
        Interaction {
            id: Uuid::new_v4(),
            principal_id,
            contact_id: None,
            interaction_type: InteractionType::Meeting,
            subject: subject.to_string(),
            occurred_at,
            rating: None,
            follow_up_required: false,
            follow_up_due: None,
        }
    }

    fn populated_bundle(now: DateTime<Utc>) -> RawActivityBundle {
        let mut bundle = make_bundle();
        let pid = bundle.principal.id;

        bundle.interactions.push(make_interaction(
            pid,
            Some(now - Duration::days(2)),
            "Tasting session",
        ));
        bundle.opportunities.push(Opportunity {
            id: Uuid::new_v4(),
            principal_id: pid,
            name: "Regional launch".to_string(),
            stage: OpportunityStage::DemoScheduled,
            created_at: Some(now - Duration::days(30)),
            stage_history: vec![
                StageChange {
                    stage: OpportunityStage::InitialOutreach,
                    changed_at: Some(now - Duration::days(20)),
                },
                StageChange {
                    stage: OpportunityStage::DemoScheduled,
                    changed_at: Some(now - Duration::days(5)),
                },
            ],
        });
        bundle.product_associations.push(ProductAssociation {
            id: Uuid::new_v4(),
            principal_id: pid,
            product_id: Uuid::new_v4(),
            product_name: "Oat crackers".to_string(),
            associated_at: Some(now - Duration::days(60)),
        });
        bundle.distributor_relationships.push(DistributorRelationship {
            id: Uuid::new_v4(),
            principal_id: pid,
            distributor_id: Uuid::new_v4(),
            distributor_name: "North Lake Distribution".to_string(),
            linked_at: Some(now - Duration::days(45)),
        });
        bundle
    }

    #[test]
    fn test_empty_bundle_yields_empty_timeline() {
        let timeline = TimelineBuilder::build(&make_bundle());
        assert!(timeline.events.is_empty());
        assert_eq!(timeline.skipped_missing_timestamp, 0);
    }

    #[test]
    fn test_all_record_kinds_become_events() {
        let now = Utc::now();
        let timeline = TimelineBuilder::build(&populated_bundle(now));

        // 1 interaction + 1 creation + 2 stage changes + 1 product + 1 distributor
        assert_eq!(timeline.events.len(), 6);

        let kinds: Vec<ActivityEventKind> = timeline.events.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ActivityEventKind::Interaction));
        assert!(kinds.contains(&ActivityEventKind::OpportunityCreated));
        assert!(kinds.contains(&ActivityEventKind::OpportunityStageChanged));
        assert!(kinds.contains(&ActivityEventKind::ProductAssociated));
        assert!(kinds.contains(&ActivityEventKind::DistributorLinked));
    }

    #[test]
    fn test_events_are_ordered_by_timestamp_ascending() {
        let now = Utc::now();
        let timeline = TimelineBuilder::build(&populated_bundle(now));

        for pair in timeline.events.windows(2) {
            assert!(pair[0].occurred_at <= pair[1].occurred_at);
        }
    }

    #[test]
    fn test_same_timestamp_ties_break_by_kind_priority() {
        let now = Utc::now();
        let ts = now - Duration::days(7);
        let mut bundle = make_bundle();
        let pid = bundle.principal.id;

        // Insert in reverse priority order to prove the sort reorders them
        bundle.distributor_relationships.push(DistributorRelationship {
            id: Uuid::new_v4(),
            principal_id: pid,
            distributor_id: Uuid::new_v4(),
            distributor_name: "North Lake Distribution".to_string(),
            linked_at: Some(ts),
        });
        bundle.product_associations.push(ProductAssociation {
            id: Uuid::new_v4(),
            principal_id: pid,
            product_id: Uuid::new_v4(),
            product_name: "Oat crackers".to_string(),
            associated_at: Some(ts),
        });
        bundle
            .interactions
            .push(make_interaction(pid, Some(ts), "Same-day call"));
        bundle.opportunities.push(Opportunity {
            id: Uuid::new_v4(),
            principal_id: pid,
            name: "Same-day opportunity".to_string(),
            stage: OpportunityStage::NewLead,
            created_at: Some(ts),
            stage_history: vec![StageChange {
                stage: OpportunityStage::NewLead,
                changed_at: Some(ts),
            }],
        });

        let timeline = TimelineBuilder::build(&bundle);
        let kinds: Vec<ActivityEventKind> = timeline.events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityEventKind::OpportunityCreated,
                ActivityEventKind::OpportunityStageChanged,
                ActivityEventKind::Interaction,
                ActivityEventKind::ProductAssociated,
                ActivityEventKind::DistributorLinked,
            ]
        );
    }

    #[test]
    fn test_missing_timestamps_are_skipped_not_fatal() {
        let now = Utc::now();
        let mut bundle = make_bundle();
        let pid = bundle.principal.id;

        bundle
            .interactions
            .push(make_interaction(pid, None, "Undated import"));
        bundle
            .interactions
            .push(make_interaction(pid, Some(now), "Dated call"));
        bundle.opportunities.push(Opportunity {
            id: Uuid::new_v4(),
            principal_id: pid,
            name: "Legacy opportunity".to_string(),
            stage: OpportunityStage::AwaitingResponse,
            created_at: None,
            stage_history: vec![StageChange {
                stage: OpportunityStage::AwaitingResponse,
                changed_at: None,
            }],
        });

        let timeline = TimelineBuilder::build(&bundle);
        assert_eq!(timeline.events.len(), 1);
        assert_eq!(timeline.skipped_missing_timestamp, 3);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let now = Utc::now();
        let bundle = populated_bundle(now);

        let first = TimelineBuilder::build(&bundle);
        let second = TimelineBuilder::build(&bundle);
        assert_eq!(first, second);
    }

    #[test]
    fn test_event_labels_are_human_readable() {
        let now = Utc::now();
        let timeline = TimelineBuilder::build(&populated_bundle(now));

        let labels: Vec<&str> = timeline.events.iter().map(|e| e.label.as_str()).collect();
        assert!(labels.contains(&"meeting: Tasting session"));
        assert!(labels.contains(&"Opportunity created: Regional launch"));
        assert!(labels.contains(&"Regional launch moved to demo_scheduled"));
        assert!(labels.contains(&"Product associated: Oat crackers"));
        assert!(labels.contains(&"Distributor linked: North Lake Distribution"));
    }
}
