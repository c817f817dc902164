//! The evaluator entry points.

use chrono::{DateTime, Utc};

use crate::actor::{Actor, ActorClass};
use crate::collection::{Collection, Operation};
use crate::decision::{Decision, DenialReason, SchemaViolation};
use crate::rules::rules_for;
use crate::schema::schema_for;
use crate::snapshot::StoreSnapshot;
use crate::value::Document;

/// Decides one request against the current snapshot.
///
/// Pure apart from reading the wall clock for the `startedAt <= now` check;
/// use [`evaluate_at`] to pin the clock.
pub fn evaluate(
    actor: &Actor,
    operation: Operation,
    collection: Collection,
    target_doc_id: Option<&str>,
    proposed_document: Option<&Document>,
    snapshot: &dyn StoreSnapshot,
) -> Decision {
    evaluate_at(
        actor,
        operation,
        collection,
        target_doc_id,
        proposed_document,
        snapshot,
        Utc::now(),
    )
}

/// [`evaluate`] with an explicit decision-time clock.
///
/// A pure function of its inputs: the same actor, request, snapshot, and
/// clock always yield the same decision.
pub fn evaluate_at(
    actor: &Actor,
    operation: Operation,
    collection: Collection,
    target_doc_id: Option<&str>,
    proposed_document: Option<&Document>,
    snapshot: &dyn StoreSnapshot,
    now: DateTime<Utc>,
) -> Decision {
    let class = ActorClass::classify(actor, snapshot);

    // Schema validation runs first so a malformed write reports the field
    // error even when authorization would also deny.
    if operation.carries_document() {
        if let Some(schema) = schema_for(collection) {
            let violation = match proposed_document {
                None => Some(SchemaViolation::MissingDocument),
                Some(doc) => schema.check(collection, doc, snapshot, now).err(),
            };
            if let Some(violation) = violation {
                tracing::debug!(
                    collection = collection.as_str(),
                    operation = operation.as_str(),
                    actor = class.label(),
                    violation = %violation,
                    "write rejected by schema"
                );
                return Decision::deny(violation);
            }
        }
    }

    let rule = rules_for(collection).rule_for(operation);
    let flag = snapshot.feature_config().is_public_dashboard_enabled;
    let allowed = rule.is_satisfied_by(&class, flag, target_doc_id);

    tracing::debug!(
        collection = collection.as_str(),
        operation = operation.as_str(),
        actor = class.label(),
        public_dashboard = flag,
        allowed,
        "authorization decision"
    );

    if allowed {
        Decision::Allow
    } else {
        Decision::deny(DenialReason::Unauthorized {
            collection,
            operation,
            actor: class.label().to_string(),
        })
    }
}
