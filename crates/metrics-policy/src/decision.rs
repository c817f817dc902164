//! Decision and denial types returned by the evaluator.

use serde::{Deserialize, Serialize};

use crate::collection::{Collection, Operation};

/// Outcome of a single `evaluate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny { reason: DenialReason },
}

impl Decision {
    pub fn deny(reason: impl Into<DenialReason>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn reason(&self) -> Option<&DenialReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny { reason } => Some(reason),
        }
    }
}

/// Why a request was denied. Exactly two failure classes exist: the rule
/// table said no, or the proposed document is invalid. Both are terminal
/// and non-retryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    #[error("{operation} on `{collection}` is not permitted for {actor} actors")]
    Unauthorized {
        collection: Collection,
        operation: Operation,
        actor: String,
    },
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] SchemaViolation),
}

impl DenialReason {
    pub fn is_schema_failure(&self) -> bool {
        matches!(self, DenialReason::InvalidDocument(_))
    }
}

/// A field-level violation of a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SchemaViolation {
    /// Closed-schema check: a field name outside the declared set rejects
    /// the whole write, independent of every other check.
    #[error("field `{field}` is not allowed in `{collection}`")]
    UnknownField { collection: Collection, field: String },
    /// Missing field, wrong type, bad enumeration value, or out-of-range.
    #[error("field `{field}` must be {expected}")]
    InvalidField { field: String, expected: String },
    #[error("`projectId` `{project_id}` does not reference an existing project")]
    UnknownProject { project_id: String },
    #[error("`startedAt` must not be after the current timestamp")]
    StartedAtInFuture,
    #[error("`duration` must be a non-null integer when the build status is terminal")]
    DurationRequired,
    #[error("`duration` must be null while the build has no terminal status")]
    DurationForbidden,
    #[error("no document was supplied for the write")]
    MissingDocument,
}

impl SchemaViolation {
    pub(crate) fn invalid_field(field: &str, expected: &str) -> Self {
        SchemaViolation::InvalidField {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_failures_are_reported_distinctly() {
        let deny = Decision::deny(SchemaViolation::MissingDocument);
        assert!(!deny.is_allowed());
        assert!(deny.reason().unwrap().is_schema_failure());

        let deny = Decision::deny(DenialReason::Unauthorized {
            collection: Collection::Tasks,
            operation: Operation::Create,
            actor: "password".to_string(),
        });
        assert!(!deny.reason().unwrap().is_schema_failure());
    }

    #[test]
    fn denial_reasons_render_collection_and_operation() {
        let reason = DenialReason::Unauthorized {
            collection: Collection::Builds,
            operation: Operation::Delete,
            actor: "oauth".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "delete on `build` is not permitted for oauth actors"
        );
    }

    #[test]
    fn decisions_serialize_to_json() {
        let json = serde_json::to_value(Decision::Allow).unwrap();
        assert_eq!(json, serde_json::json!("allow"));

        let deny = Decision::deny(SchemaViolation::StartedAtInFuture);
        let json = serde_json::to_value(&deny).unwrap();
        assert_eq!(
            serde_json::from_value::<Decision>(json).unwrap(),
            deny
        );
    }
}
