//! Resource collections and the operations the rule table decides on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A top-level document collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Projects,
    ProjectGroups,
    Builds,
    BuildDays,
    UserProfiles,
    FeatureConfig,
    InstantConfig,
    AllowedEmailDomains,
    Tasks,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Projects,
        Collection::ProjectGroups,
        Collection::Builds,
        Collection::BuildDays,
        Collection::UserProfiles,
        Collection::FeatureConfig,
        Collection::InstantConfig,
        Collection::AllowedEmailDomains,
        Collection::Tasks,
    ];

    /// The collection name as it appears in document paths.
    pub const fn as_str(self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::ProjectGroups => "project_groups",
            Collection::Builds => "build",
            Collection::BuildDays => "build_days",
            Collection::UserProfiles => "user_profiles",
            Collection::FeatureConfig => "feature_config",
            Collection::InstantConfig => "instant_config",
            Collection::AllowedEmailDomains => "allowed_email_domains",
            Collection::Tasks => "tasks",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a collection name does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection `{0}`")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}

/// An operation against a collection or a single document.
///
/// Collection-level reads (`List`) and single-document reads (`Get`) are
/// separate operations because some rule rows treat them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// True for operations that carry a proposed document.
    pub const fn carries_document(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
