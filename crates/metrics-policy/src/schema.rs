//! Per-collection document schemas.
//!
//! Each writable collection has one registry entry: the closed field set
//! plus a validator for types, enumerations, ranges, and cross-field
//! constraints. Adding a collection means adding one entry, not new
//! control flow in the evaluator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::decision::SchemaViolation;
use crate::snapshot::StoreSnapshot;
use crate::value::{Document, Value};

/// Longest accepted `project_groups.name`.
pub const PROJECT_GROUP_NAME_MAX: usize = 255;
/// Most project ids a single project group may hold.
pub const PROJECT_GROUP_IDS_MAX: usize = 20;

/// Lifecycle status of a build document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildStatus {
    #[serde(rename = "BuildStatus.successful")]
    Successful,
    #[serde(rename = "BuildStatus.failed")]
    Failed,
    #[serde(rename = "BuildStatus.unknown")]
    Unknown,
    #[serde(rename = "BuildStatus.cancelled")]
    Cancelled,
    #[serde(rename = "BuildStatus.inProgress")]
    InProgress,
}

impl BuildStatus {
    pub const ALL: [BuildStatus; 5] = [
        BuildStatus::Successful,
        BuildStatus::Failed,
        BuildStatus::Unknown,
        BuildStatus::Cancelled,
        BuildStatus::InProgress,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Successful => "BuildStatus.successful",
            BuildStatus::Failed => "BuildStatus.failed",
            BuildStatus::Unknown => "BuildStatus.unknown",
            BuildStatus::Cancelled => "BuildStatus.cancelled",
            BuildStatus::InProgress => "BuildStatus.inProgress",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Terminal builds carry a duration; in-progress builds do not.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, BuildStatus::InProgress)
    }
}

/// Dashboard theme stored in a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeType {
    #[serde(rename = "ThemeType.dark")]
    Dark,
    #[serde(rename = "ThemeType.light")]
    Light,
}

impl ThemeType {
    pub const ALL: [ThemeType; 2] = [ThemeType::Dark, ThemeType::Light];

    pub const fn as_str(self) -> &'static str {
        match self {
            ThemeType::Dark => "ThemeType.dark",
            ThemeType::Light => "ThemeType.light",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.as_str() == s)
    }
}

type Validator = fn(&Document, &dyn StoreSnapshot, DateTime<Utc>) -> Result<(), SchemaViolation>;

/// One registry entry: the declared field set and the field validator.
pub(crate) struct CollectionSchema {
    fields: &'static [&'static str],
    validate: Validator,
}

impl CollectionSchema {
    /// Runs the closed-schema check, then the field validator.
    ///
    /// The closed-schema check rejects any undeclared field name before
    /// anything else is looked at.
    pub(crate) fn check(
        &self,
        collection: Collection,
        doc: &Document,
        snapshot: &dyn StoreSnapshot,
        now: DateTime<Utc>,
    ) -> Result<(), SchemaViolation> {
        for field in doc.field_names() {
            if !self.fields.contains(&field) {
                return Err(SchemaViolation::UnknownField {
                    collection,
                    field: field.to_string(),
                });
            }
        }
        (self.validate)(doc, snapshot, now)
    }
}

/// Looks up the schema for a collection.
///
/// Collections whose writes the rule table denies unconditionally carry no
/// schema; validation is moot for them.
pub(crate) fn schema_for(collection: Collection) -> Option<&'static CollectionSchema> {
    match collection {
        Collection::Projects => Some(&PROJECTS),
        Collection::ProjectGroups => Some(&PROJECT_GROUPS),
        Collection::Builds => Some(&BUILDS),
        Collection::BuildDays => Some(&BUILD_DAYS),
        Collection::UserProfiles => Some(&USER_PROFILES),
        Collection::FeatureConfig
        | Collection::InstantConfig
        | Collection::AllowedEmailDomains
        | Collection::Tasks => None,
    }
}

static PROJECTS: CollectionSchema = CollectionSchema {
    fields: &["name"],
    validate: validate_project,
};

static PROJECT_GROUPS: CollectionSchema = CollectionSchema {
    fields: &["name", "projectIds"],
    validate: validate_project_group,
};

static BUILDS: CollectionSchema = CollectionSchema {
    fields: &[
        "projectId",
        "startedAt",
        "buildStatus",
        "duration",
        "url",
        "apiUrl",
        "buildNumber",
        "workflowName",
        "coverage",
    ],
    validate: validate_build,
};

static BUILD_DAYS: CollectionSchema = CollectionSchema {
    fields: &[
        "projectId",
        "successful",
        "failed",
        "unknown",
        "inProgress",
        "totalDuration",
        "day",
    ],
    validate: validate_build_day,
};

static USER_PROFILES: CollectionSchema = CollectionSchema {
    fields: &["selectedTheme"],
    validate: validate_user_profile,
};

fn validate_project(
    doc: &Document,
    _snapshot: &dyn StoreSnapshot,
    _now: DateTime<Utc>,
) -> Result<(), SchemaViolation> {
    require_str(doc, "name")?;
    Ok(())
}

fn validate_project_group(
    doc: &Document,
    _snapshot: &dyn StoreSnapshot,
    _now: DateTime<Utc>,
) -> Result<(), SchemaViolation> {
    let name = require_str(doc, "name")?;
    if name.chars().count() > PROJECT_GROUP_NAME_MAX {
        return Err(SchemaViolation::invalid_field(
            "name",
            "a string of at most 255 characters",
        ));
    }
    let project_ids = doc
        .get("projectIds")
        .and_then(Value::as_list)
        .ok_or_else(|| SchemaViolation::invalid_field("projectIds", "a list of strings"))?;
    if project_ids.len() > PROJECT_GROUP_IDS_MAX {
        return Err(SchemaViolation::invalid_field(
            "projectIds",
            "a list of at most 20 project ids",
        ));
    }
    if project_ids.iter().any(|id| id.as_str().is_none()) {
        return Err(SchemaViolation::invalid_field(
            "projectIds",
            "a list of strings",
        ));
    }
    Ok(())
}

fn validate_build(
    doc: &Document,
    snapshot: &dyn StoreSnapshot,
    now: DateTime<Utc>,
) -> Result<(), SchemaViolation> {
    require_project_reference(doc, snapshot)?;

    let started_at = doc
        .get("startedAt")
        .and_then(Value::as_timestamp)
        .ok_or_else(|| SchemaViolation::invalid_field("startedAt", "a timestamp"))?;
    if started_at > now {
        return Err(SchemaViolation::StartedAtInFuture);
    }

    let status = match doc.get("buildStatus") {
        None | Some(Value::Null) => None,
        Some(Value::Str(s)) => Some(BuildStatus::parse(s).ok_or_else(|| {
            SchemaViolation::invalid_field("buildStatus", "a known build status or null")
        })?),
        Some(_) => {
            return Err(SchemaViolation::invalid_field(
                "buildStatus",
                "a known build status or null",
            ))
        }
    };

    // Terminal builds must carry an integer duration; builds that are still
    // running, or have no status yet, must not.
    let duration = doc.get("duration").unwrap_or(&Value::Null);
    if status.is_some_and(BuildStatus::is_terminal) {
        if duration.as_int().is_none() {
            return Err(SchemaViolation::DurationRequired);
        }
    } else if !duration.is_null() {
        return Err(SchemaViolation::DurationForbidden);
    }

    require_str(doc, "url")?;
    optional_str(doc, "apiUrl")?;
    require_int(doc, "buildNumber")?;
    optional_str(doc, "workflowName")?;

    match doc.get("coverage") {
        None | Some(Value::Null) => {}
        Some(Value::Float(coverage)) if (0.0..=1.0).contains(coverage) => {}
        Some(_) => {
            return Err(SchemaViolation::invalid_field(
                "coverage",
                "a float between 0.0 and 1.0 or null",
            ))
        }
    }

    Ok(())
}

fn validate_build_day(
    doc: &Document,
    snapshot: &dyn StoreSnapshot,
    _now: DateTime<Utc>,
) -> Result<(), SchemaViolation> {
    require_project_reference(doc, snapshot)?;
    for field in ["successful", "failed", "unknown", "inProgress", "totalDuration"] {
        require_int(doc, field)?;
    }
    doc.get("day")
        .and_then(Value::as_timestamp)
        .ok_or_else(|| SchemaViolation::invalid_field("day", "a timestamp"))?;
    Ok(())
}

fn validate_user_profile(
    doc: &Document,
    _snapshot: &dyn StoreSnapshot,
    _now: DateTime<Utc>,
) -> Result<(), SchemaViolation> {
    let theme = require_str(doc, "selectedTheme")?;
    if ThemeType::parse(theme).is_none() {
        return Err(SchemaViolation::invalid_field(
            "selectedTheme",
            "a known theme type",
        ));
    }
    Ok(())
}

fn require_project_reference<'d>(
    doc: &'d Document,
    snapshot: &dyn StoreSnapshot,
) -> Result<&'d str, SchemaViolation> {
    let project_id = require_str(doc, "projectId")?;
    if !snapshot.project_exists(project_id) {
        return Err(SchemaViolation::UnknownProject {
            project_id: project_id.to_string(),
        });
    }
    Ok(project_id)
}

fn require_str<'d>(doc: &'d Document, field: &str) -> Result<&'d str, SchemaViolation> {
    doc.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| SchemaViolation::invalid_field(field, "a string"))
}

fn require_int(doc: &Document, field: &str) -> Result<i64, SchemaViolation> {
    doc.get(field)
        .and_then(Value::as_int)
        .ok_or_else(|| SchemaViolation::invalid_field(field, "an integer"))
}

/// Accepts an absent field, an explicit null, or a string.
fn optional_str<'d>(doc: &'d Document, field: &str) -> Result<Option<&'d str>, SchemaViolation> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Str(s)) => Ok(Some(s)),
        Some(_) => Err(SchemaViolation::invalid_field(field, "a string or null")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_status_strings_round_trip() {
        for status in BuildStatus::ALL {
            assert_eq!(BuildStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BuildStatus::parse("test"), None);
    }

    #[test]
    fn only_in_progress_is_not_terminal() {
        for status in BuildStatus::ALL {
            assert_eq!(
                status.is_terminal(),
                status != BuildStatus::InProgress,
                "{status:?}"
            );
        }
    }

    #[test]
    fn theme_strings_round_trip() {
        assert_eq!(ThemeType::parse("ThemeType.dark"), Some(ThemeType::Dark));
        assert_eq!(ThemeType::parse("ThemeType.light"), Some(ThemeType::Light));
        assert_eq!(ThemeType::parse("ThemeType.sepia"), None);
    }

    #[test]
    fn every_writable_collection_has_a_schema() {
        for collection in [
            Collection::Projects,
            Collection::ProjectGroups,
            Collection::Builds,
            Collection::BuildDays,
            Collection::UserProfiles,
        ] {
            assert!(schema_for(collection).is_some(), "{collection}");
        }
        assert!(schema_for(Collection::Tasks).is_none());
        assert!(schema_for(Collection::FeatureConfig).is_none());
    }
}
