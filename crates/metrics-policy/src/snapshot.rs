//! Read-only datastore snapshot the evaluator decides against.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value::Document;

/// The database-wide feature configuration singleton.
///
/// Mutated only by administrative tooling; the evaluator treats it as
/// read-only input. Only `is_public_dashboard_enabled` alters decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub is_public_dashboard_enabled: bool,
    pub is_password_sign_in_option_enabled: bool,
    pub is_debug_menu_enabled: bool,
}

impl FeatureConfig {
    /// Document id of the singleton inside the `feature_config` collection.
    pub const DOC_ID: &'static str = "feature_config";

    pub fn from_document(doc: &Document) -> Self {
        let flag = |name: &str| {
            doc.get(name)
                .and_then(crate::value::Value::as_bool)
                .unwrap_or(false)
        };
        Self {
            is_public_dashboard_enabled: flag("isPublicDashboardEnabled"),
            is_password_sign_in_option_enabled: flag("isPasswordSignInOptionEnabled"),
            is_debug_menu_enabled: flag("isDebugMenuEnabled"),
        }
    }

    pub fn to_document(self) -> Document {
        Document::new()
            .with("isPublicDashboardEnabled", self.is_public_dashboard_enabled)
            .with(
                "isPasswordSignInOptionEnabled",
                self.is_password_sign_in_option_enabled,
            )
            .with("isDebugMenuEnabled", self.is_debug_menu_enabled)
    }
}

/// Referential lookups against an already-materialized snapshot.
///
/// Every call is an instantaneous read; implementations must not block or
/// fail. The evaluator is a pure function of the snapshot it is handed.
pub trait StoreSnapshot {
    fn feature_config(&self) -> FeatureConfig;

    /// Exact set membership on the domain part of an email address.
    fn is_email_domain_allowed(&self, domain: &str) -> bool;

    fn project_exists(&self, project_id: &str) -> bool;
}

/// A fixed snapshot assembled by hand, for tests and embedders without a
/// backing store.
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshot {
    pub feature_config: FeatureConfig,
    pub allowed_email_domains: BTreeSet<String>,
    pub project_ids: BTreeSet<String>,
}

impl StoreSnapshot for StaticSnapshot {
    fn feature_config(&self) -> FeatureConfig {
        self.feature_config
    }

    fn is_email_domain_allowed(&self, domain: &str) -> bool {
        self.allowed_email_domains.contains(domain)
    }

    fn project_exists(&self, project_id: &str) -> bool {
        self.project_ids.contains(project_id)
    }
}
