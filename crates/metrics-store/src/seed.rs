//! Demo-data seeding for local development and tests.

use chrono::{DateTime, Duration, Utc};
use metrics_policy::{BuildStatus, Collection, Document, StoreSnapshot, Value};
use rand::Rng;
use serde::Deserialize;

use crate::store::{MetricsStore, StoreError};

/// Url every seeded build points at.
pub const SEED_BUILD_URL: &str = "https://github.com/Flank/flank-dashboard/commits/master";
/// Workflow name every seeded build carries.
pub const SEED_WORKFLOW_NAME: &str = "run_tests";

/// Seeded build durations, in milliseconds: 10 to 30 minutes.
pub const SEED_DURATION_MS: std::ops::Range<i64> = (10 * 60 * 1000)..(30 * 60 * 1000);

/// Statuses the seeder draws from; always terminal so the duration band
/// applies.
pub const SEED_STATUSES: [BuildStatus; 3] = [
    BuildStatus::Successful,
    BuildStatus::Unknown,
    BuildStatus::Failed,
];

const SEED_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Parameters of one seeding run.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRequest {
    /// Number of builds to generate.
    pub builds_count: usize,
    /// Project the builds belong to; must already exist.
    pub project_id: String,
    /// Builds get a `startedAt` in the 7 days before this date.
    /// Defaults to the current date.
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

/// Inserts the two demo projects and returns their ids.
pub fn seed_demo_projects(store: &mut MetricsStore) -> Vec<String> {
    ["Project 1", "Project 2"]
        .into_iter()
        .map(|name| {
            store
                .admin()
                .insert_new(Collection::Projects, Document::new().with("name", name))
        })
        .collect()
}

/// Generates `builds_count` random builds for an existing project.
///
/// Seeded documents are inserted through the administrative bypass but are
/// shaped to satisfy the `build` schema, buildNumber included.
pub fn seed_builds(
    store: &mut MetricsStore,
    request: &SeedRequest,
) -> Result<Vec<String>, StoreError> {
    if !store.project_exists(&request.project_id) {
        return Err(StoreError::NotFound {
            collection: Collection::Projects,
            id: request.project_id.clone(),
        });
    }

    let start_date = request.start_date.unwrap_or_else(Utc::now);
    let mut rng = rand::thread_rng();
    let mut ids = Vec::with_capacity(request.builds_count);

    for build_number in 1..=request.builds_count {
        let started_at = start_date - Duration::milliseconds(rng.gen_range(0..SEED_WINDOW_MS));
        let status = SEED_STATUSES[rng.gen_range(0..SEED_STATUSES.len())];
        let coverage = (rng.gen::<f64>() * 100.0).round() / 100.0;

        let doc = Document::new()
            .with("projectId", request.project_id.clone())
            .with("startedAt", started_at)
            .with("buildStatus", status.as_str())
            .with("duration", rng.gen_range(SEED_DURATION_MS))
            .with("url", SEED_BUILD_URL)
            .with("apiUrl", Value::Null)
            .with("buildNumber", build_number as i64)
            .with("workflowName", SEED_WORKFLOW_NAME)
            .with("coverage", coverage);

        ids.push(store.admin().insert_new(Collection::Builds, doc));
    }

    tracing::debug!(
        project_id = %request.project_id,
        builds = request.builds_count,
        "seeded demo builds"
    );
    Ok(ids)
}
