//! Write-path behavior: denials leave the store untouched, allowed writes
//! land, and seeding produces schema-valid documents.

use anyhow::Result;
use chrono::{Duration, Utc};
use metrics_policy::{
    evaluate, Actor, Collection, Document, FeatureConfig, Operation, StoreSnapshot, Value,
};
use metrics_store::{seed_builds, seed_demo_projects, MetricsStore, SeedRequest, StoreError};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

fn writer() -> Actor {
    Actor::password("uid", "test@gmail.com", true)
}

/// The fixture database: feature config, one allowed domain, two projects,
/// one build.
fn fixture_store(public_dashboard: bool) -> MetricsStore {
    init_tracing();
    let mut store = MetricsStore::new();
    let mut admin = store.admin();
    admin.set_feature_config(FeatureConfig {
        is_public_dashboard_enabled: public_dashboard,
        is_password_sign_in_option_enabled: true,
        is_debug_menu_enabled: true,
    });
    admin.allow_email_domain("gmail.com");
    admin.insert(
        Collection::Projects,
        "1",
        Document::new().with("name", "project_1"),
    );
    admin.insert(
        Collection::Projects,
        "2",
        Document::new().with("name", "project_2"),
    );
    admin.insert(
        Collection::Builds,
        "1",
        Document::new()
            .with("projectId", "1")
            .with("buildNumber", 1)
            .with("startedAt", Utc::now() - Duration::hours(1))
            .with("buildStatus", "BuildStatus.failed")
            .with("workflowName", "workflow")
            .with("duration", 234)
            .with("url", "url1")
            .with("apiUrl", "apiUrl1")
            .with("coverage", 0.0),
    );
    store
}

#[test]
fn denied_create_leaves_the_collection_unchanged() -> Result<()> {
    let mut store = fixture_store(false);
    let before = store.list(&writer(), Collection::Projects)?.len();

    let err = store
        .create(
            &Actor::unauthenticated(),
            Collection::Projects,
            Document::new().with("name", "intruder"),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Denied(_)));

    assert_eq!(store.list(&writer(), Collection::Projects)?.len(), before);
    Ok(())
}

#[test]
fn schema_denied_create_reports_the_field_error() {
    let mut store = fixture_store(false);
    let err = store
        .create(
            &writer(),
            Collection::Builds,
            Document::new()
                .with("projectId", "1")
                .with("buildNumber", 2)
                .with("startedAt", Utc::now() + Duration::days(1))
                .with("buildStatus", Value::Null)
                .with("duration", Value::Null)
                .with("url", "u"),
        )
        .unwrap_err();

    match err {
        StoreError::Denied(reason) => assert!(reason.is_schema_failure()),
        other => panic!("expected denial, got {other:?}"),
    }
}

#[test]
fn allowed_create_lands_and_is_readable() -> Result<()> {
    let mut store = fixture_store(false);
    let id = store.create(
        &writer(),
        Collection::Projects,
        Document::new().with("name", "project_3"),
    )?;

    let doc = store.get(&writer(), Collection::Projects, &id)?;
    assert_eq!(doc.get("name"), Some(&Value::Str("project_3".into())));
    Ok(())
}

#[test]
fn update_merges_changes_over_the_stored_document() -> Result<()> {
    let mut store = fixture_store(false);
    store.update(
        &writer(),
        Collection::Builds,
        "1",
        &Document::new().with("url", "updated"),
    )?;

    let doc = store.get(&writer(), Collection::Builds, "1")?;
    assert_eq!(doc.get("url"), Some(&Value::Str("updated".into())));
    assert_eq!(doc.get("duration"), Some(&Value::Int(234)));
    Ok(())
}

#[test]
fn update_that_breaks_the_schema_is_rejected_and_not_applied() -> Result<()> {
    let mut store = fixture_store(false);
    let err = store
        .update(
            &writer(),
            Collection::Builds,
            "1",
            &Document::new().with("url", Value::Null),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::Denied(reason) if reason.is_schema_failure()));

    let doc = store.get(&writer(), Collection::Builds, "1")?;
    assert_eq!(doc.get("url"), Some(&Value::Str("url1".into())));
    Ok(())
}

#[test]
fn builds_cannot_be_deleted_but_project_groups_can() -> Result<()> {
    let mut store = fixture_store(false);
    assert!(matches!(
        store.delete(&writer(), Collection::Builds, "1"),
        Err(StoreError::Denied(_))
    ));

    let group = Document::new()
        .with("name", "group")
        .with("projectIds", vec![Value::from("1")]);
    let id = store.create(&writer(), Collection::ProjectGroups, group)?;
    store.delete(&writer(), Collection::ProjectGroups, &id)?;
    assert!(matches!(
        store.get(&writer(), Collection::ProjectGroups, &id),
        Err(StoreError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn anonymous_viewers_read_dashboard_data_only_while_the_flag_is_on() -> Result<()> {
    let viewer = Actor::anonymous("viewer");

    let store = fixture_store(true);
    assert_eq!(store.list(&viewer, Collection::Projects)?.len(), 2);

    let store = fixture_store(false);
    assert!(matches!(
        store.list(&viewer, Collection::Projects),
        Err(StoreError::Denied(_))
    ));
    Ok(())
}

#[test]
fn profile_owners_manage_their_own_document_only() -> Result<()> {
    let mut store = fixture_store(false);
    let owner = Actor::anonymous("2");
    let profile = Document::new().with("selectedTheme", "ThemeType.dark");

    store.create_with_id(&owner, Collection::UserProfiles, "2", profile.clone())?;
    store.update(
        &owner,
        Collection::UserProfiles,
        "2",
        &Document::new().with("selectedTheme", "ThemeType.light"),
    )?;
    assert_eq!(
        store.get(&owner, Collection::UserProfiles, "2")?.get("selectedTheme"),
        Some(&Value::Str("ThemeType.light".into()))
    );

    let stranger = Actor::anonymous("3");
    assert!(matches!(
        store.create_with_id(&stranger, Collection::UserProfiles, "2", profile),
        Err(StoreError::Denied(_))
    ));
    assert!(matches!(
        store.get(&stranger, Collection::UserProfiles, "2"),
        Err(StoreError::Denied(_))
    ));
    Ok(())
}

#[test]
fn email_domain_validation_matches_the_allowed_set() {
    let store = fixture_store(false);
    assert!(store.validate_email_domain("user@gmail.com"));
    assert!(!store.validate_email_domain("user@invalid.com"));
}

#[test]
fn seeded_builds_are_schema_valid_and_reference_the_project() -> Result<()> {
    let mut store = MetricsStore::new();
    store.admin().allow_email_domain("gmail.com");

    let project_ids = seed_demo_projects(&mut store);
    assert_eq!(project_ids.len(), 2);
    assert!(store.project_exists(&project_ids[0]));

    let request: SeedRequest = serde_json::from_value(serde_json::json!({
        "builds_count": 25,
        "project_id": project_ids[0],
    }))?;
    let build_ids = seed_builds(&mut store, &request)?;
    assert_eq!(build_ids.len(), 25);

    for id in &build_ids {
        let doc = store.get(&writer(), Collection::Builds, id)?;
        assert_eq!(
            doc.get("projectId"),
            Some(&Value::Str(project_ids[0].clone()))
        );

        let duration = doc.get("duration").and_then(Value::as_int).unwrap();
        assert!((600_000..1_800_000).contains(&duration), "duration {duration}");

        let status = doc.get("buildStatus").and_then(Value::as_str).unwrap();
        assert!(status.starts_with("BuildStatus."), "status {status}");

        // Each seeded document would also pass the application write path.
        let decision = evaluate(
            &writer(),
            Operation::Create,
            Collection::Builds,
            None,
            Some(doc),
            &store,
        );
        assert!(decision.is_allowed(), "seeded build {id} fails validation");
    }
    Ok(())
}

#[test]
fn seeding_an_unknown_project_fails() {
    let mut store = MetricsStore::new();
    let request = SeedRequest {
        builds_count: 1,
        project_id: "non-existing-id".to_string(),
        start_date: None,
    };
    assert!(matches!(
        seed_builds(&mut store, &request),
        Err(StoreError::NotFound { .. })
    ));
}
