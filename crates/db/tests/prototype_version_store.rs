//! Integration tests for the prototype version store.
//!
//! Covers paging, relabelling, comparison, the one-snapshot-per-version
//! constraint, and cascade deletion.

use serde_json::json;
use sqlx::PgPool;
use uswds_pt_core::fingerprint::content_checksum;
use uswds_pt_core::versioning::{CompareTarget, MutationOutcome, PageWindow, MAX_PAGE_SIZE};
use uswds_pt_db::is_unique_violation;
use uswds_pt_db::models::prototype::{CreatePrototype, Prototype};
use uswds_pt_db::models::prototype_version::CreatePrototypeVersion;
use uswds_pt_db::repositories::prototype_version_repo::SNAPSHOT_UNIQUE_CONSTRAINT;
use uswds_pt_db::repositories::{PrototypeRepo, PrototypeVersionRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a prototype and apply `updates` content changes to it.
async fn prototype_with_history(pool: &PgPool, updates: i32) -> Prototype {
    let mut proto = PrototypeRepo::create(
        pool,
        &CreatePrototype {
            name: "History".to_string(),
            html_content: "<p>v1</p>".to_string(),
            project_data: json!({ "v": 1 }),
        },
        None,
    )
    .await
    .unwrap();

    for _ in 0..updates {
        let next = proto.version + 1;
        let outcome = PrototypeRepo::update_content(
            pool,
            proto.id,
            proto.version,
            &format!("<p>v{next}</p>"),
            &json!({ "v": next }),
            None,
        )
        .await
        .unwrap();
        proto = match outcome {
            MutationOutcome::Applied(p) => p,
            other => panic!("update failed: {other:?}"),
        };
    }
    proto
}

// ---------------------------------------------------------------------------
// Test: listing is newest-first and paginated with a total
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_paginates_newest_first(pool: PgPool) {
    let proto = prototype_with_history(&pool, 25).await;

    let window = PageWindow::from_request(Some(1), Some(10));
    let (page1, total) =
        PrototypeVersionRepo::list_by_prototype(&pool, proto.id, window.page_size, window.offset())
            .await
            .unwrap();
    assert_eq!(total, 25);
    assert_eq!(page1.len(), 10);
    assert_eq!(page1[0].version_number, 25);
    assert_eq!(page1[9].version_number, 16);

    let window = PageWindow::from_request(Some(3), Some(10));
    let (page3, _) =
        PrototypeVersionRepo::list_by_prototype(&pool, proto.id, window.page_size, window.offset())
            .await
            .unwrap();
    let numbers: Vec<i32> = page3.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, vec![5, 4, 3, 2, 1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_page_size_is_capped(pool: PgPool) {
    let proto = prototype_with_history(&pool, 3).await;

    let window = PageWindow::from_request(None, Some(100_000));
    assert_eq!(window.page_size, MAX_PAGE_SIZE);

    let (items, total) =
        PrototypeVersionRepo::list_by_prototype(&pool, proto.id, window.page_size, window.offset())
            .await
            .unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(total, 3);
}

// ---------------------------------------------------------------------------
// Test: relabel touches only the label
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_relabel_changes_only_label(pool: PgPool) {
    let proto = prototype_with_history(&pool, 2).await;
    let before = PrototypeVersionRepo::find_by_prototype_and_version(&pool, proto.id, 1)
        .await
        .unwrap()
        .unwrap();
    assert!(before.label.is_none());

    let labelled = PrototypeVersionRepo::update_label(&pool, proto.id, 1, Some("Before review"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(labelled.label.as_deref(), Some("Before review"));
    assert_eq!(labelled.html_content, before.html_content);
    assert_eq!(labelled.content_checksum, before.content_checksum);

    let cleared = PrototypeVersionRepo::update_label(&pool, proto.id, 1, None)
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.label.is_none());

    // The document's version counter is unaffected.
    assert_eq!(
        PrototypeRepo::current_version(&pool, proto.id).await.unwrap(),
        Some(3)
    );

    assert!(PrototypeVersionRepo::update_label(&pool, proto.id, 99, Some("x"))
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: compare returns only the HTML of both sides
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compare_version_with_current(pool: PgPool) {
    let proto = prototype_with_history(&pool, 1).await;

    let cmp = PrototypeVersionRepo::compare(
        &pool,
        proto.id,
        CompareTarget::Version(1),
        CompareTarget::Current,
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(cmp.a.version_number, CompareTarget::Version(1));
    assert_eq!(cmp.a.html_content, "<p>v1</p>");
    assert_eq!(cmp.b.version_number, CompareTarget::Current);
    assert_eq!(cmp.b.html_content, "<p>v2</p>");

    let body = serde_json::to_value(&cmp).unwrap();
    assert_eq!(body["a"]["version_number"], 1);
    assert_eq!(body["b"]["version_number"], "current");
    assert!(body["a"].get("project_data").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_compare_missing_version_is_none(pool: PgPool) {
    let proto = prototype_with_history(&pool, 1).await;

    let cmp = PrototypeVersionRepo::compare(
        &pool,
        proto.id,
        CompareTarget::Version(7),
        CompareTarget::Current,
    )
    .await
    .unwrap();
    assert!(cmp.is_none());
}

// ---------------------------------------------------------------------------
// Test: one snapshot per (prototype, version)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_snapshot_is_rejected(pool: PgPool) {
    let proto = prototype_with_history(&pool, 1).await;
    let data = json!({ "v": 1 });
    let checksum = content_checksum("<p>v1</p>", &data);

    let err = PrototypeVersionRepo::create(
        &pool,
        &CreatePrototypeVersion {
            prototype_id: proto.id,
            version_number: 1,
            html_content: "<p>v1</p>",
            project_data: &data,
            content_checksum: &checksum,
            created_by: None,
        },
    )
    .await
    .unwrap_err();

    assert!(is_unique_violation(&err, SNAPSHOT_UNIQUE_CONSTRAINT));
}

// ---------------------------------------------------------------------------
// Test: deleting a prototype removes its snapshots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_cascades_to_snapshots(pool: PgPool) {
    let proto = prototype_with_history(&pool, 3).await;

    assert!(PrototypeRepo::delete(&pool, proto.id).await.unwrap());
    assert!(!PrototypeRepo::delete(&pool, proto.id).await.unwrap());

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM prototype_versions WHERE prototype_id = $1")
            .bind(proto.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}

// ---------------------------------------------------------------------------
// Test: prototype listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prototype_list_counts_all_rows(pool: PgPool) {
    for _ in 0..3 {
        prototype_with_history(&pool, 0).await;
    }

    let (items, total) = PrototypeRepo::list(&pool, 2, 0).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(total, 3);
}
