//! Integration tests for on-demand resolution and plan building
//!
//! Every test runs against an in-memory registry served by
//! `common::FixtureTransport`.

mod common;

use common::{client, FixtureTransport};
use ctxs_core::registry::{
    resolve_items_tree, resolve_registry_items, RegistryError, Resolution,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

fn resolved_names(resolution: &Resolution) -> Vec<&str> {
    resolution
        .resolved
        .iter()
        .map(|r| r.item.name.as_str())
        .collect()
}

// ============================================================================
// Ordering and termination
// ============================================================================

#[tokio::test]
async fn test_dependency_is_placed_at_first_discovery() {
    let (client, transport) = client(
        FixtureTransport::new()
            .with_item("a", "registry:ui", &["b", "c"])
            .with_item("b", "registry:ui", &[])
            .with_item("c", "registry:lib", &[]),
    );

    let resolution = resolve_registry_items(&client, &["a", "b"]).await;

    assert_eq!(resolved_names(&resolution), vec!["a", "b", "c"]);
    assert!(resolution.failures.is_empty());
    assert_eq!(transport.hits("styles/default/b.json"), 1);
}

#[tokio::test]
async fn test_cycle_terminates_with_each_item_once() {
    let (client, transport) = client(
        FixtureTransport::new()
            .with_item("a", "registry:ui", &["b"])
            .with_item("b", "registry:ui", &["a"]),
    );

    let resolution = resolve_registry_items(&client, &["a"]).await;

    assert_eq!(resolved_names(&resolution), vec!["a", "b"]);
    assert_eq!(transport.total_hits(), 2);
}

#[tokio::test]
async fn test_resolved_urls_are_absolute() {
    let (client, _) = client(FixtureTransport::new().with_item("a", "registry:ui", &[]));

    let resolution = resolve_registry_items(&client, &["a"]).await;
    assert_eq!(
        resolution.urls(),
        vec!["https://registry.test/r/styles/default/a.json"]
    );
}

// ============================================================================
// Partial failure
// ============================================================================

#[tokio::test]
async fn test_missing_dependency_does_not_abort_siblings() {
    let (client, _) = client(
        FixtureTransport::new()
            .with_item("a", "registry:ui", &["ghost", "c"])
            .with_item("c", "registry:lib", &[]),
    );

    let resolution = resolve_registry_items(&client, &["a"]).await;

    assert_eq!(resolved_names(&resolution), vec!["a", "c"]);
    assert_eq!(resolution.failures.len(), 1);

    let failure = &resolution.failures[0];
    assert_eq!(failure.requested, "ghost");
    assert_eq!(failure.required_by.as_deref(), Some("a"));
    assert!(failure.error.is_not_found());
    assert_eq!(resolution.failed_requests().count(), 0);
}

#[tokio::test]
async fn test_invalid_item_is_reported_and_skipped() {
    let (client, _) = client(
        FixtureTransport::new()
            .with_json(
                "styles/default/broken.json",
                json!({"name": "broken", "type": "registry:page",
                       "files": [{"path": "page.tsx", "type": "registry:page"}]}),
            )
            .with_item("ok", "registry:ui", &[]),
    );

    let resolution = resolve_registry_items(&client, &["broken", "ok"]).await;

    assert_eq!(resolved_names(&resolution), vec!["ok"]);
    let failed: Vec<&str> = resolution
        .failed_requests()
        .map(|f| f.requested.as_str())
        .collect();
    assert_eq!(failed, vec!["broken"]);
    assert!(matches!(
        resolution.failures[0].error,
        RegistryError::Validation { .. }
    ));
}

#[tokio::test]
async fn test_auth_failure_is_classified() {
    let (client, _) = client(
        FixtureTransport::new().with_status("styles/default/private.json", 401, ""),
    );

    let resolution = resolve_registry_items(&client, &["private"]).await;
    assert!(resolution.is_empty());
    assert!(resolution.failures[0].error.needs_auth());
}

// ============================================================================
// Fetch coalescing
// ============================================================================

#[tokio::test]
async fn test_concurrent_resolutions_share_requests() {
    let (client, transport) = client(
        FixtureTransport::new()
            .with_delay(Duration::from_millis(20))
            .with_item("a", "registry:ui", &["utils"])
            .with_item("b", "registry:ui", &["utils"])
            .with_item("utils", "registry:lib", &[]),
    );

    let (first, second) = tokio::join!(
        resolve_registry_items(&client, &["a"]),
        resolve_registry_items(&client, &["b"]),
    );

    assert_eq!(resolved_names(&first), vec!["a", "utils"]);
    assert_eq!(resolved_names(&second), vec!["b", "utils"]);
    assert_eq!(transport.hits("styles/default/utils.json"), 1);
}

#[tokio::test]
async fn test_cached_failure_needs_clear_before_retry() {
    let (client, transport) = client(FixtureTransport::new());

    resolve_registry_items(&client, &["late"]).await;
    resolve_registry_items(&client, &["late"]).await;
    assert_eq!(transport.hits("styles/default/late.json"), 1);

    client.cache().clear();
    resolve_registry_items(&client, &["late"]).await;
    assert_eq!(transport.hits("styles/default/late.json"), 2);
}

// ============================================================================
// URL handling
// ============================================================================

#[tokio::test]
async fn test_chat_b_url_is_fetched_with_json_suffix() {
    let (client, transport) = client(FixtureTransport::new().with_json(
        "https://host.test/chat/b/XYZ/json",
        json!({"name": "hosted", "type": "registry:block"}),
    ));

    let resolution = resolve_registry_items(&client, &["https://host.test/chat/b/XYZ"]).await;

    assert_eq!(resolved_names(&resolution), vec!["hosted"]);
    assert_eq!(transport.hits("https://host.test/chat/b/XYZ/json"), 1);
    assert_eq!(transport.hits("https://host.test/chat/b/XYZ"), 0);
}

#[tokio::test]
async fn test_not_found_names_the_url() {
    let (client, _) = client(FixtureTransport::new());

    let err = client.get_registry_item("nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err
        .to_string()
        .contains("https://registry.test/r/styles/default/nope.json"));
}

// ============================================================================
// End-to-end plan
// ============================================================================

#[tokio::test]
async fn test_resolve_items_tree_merges_in_resolution_order() {
    let (client, _) = client(
        FixtureTransport::new()
            .with_index(&["index", "button", "utils"])
            .with_item("index", "registry:style", &["utils"])
            .with_item("button", "registry:ui", &["utils"])
            .with_item("utils", "registry:lib", &[]),
    );

    let resolved = resolve_items_tree(&client, &["button", "index"])
        .await
        .unwrap();

    assert_eq!(
        resolved_names(&resolved.resolution),
        vec!["index", "utils", "button"]
    );
    assert_eq!(
        resolved.plan.dependencies,
        vec!["index-pkg", "utils-pkg", "button-pkg"]
    );
    let paths: Vec<&str> = resolved.plan.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["ui/index.tsx", "ui/utils.tsx", "ui/button.tsx"]);
}

#[tokio::test]
async fn test_resolve_items_tree_tolerates_partial_failure() {
    let (client, _) = client(
        FixtureTransport::new()
            .with_index(&["button"])
            .with_item("button", "registry:ui", &[]),
    );

    let resolved = resolve_items_tree(&client, &["button", "missing"])
        .await
        .unwrap();

    assert_eq!(resolved_names(&resolved.resolution), vec!["button"]);
    assert_eq!(resolved.resolution.failed_requests().count(), 1);
}

#[tokio::test]
async fn test_resolve_items_tree_fails_when_nothing_resolves() {
    let (client, _) = client(FixtureTransport::new().with_index(&[]));

    let err = resolve_items_tree(&client, &["missing"]).await.unwrap_err();
    match err {
        RegistryError::NothingResolved { names } => assert_eq!(names, vec!["missing"]),
        other => panic!("expected NothingResolved, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resolve_items_tree_requires_index() {
    let (client, _) = client(FixtureTransport::new().with_item("button", "registry:ui", &[]));

    let err = resolve_items_tree(&client, &["button"]).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.url(), Some("https://registry.test/r/index.json"));
}
