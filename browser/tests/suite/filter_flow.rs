use crate::suite::support::Harness;
use crate::suite::support::ScriptedService;
use crate::suite::support::asset;
use crate::suite::support::folder;
use pretty_assertions::assert_eq;
use stacks_browser::BrowserEvent;
use stacks_browser::NodeKey;
use stacks_protocol::AssetSummary;
use stacks_protocol::ColumnId;

fn deep_tree_service() -> ScriptedService {
    // Root > LibDigital > TUL_OHIST > Scans > scan_beta_001.tif
    ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![folder("lib", "LibDigital")])
        .with_children("lib", vec![folder("ohist", "TUL_OHIST")])
        .with_children("ohist", vec![folder("scans", "Scans")])
        .with_children("scans", vec![])
        .with_assets("scans", vec![asset("beta", "scan_beta_001.tif")])
        .with_asset_hit(
            asset("beta", "scan_beta_001.tif"),
            vec!["root", "lib", "ohist", "scans"],
        )
}

#[tokio::test]
async fn search_hit_materializes_every_ancestor() {
    let mut harness = Harness::start(deep_tree_service()).await;
    harness.browser.load_roots().await;

    harness.browser.set_query("beta").await;

    let tree = harness.browser.tree();
    for key in ["root", "lib", "ohist", "scans"] {
        let key = NodeKey::folder(key);
        assert!(tree.node(&key).is_some(), "{key} not materialized");
        assert!(tree.is_expanded(&key), "{key} not expanded");
    }
    assert!(tree.node(&NodeKey::asset("beta")).is_some());
    assert_eq!(tree.match_count(), Some(1));

    // The hit is reachable in the flattened view.
    let rows = harness.browser.snapshot(&[ColumnId::Title]);
    let keys: Vec<&str> = rows.rows.iter().map(|row| row.key.as_str()).collect();
    assert_eq!(keys, vec!["root", "lib", "ohist", "scans", "a-beta"]);
}

#[tokio::test]
async fn stale_search_result_is_discarded() {
    let mut harness = Harness::start(deep_tree_service()).await;
    harness.browser.load_roots().await;
    harness.drain_events();

    // The generation moves while the search is in flight, as if the user
    // kept typing (or hit Escape) before the response arrived.
    harness
        .service
        .bump_generation_on_search(harness.browser.generation());
    harness.browser.set_query("beta").await;

    let tree = harness.browser.tree();
    assert_eq!(tree.match_count(), None, "predicate applied from stale search");
    assert!(tree.node(&NodeKey::folder("lib")).is_none(), "stale hit materialized");
    assert_eq!(tree.expanded_count(), 0);
    let applied = harness
        .drain_events()
        .into_iter()
        .any(|event| matches!(event, BrowserEvent::FilterApplied { .. }));
    assert!(!applied, "stale search still reported a match count");
}

#[tokio::test]
async fn column_filter_matches_normalized_status() {
    let mut migrated = asset("m1", "migrated.tif");
    migrated.status_id = Some("3".into());
    let mut pending = asset("p1", "pending.tif");
    pending.status_id = Some("1".into());
    let no_status = asset("n1", "none.tif");

    let service = ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![])
        .with_assets("root", vec![migrated, pending, no_status]);
    let mut harness = Harness::start(service).await;
    harness.browser.load_roots().await;
    harness.browser.expand(&NodeKey::folder("root")).await;

    harness
        .browser
        .set_column_filter(ColumnId::MigrationStatus, Some("3".into()))
        .await;

    let tree = harness.browser.tree();
    assert_eq!(tree.match_count(), Some(1));
    assert!(!tree.is_hidden(&NodeKey::asset("m1")));
    assert!(tree.is_hidden(&NodeKey::asset("p1")));
    assert!(tree.is_hidden(&NodeKey::asset("n1")));
}

#[tokio::test]
async fn clearing_last_filter_restores_full_visibility() {
    let service = ScriptedService::new()
        .with_roots(vec![folder("root", "Root"), folder("other", "Other")])
        .with_children("root", vec![])
        .with_assets("root", vec![asset("1", "scan.tif")]);
    let mut harness = Harness::start(service).await;
    harness.browser.load_roots().await;
    harness.browser.expand(&NodeKey::folder("root")).await;

    harness
        .browser
        .set_column_filter(ColumnId::Duplicate, Some("true".into()))
        .await;
    assert_eq!(harness.browser.tree().match_count(), Some(0));

    harness
        .browser
        .set_column_filter(ColumnId::Duplicate, None)
        .await;
    assert_eq!(harness.browser.tree().match_count(), None);
    assert!(!harness.browser.tree().is_hidden(&NodeKey::folder("other")));
}

#[tokio::test]
async fn clear_filters_is_a_full_reset() {
    let mut harness = Harness::start(deep_tree_service()).await;
    harness.browser.load_roots().await;
    harness.browser.set_query("beta").await;
    harness
        .browser
        .select_descendants(&NodeKey::folder("scans"), true)
        .await;
    assert!(!harness.browser.tree().selected_keys().is_empty());

    harness.browser.clear_filters();

    let tree = harness.browser.tree();
    assert_eq!(harness.browser.filter().query(), "");
    assert!(harness.browser.filter().column_filters().is_empty());
    assert_eq!(tree.match_count(), None);
    assert_eq!(tree.expanded_count(), 0);
    assert!(tree.selected_keys().is_empty());

    // The hierarchy cache is empty again: re-expanding re-fetches.
    let before = harness.service.child_folder_fetches(Some("root"));
    harness.browser.expand(&NodeKey::folder("root")).await;
    let after = harness.service.child_folder_fetches(Some("root"));
    assert_eq!(after, before + 1, "expand after clear must hit the service");
}

#[tokio::test]
async fn folder_hits_materialize_and_match() {
    let mut crate_folder = folder("scans", "Scans");
    crate_folder.asset_count = 2;
    let service = ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![folder("scans", "Scans")])
        .with_children("scans", vec![])
        .with_folder_hit(crate_folder, vec!["root"]);
    let mut harness = Harness::start(service).await;
    harness.browser.load_roots().await;

    harness.browser.set_query("scans").await;

    let tree = harness.browser.tree();
    assert!(tree.is_expanded(&NodeKey::folder("root")));
    assert!(tree.node(&NodeKey::folder("scans")).is_some());
    assert_eq!(tree.match_count(), Some(1));
}

#[tokio::test]
async fn asset_summary_defaults_do_not_match_boolean_filters() {
    // An asset with a null duplicate flag normalizes to "", never "false".
    let service = ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![])
        .with_assets("root", vec![AssetSummary {
            id: "a-1".into(),
            title: "scan.tif".into(),
            duplicate: None,
            ..AssetSummary::default()
        }]);
    let mut harness = Harness::start(service).await;
    harness.browser.load_roots().await;
    harness.browser.expand(&NodeKey::folder("root")).await;

    harness
        .browser
        .set_column_filter(ColumnId::Duplicate, Some("false".into()))
        .await;
    assert_eq!(harness.browser.tree().match_count(), Some(0));
}
