use crate::suite::support::Harness;
use crate::suite::support::ScriptedService;
use crate::suite::support::asset;
use crate::suite::support::folder;
use pretty_assertions::assert_eq;
use stacks_browser::BrowserEvent;
use stacks_browser::NodeKey;
use stacks_protocol::ColumnId;

fn two_branch_service() -> ScriptedService {
    // root contains two unloaded folders, each holding assets.
    ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![folder("left", "Left"), folder("right", "Right")])
        .with_children("left", vec![])
        .with_children("right", vec![])
        .with_assets("root", vec![])
        .with_assets("left", vec![asset("l1", "left_1.tif"), asset("l2", "left_2.tif")])
        .with_assets("right", vec![asset("r1", "right_1.tif")])
}

#[tokio::test]
async fn descendant_selection_loads_and_selects_whole_subtree() {
    let mut harness = Harness::start(two_branch_service()).await;
    harness.browser.load_roots().await;

    let root = NodeKey::folder("root");
    harness.browser.select_descendants(&root, true).await;

    let selected = harness.browser.tree().selected_keys();
    let keys: Vec<&str> = selected.iter().map(NodeKey::as_str).collect();
    assert_eq!(keys, vec!["a-l1", "a-l2", "a-r1", "left", "right", "root"]);

    // Exactly one fetch per distinct folder key visited, per endpoint.
    for parent in ["root", "left", "right"] {
        assert_eq!(
            harness.service.child_folder_fetches(Some(parent)),
            1,
            "duplicate child fetch for {parent}"
        );
    }

    // The completion notification carries the authoritative set.
    let changed = harness
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            BrowserEvent::SelectionChanged { selected } => Some(selected),
            _ => None,
        })
        .last();
    assert_eq!(changed.map(|set| set.len()), Some(6));
}

#[tokio::test]
async fn reselecting_a_cached_subtree_fetches_nothing() {
    let mut harness = Harness::start(two_branch_service()).await;
    harness.browser.load_roots().await;
    let root = NodeKey::folder("root");

    harness.browser.select_descendants(&root, true).await;
    let fetches_after_first = harness.service.child_folder_fetches(Some("root"));

    harness.browser.select_descendants(&root, false).await;
    assert_eq!(
        harness.service.child_folder_fetches(Some("root")),
        fetches_after_first
    );
    assert!(harness.browser.tree().selected_keys().is_empty());
}

#[tokio::test]
async fn superseded_traversal_stops_and_keeps_partial_selection() {
    let service = two_branch_service();
    let mut harness = Harness::start(service).await;
    harness.browser.load_roots().await;

    // The generation moves while the left branch is being fetched; the
    // traversal stops there and whatever was already selected stays.
    harness
        .service
        .bump_generation_on_children_of("left", harness.browser.generation());
    let root = NodeKey::folder("root");
    harness.browser.select_descendants(&root, true).await;

    let tree = harness.browser.tree();
    assert!(tree.is_selected(&root));
    assert!(tree.is_selected(&NodeKey::folder("left")));
    // The right branch was never visited.
    assert!(!tree.is_selected(&NodeKey::asset("r1")));
    assert_eq!(harness.service.child_folder_fetches(Some("right")), 0);
}

#[tokio::test]
async fn select_all_toggles_exactly_the_filtered_matches() {
    let mut dup = asset("d1", "dup.tif");
    dup.duplicate = Some(true);
    let mut clean = asset("c1", "clean.tif");
    clean.duplicate = Some(false);
    let service = ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![])
        .with_assets("root", vec![dup, clean]);
    let mut harness = Harness::start(service).await;
    harness.browser.load_roots().await;
    harness.browser.expand(&NodeKey::folder("root")).await;

    // Pre-select a non-matching node; select-all must leave it alone.
    harness.browser.toggle_selected(&NodeKey::asset("c1"));
    harness
        .browser
        .set_column_filter(ColumnId::Duplicate, Some("true".into()))
        .await;

    harness.browser.select_all_filtered(true).await;
    let selected: Vec<&str> = harness
        .browser
        .tree()
        .selected_keys()
        .iter()
        .map(NodeKey::as_str)
        .collect();
    assert_eq!(selected, vec!["a-c1", "a-d1"]);

    harness.browser.select_all_filtered(false).await;
    let selected: Vec<&str> = harness
        .browser
        .tree()
        .selected_keys()
        .iter()
        .map(NodeKey::as_str)
        .collect();
    assert_eq!(selected, vec!["a-c1"], "non-matching selection must survive");
}

#[tokio::test]
async fn fully_loaded_folder_still_notifies() {
    let service = ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![])
        .with_assets("root", vec![asset("1", "only.tif")]);
    let mut harness = Harness::start(service).await;
    harness.browser.load_roots().await;
    let root = NodeKey::folder("root");
    harness.browser.expand(&root).await;
    harness.drain_events();

    // Everything is already cached; the sweep is effectively synchronous but
    // still flows through the queue and emits the final notification.
    harness.browser.select_descendants(&root, true).await;
    let notified = harness
        .drain_events()
        .into_iter()
        .any(|event| matches!(event, BrowserEvent::SelectionChanged { .. }));
    assert!(notified);
    assert!(harness.browser.tree().is_selected(&NodeKey::asset("1")));
}
