use crate::suite::support::Harness;
use crate::suite::support::ScriptedService;
use crate::suite::support::asset;
use crate::suite::support::folder;
use pretty_assertions::assert_eq;
use stacks_browser::BrowserEvent;
use stacks_browser::NodeKey;
use stacks_protocol::ColumnId;
use stacks_protocol::NodeType;
use stacks_protocol::VocabKind;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

fn service_with_asset() -> ScriptedService {
    ScriptedService::new()
        .with_roots(vec![folder("root", "Root")])
        .with_children("root", vec![])
        .with_assets("root", vec![asset("1", "scan.tif")])
        .with_vocab(
            VocabKind::MigrationStatus,
            &[("3", "Migrated"), ("1", "Pending")],
        )
        .with_vocab(VocabKind::User, &[("u7", "D. Archivist")])
}

#[tokio::test]
async fn commit_updates_locally_and_remotely() {
    let mut harness = Harness::start(service_with_asset()).await;
    harness.browser.load_roots().await;
    harness.browser.expand(&NodeKey::folder("root")).await;

    let key = NodeKey::asset("1");
    harness
        .browser
        .commit_edit(&key, ColumnId::MigrationStatus, Some("3".into()))
        .await;

    let node = harness.browser.tree().node(&key).expect("node");
    let fields = node.asset_fields().expect("asset fields");
    assert_eq!(fields.status_id.as_deref(), Some("3"));
    assert_eq!(fields.status_label.as_deref(), Some("Migrated"));

    let updates = harness.service.cell_updates.lock().expect("lock").clone();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].key, "a-1");
    assert_eq!(updates[0].kind, NodeType::Asset);
    assert_eq!(updates[0].field, ColumnId::MigrationStatus);
    assert_eq!(updates[0].value.as_deref(), Some("3"));
}

#[tokio::test]
async fn failed_commit_keeps_optimistic_value_and_notifies() {
    let mut harness = Harness::start(service_with_asset()).await;
    harness.browser.load_roots().await;
    harness.browser.expand(&NodeKey::folder("root")).await;
    harness.drain_events();
    harness
        .service
        .fail_cell_update
        .store(true, Ordering::SeqCst);

    let key = NodeKey::asset("1");
    harness
        .browser
        .commit_edit(&key, ColumnId::MigrationStatus, Some("3".into()))
        .await;

    // The optimistic local value survives the remote failure.
    let node = harness.browser.tree().node(&key).expect("node");
    assert_eq!(
        node.asset_fields().and_then(|fields| fields.status_id.as_deref()),
        Some("3")
    );
    let failed = harness
        .drain_events()
        .into_iter()
        .any(|event| matches!(event, BrowserEvent::EditFailed { .. }));
    assert!(failed, "edit failure must surface as a notice");
}

#[tokio::test]
async fn non_editable_cell_is_rejected_without_a_call() {
    let mut harness = Harness::start(service_with_asset()).await;
    harness.browser.load_roots().await;

    // Folders have no migration status; nothing is sent.
    harness
        .browser
        .commit_edit(&NodeKey::folder("root"), ColumnId::MigrationStatus, Some("3".into()))
        .await;
    assert!(harness.service.cell_updates.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn bulk_update_covers_the_whole_selection() {
    let mut harness = Harness::start(service_with_asset()).await;
    harness.browser.load_roots().await;
    let root = NodeKey::folder("root");
    harness.browser.select_descendants(&root, true).await;
    harness.drain_events();

    let mut changes = BTreeMap::new();
    changes.insert(ColumnId::MigrationStatus, "3".to_string());
    harness.browser.bulk_update(changes).await;

    let requests = harness.service.bulk_updates.lock().expect("lock").clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].asset_ids, vec!["1"]);
    assert_eq!(requests[0].folder_ids, vec!["root"]);

    // Local mirror: the selected asset shows the new status.
    let node = harness.browser.tree().node(&NodeKey::asset("1")).expect("node");
    assert_eq!(
        node.asset_fields().and_then(|fields| fields.status_label.as_deref()),
        Some("Migrated")
    );
    let applied = harness
        .drain_events()
        .into_iter()
        .any(|event| matches!(event, BrowserEvent::BulkApplied { updated: 2, .. }));
    assert!(applied);
}
