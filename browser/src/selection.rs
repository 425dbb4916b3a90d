//! Selection engine: recursive, cancelable, lazy descendant selection and
//! filtered select-all. Both sweeps re-derive the authoritative selection set
//! from the tree model when they settle and notify the observer channel.

use crate::cache::LoadSlot;
use crate::coordinator::FetchCoordinator;
use crate::events::BrowserEvent;
use crate::events::EventSender;
use crate::filter::FilterPredicate;
use crate::generation::Generation;
use crate::node::NodeKey;
use crate::tree::TreeModel;
use std::collections::VecDeque;

/// How many processed nodes between cooperative yields during large sweeps.
const YIELD_EVERY: usize = 128;

/// Breadth-first descendant selection starting at `start`. Each dequeued
/// folder has its child folders and assets loaded through the coordinator
/// (cache-deduplicated), every now-known child gets `select` applied, and
/// child folders are enqueued for further descent. A generation bump aborts
/// the whole traversal silently; selection already applied stays as-is.
pub(crate) async fn load_and_select_descendants(
    coordinator: &FetchCoordinator,
    tree: &mut TreeModel,
    generation: &Generation,
    events: &EventSender,
    start: NodeKey,
    select: bool,
) {
    let epoch = generation.current();
    tree.set_selected(&start, select);

    let mut queue: VecDeque<NodeKey> = VecDeque::from([start]);
    let mut processed = 0usize;
    while let Some(folder) = queue.pop_front() {
        if !generation.is_current(epoch) {
            tracing::debug!(
                folder = folder.as_str(),
                "descendant selection superseded; stopping traversal"
            );
            break;
        }
        let parent = Some(folder.clone());
        let child_folders = coordinator.child_folders(&parent).await;
        tree.add_children(&parent, child_folders);
        mark_loaded(coordinator, tree, &folder, LoadSlot::Folders);

        let assets = coordinator.child_assets(&folder).await;
        tree.add_children(&parent, assets);
        mark_loaded(coordinator, tree, &folder, LoadSlot::Assets);

        if !generation.is_current(epoch) {
            break;
        }
        let children: Vec<NodeKey> = tree.children_of(&parent).to_vec();
        for key in children {
            tree.set_selected(&key, select);
            if tree.node(&key).is_some_and(|node| node.is_folder()) {
                queue.push_back(key);
            }
            processed += 1;
            if processed % YIELD_EVERY == 0 {
                let _ = events.send(BrowserEvent::SelectionProgress { processed });
                tokio::task::yield_now().await;
            }
        }
    }

    let selected = tree.selected_keys().clone();
    let _ = events.send(BrowserEvent::SelectionChanged { selected });
}

/// Toggle selection for exactly the nodes the active predicate matches,
/// chunked so very large trees keep the UI responsive.
pub(crate) async fn select_all_filtered(
    tree: &mut TreeModel,
    generation: &Generation,
    events: &EventSender,
    predicate: &FilterPredicate,
    select: bool,
) {
    let epoch = generation.current();
    let matches = tree.matching_keys(predicate);
    for (index, key) in matches.into_iter().enumerate() {
        if !generation.is_current(epoch) {
            break;
        }
        tree.set_selected(&key, select);
        if (index + 1) % YIELD_EVERY == 0 {
            let _ = events.send(BrowserEvent::SelectionProgress {
                processed: index + 1,
            });
            tokio::task::yield_now().await;
        }
    }

    let selected = tree.selected_keys().clone();
    let _ = events.send(BrowserEvent::SelectionChanged { selected });
}

/// Copy the cache's loaded mark onto the folder node so the row shows the
/// right expander state. Failed fetches leave the mark unset, which keeps
/// the folder retryable.
fn mark_loaded(
    coordinator: &FetchCoordinator,
    tree: &mut TreeModel,
    folder: &NodeKey,
    slot: LoadSlot,
) {
    if !coordinator.is_loaded(&Some(folder.clone()), slot) {
        return;
    }
    if let Some(fields) = tree.node_mut(folder).and_then(|node| node.folder_fields_mut()) {
        match slot {
            LoadSlot::Folders => fields.children_loaded = true,
            LoadSlot::Assets => fields.assets_loaded = true,
        }
    }
}
