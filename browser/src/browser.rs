//! The browser facade: one struct owning the tree model, filter state, fetch
//! coordinator, and vocabularies. The TUI worker drives it; tests drive it
//! directly with an in-memory service.

use crate::cache::LoadSlot;
use crate::coordinator::FetchCoordinator;
use crate::edit;
use crate::events::BrowserEvent;
use crate::events::EventSender;
use crate::filter::FilterPhase;
use crate::filter::FilterState;
use crate::generation::Generation;
use crate::node::NodeKey;
use crate::node::TreeNode;
use crate::selection;
use crate::service::HierarchyService;
use crate::tree::FilterMode;
use crate::tree::RowView;
use crate::tree::SortSpec;
use crate::tree::TreeModel;
use crate::vocab::Vocabularies;
use stacks_protocol::BulkUpdateRequest;
use stacks_protocol::CellUpdateRequest;
use stacks_protocol::ColumnFilters;
use stacks_protocol::ColumnId;
use stacks_protocol::NodeType;
use stacks_protocol::VocabEntry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Owned snapshot of everything the renderer needs for one frame.
#[derive(Clone, Debug)]
pub struct TreeSnapshot {
    pub rows: Vec<RowView>,
    pub match_count: Option<usize>,
    pub selected_count: usize,
    pub query: String,
    pub column_filters: ColumnFilters,
    pub mode: FilterMode,
    pub phase: FilterPhase,
    pub sort: Option<SortSpec>,
    pub generation: u64,
}

pub struct Browser {
    coordinator: FetchCoordinator,
    tree: TreeModel,
    filter: FilterState,
    phase: FilterPhase,
    generation: Generation,
    vocabs: Vocabularies,
    events: EventSender,
}

impl Browser {
    /// Build the browser and fetch the option vocabularies once.
    pub async fn new(service: Arc<dyn HierarchyService>, events: EventSender) -> Self {
        let generation = Generation::new();
        let vocabs = Vocabularies::load(service.as_ref()).await;
        Self {
            coordinator: FetchCoordinator::new(service, generation.clone()),
            tree: TreeModel::new(),
            filter: FilterState::new(),
            phase: FilterPhase::Idle,
            generation,
            vocabs,
            events,
        }
    }

    /// Shared epoch handle. The UI supersedes it synchronously on every
    /// filter-affecting key before enqueueing the matching command, so
    /// in-flight work aborts without waiting for the worker queue.
    pub fn generation(&self) -> Generation {
        self.generation.clone()
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    pub fn vocabularies(&self) -> &Vocabularies {
        &self.vocabs
    }

    // Lazy loading -------------------------------------------------------

    /// Load the volume roots (cache-first, like any other level).
    pub async fn load_roots(&mut self) {
        let epoch = self.generation.current();
        let roots = self.coordinator.child_folders(&None).await;
        if !self.generation.is_current(epoch) {
            return;
        }
        self.tree.add_children(&None, roots);
    }

    /// Expand a folder: make sure its child folders and asset page are
    /// loaded, attach them, and mark the node expanded. A generation bump
    /// between fetch and attach discards the result.
    pub async fn expand(&mut self, key: &NodeKey) {
        if !self.tree.node(key).is_some_and(TreeNode::is_folder) {
            return;
        }
        let epoch = self.generation.current();
        if !self.ensure_children(key, epoch).await {
            return;
        }
        if !self.ensure_assets(key, epoch).await {
            return;
        }
        self.tree.set_expanded(key, true);
        self.reapply_active_filter();
    }

    pub fn collapse(&mut self, key: &NodeKey) {
        self.tree.set_expanded(key, false);
    }

    // Filtering ----------------------------------------------------------

    /// Debounced free-text input lands here; Escape lands here with an
    /// empty string.
    pub async fn set_query(&mut self, raw: &str) {
        self.filter.set_query(raw);
        self.run_filter().await;
    }

    pub async fn set_column_filter(&mut self, column: ColumnId, value: Option<String>) {
        self.filter.set_column_filter(column, value);
        self.run_filter().await;
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.filter.set_mode(mode);
        self.reapply_active_filter();
    }

    /// The filter pipeline: Searching, Materializing, Applying, back to
    /// Idle. Every stage boundary re-checks the epoch captured at the start
    /// and abandons the run silently when it moved.
    pub async fn run_filter(&mut self) {
        let epoch = self.generation.supersede();
        if self.filter.is_empty() {
            self.tree.clear_predicate();
            self.phase = FilterPhase::Idle;
            let _ = self.events.send(BrowserEvent::FilterCleared);
            return;
        }

        self.phase = FilterPhase::Searching;
        let outcome = self
            .coordinator
            .search(self.filter.query(), self.filter.column_filters())
            .await;
        if !self.generation.is_current(epoch) {
            self.phase = FilterPhase::Idle;
            return;
        }

        self.phase = FilterPhase::Materializing;
        for hit in &outcome.folders {
            if !self.materialize_chain(&hit.ancestor_path, epoch).await {
                self.phase = FilterPhase::Idle;
                return;
            }
        }
        for hit in &outcome.assets {
            if !self.materialize_chain(&hit.ancestor_path, epoch).await {
                self.phase = FilterPhase::Idle;
                return;
            }
            // The folder chain alone only materializes the asset's parent;
            // the asset page must be loaded for the hit row itself to exist.
            if let Some(parent_id) = hit.ancestor_path.last() {
                let parent = NodeKey::folder(parent_id.clone());
                if !self.ensure_assets(&parent, epoch).await {
                    self.phase = FilterPhase::Idle;
                    return;
                }
            }
        }

        self.phase = FilterPhase::Applying;
        let predicate = self.filter.predicate();
        let matches = self.tree.apply_predicate(&predicate, self.filter.mode());
        self.phase = FilterPhase::Idle;
        let _ = self.events.send(BrowserEvent::FilterApplied {
            matches,
            generation: epoch,
        });
    }

    /// Full reset: new epoch, cancel everything, drop the cache and loaded
    /// marks, clear query and column filters, collapse and deselect all,
    /// remove the predicate.
    pub fn clear_filters(&mut self) {
        self.generation.supersede();
        self.coordinator.clear_cache();
        self.filter.clear();
        self.tree.clear_predicate();
        self.tree.collapse_all();
        self.tree.clear_selection();
        self.tree.reset_loaded_flags();
        self.phase = FilterPhase::Idle;
        let _ = self.events.send(BrowserEvent::FilterCleared);
        let _ = self.events.send(BrowserEvent::SelectionChanged {
            selected: self.tree.selected_keys().clone(),
        });
    }

    // Selection ----------------------------------------------------------

    pub fn toggle_selected(&mut self, key: &NodeKey) -> bool {
        let selected = self.tree.toggle_selected(key);
        let _ = self.events.send(BrowserEvent::SelectionChanged {
            selected: self.tree.selected_keys().clone(),
        });
        selected
    }

    /// Cascade selection over a folder's descendants, loading unloaded
    /// subtrees lazily through the coordinator.
    pub async fn select_descendants(&mut self, key: &NodeKey, select: bool) {
        selection::load_and_select_descendants(
            &self.coordinator,
            &mut self.tree,
            &self.generation,
            &self.events,
            key.clone(),
            select,
        )
        .await;
        self.reapply_active_filter();
    }

    /// Toggle selection for exactly the current filtered matches.
    pub async fn select_all_filtered(&mut self, select: bool) {
        let predicate = self.filter.predicate();
        selection::select_all_filtered(
            &mut self.tree,
            &self.generation,
            &self.events,
            &predicate,
            select,
        )
        .await;
    }

    // Editing ------------------------------------------------------------

    pub fn edit_options(&self, column: ColumnId) -> Vec<VocabEntry> {
        edit::options_for(column, &self.vocabs)
    }

    pub fn is_editable(&self, key: &NodeKey, column: ColumnId) -> bool {
        self.tree
            .node(key)
            .is_some_and(|node| edit::is_editable(column, node.is_folder()))
    }

    /// Optimistic single-cell commit: the local value is updated first, then
    /// the change is sent to the service. A failed remote commit is logged
    /// and surfaced as a notice; the local value deliberately stays (see
    /// DESIGN.md).
    pub async fn commit_edit(&mut self, key: &NodeKey, column: ColumnId, value: Option<String>) {
        let label = edit::label_for_choice(column, &self.vocabs, value.as_deref());
        if !self
            .tree
            .set_cell_value(key, column, value.as_deref(), label.as_deref())
        {
            tracing::warn!(key = key.as_str(), column = %column, "cell is not editable");
            return;
        }
        let request = CellUpdateRequest {
            key: key.as_str().to_string(),
            kind: node_type(key),
            field: column,
            value: value.clone(),
        };
        let failure = match self.coordinator.service().update_cell(request).await {
            Ok(response) if response.ok => None,
            Ok(_) => Some("service rejected the update".to_string()),
            Err(error) => Some(error.to_string()),
        };
        if let Some(message) = failure {
            tracing::warn!(
                key = key.as_str(),
                column = %column,
                message,
                "cell update failed; keeping optimistic local value"
            );
            let _ = self.events.send(BrowserEvent::EditFailed {
                key: key.clone(),
                column,
                message,
            });
        }
    }

    /// Apply a set of field changes to every selected node via the bulk
    /// endpoint, then mirror the changes locally on success.
    pub async fn bulk_update(&mut self, changes: BTreeMap<ColumnId, String>) {
        let mut asset_ids = Vec::new();
        let mut folder_ids = Vec::new();
        for key in self.tree.selected_keys() {
            if key.is_asset() {
                asset_ids.push(key.server_id().to_string());
            } else {
                folder_ids.push(key.as_str().to_string());
            }
        }
        if asset_ids.is_empty() && folder_ids.is_empty() {
            return;
        }
        let request = BulkUpdateRequest {
            asset_ids,
            folder_ids,
            changes: changes.clone(),
        };
        match self.coordinator.service().bulk_update(request).await {
            Ok(response) => {
                let selected: Vec<NodeKey> = self.tree.selected_keys().iter().cloned().collect();
                for key in selected {
                    for (column, value) in &changes {
                        let label = edit::label_for_choice(*column, &self.vocabs, Some(value));
                        self.tree
                            .set_cell_value(&key, *column, Some(value), label.as_deref());
                    }
                }
                let _ = self.events.send(BrowserEvent::BulkApplied {
                    updated: response.updated_count,
                    messages: response.applied_messages,
                });
            }
            Err(error) => {
                tracing::warn!(%error, "bulk update failed");
                let _ = self.events.send(BrowserEvent::BulkApplied {
                    updated: 0,
                    messages: vec![format!("bulk update failed: {error}")],
                });
            }
        }
    }

    // Sort / snapshot ----------------------------------------------------

    pub fn toggle_sort(&mut self, column: ColumnId) -> SortSpec {
        self.tree.toggle_sort(column)
    }

    pub fn snapshot(&self, columns: &[ColumnId]) -> TreeSnapshot {
        TreeSnapshot {
            rows: self.tree.visible_rows(columns),
            match_count: self.tree.match_count(),
            selected_count: self.tree.selected_keys().len(),
            query: self.filter.query().to_string(),
            column_filters: self.filter.column_filters().clone(),
            mode: self.filter.mode(),
            phase: self.phase,
            sort: self.tree.sort_spec(),
            generation: self.generation.current(),
        }
    }

    // Internals ----------------------------------------------------------

    /// Fetch-and-attach one folder's children unless already loaded.
    /// Returns false when the epoch moved and the result was discarded.
    async fn ensure_children(&mut self, key: &NodeKey, epoch: u64) -> bool {
        let parent = Some(key.clone());
        if !self.coordinator.is_loaded(&parent, LoadSlot::Folders) {
            let children = self.coordinator.child_folders(&parent).await;
            if !self.generation.is_current(epoch) {
                return false;
            }
            self.tree.add_children(&parent, children);
        }
        self.mirror_loaded_flag(key, LoadSlot::Folders);
        true
    }

    async fn ensure_assets(&mut self, key: &NodeKey, epoch: u64) -> bool {
        let parent = Some(key.clone());
        if !self.coordinator.is_loaded(&parent, LoadSlot::Assets) {
            let assets = self.coordinator.child_assets(key).await;
            if !self.generation.is_current(epoch) {
                return false;
            }
            self.tree.add_children(&parent, assets);
        }
        self.mirror_loaded_flag(key, LoadSlot::Assets);
        true
    }

    /// Walk a search hit's ancestor chain root-to-parent, loading and
    /// expanding every folder on the way so the hit is reachable in the
    /// otherwise-lazy tree.
    async fn materialize_chain(&mut self, chain: &[String], epoch: u64) -> bool {
        if !self.coordinator.is_loaded(&None, LoadSlot::Folders) {
            let roots = self.coordinator.child_folders(&None).await;
            if !self.generation.is_current(epoch) {
                return false;
            }
            self.tree.add_children(&None, roots);
        }
        for id in chain {
            let key = NodeKey::folder(id.clone());
            if !self.ensure_children(&key, epoch).await {
                return false;
            }
            if !self.tree.is_expanded(&key) {
                self.tree.set_expanded(&key, true);
            }
        }
        true
    }

    fn mirror_loaded_flag(&mut self, key: &NodeKey, slot: LoadSlot) {
        if !self.coordinator.is_loaded(&Some(key.clone()), slot) {
            return;
        }
        if let Some(fields) = self
            .tree
            .node_mut(key)
            .and_then(|node| node.folder_fields_mut())
        {
            match slot {
                LoadSlot::Folders => fields.children_loaded = true,
                LoadSlot::Assets => fields.assets_loaded = true,
            }
        }
    }

    /// Nodes loaded after the predicate was applied have never been
    /// evaluated; re-apply so the view stays consistent with the filter.
    fn reapply_active_filter(&mut self) {
        if self.filter.is_empty() {
            return;
        }
        let predicate = self.filter.predicate();
        self.tree.apply_predicate(&predicate, self.filter.mode());
    }
}

fn node_type(key: &NodeKey) -> NodeType {
    if key.is_asset() {
        NodeType::Asset
    } else {
        NodeType::Folder
    }
}
