//! Headless tree model: node storage, sibling order, expansion, selection,
//! filter visibility, and sort state. The TUI renders the flattened rows this
//! model produces; tests drive it directly without a terminal.

use crate::filter::FilterPredicate;
use crate::node::NodeKey;
use crate::node::NodeKind;
use crate::node::ParentKey;
use crate::node::TreeNode;
use stacks_protocol::ColumnId;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use time::macros::format_description;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Non-matching rows are removed from the layout. Ancestors of a match
    /// stay visible as path carriers.
    #[default]
    Hide,
    /// Non-matching rows stay in place, visually de-emphasized.
    Dim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub column: ColumnId,
    pub ascending: bool,
}

/// One visible row of the flattened tree, ready for a virtualized renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub key: NodeKey,
    pub depth: u16,
    pub is_folder: bool,
    pub has_children: bool,
    pub expanded: bool,
    pub selected: bool,
    pub dimmed: bool,
    pub cells: Vec<String>,
}

#[derive(Debug, Default)]
pub struct TreeModel {
    nodes: HashMap<NodeKey, TreeNode>,
    children: HashMap<ParentKey, Vec<NodeKey>>,
    expanded: HashSet<NodeKey>,
    selected: BTreeSet<NodeKey>,
    hidden: HashSet<NodeKey>,
    dimmed: HashSet<NodeKey>,
    sort: Option<SortSpec>,
    match_count: Option<usize>,
}

impl TreeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, key: &NodeKey) -> Option<&TreeNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: &NodeKey) -> Option<&mut TreeNode> {
        self.nodes.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children_of(&self, parent: &ParentKey) -> &[NodeKey] {
        self.children.get(parent).map_or(&[], Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.nodes.keys()
    }

    /// Attach fetched children under a parent. Idempotent: nodes whose key is
    /// already present among the parent's children are skipped, so overlapping
    /// lazy loads never duplicate rows. Re-applies the active sort to the
    /// touched sibling list. Returns how many nodes were actually added.
    pub fn add_children(&mut self, parent: &ParentKey, nodes: Vec<TreeNode>) -> usize {
        let mut added = 0;
        for node in nodes {
            if self.nodes.contains_key(&node.key) {
                continue;
            }
            self.children
                .entry(parent.clone())
                .or_default()
                .push(node.key.clone());
            self.nodes.insert(node.key.clone(), node);
            added += 1;
        }
        if added > 0
            && let Some(spec) = self.sort
        {
            self.sort_siblings(parent, spec);
        }
        added
    }

    /// Update one cell in place. `value` carries the stored id (or raw
    /// value), `label` the human-readable form for vocabulary columns.
    /// Returns false when the node is missing or the column is not editable
    /// for the node's kind.
    pub fn set_cell_value(
        &mut self,
        key: &NodeKey,
        column: ColumnId,
        value: Option<&str>,
        label: Option<&str>,
    ) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        let owned = |text: Option<&str>| text.map(str::to_string);
        match (&mut node.kind, column) {
            (NodeKind::Folder(fields), ColumnId::AssignedUser) => {
                fields.assigned_user_id = owned(value);
                fields.assigned_user_label = owned(label);
            }
            (NodeKind::Folder(fields), ColumnId::Notes) => {
                fields.notes = owned(value);
            }
            (NodeKind::Asset(fields), ColumnId::MigrationStatus) => {
                fields.status_id = owned(value);
                fields.status_label = owned(label);
            }
            (NodeKind::Asset(fields), ColumnId::AssignedUser) => {
                fields.assigned_user_id = owned(value);
                fields.assigned_user_label = owned(label);
            }
            (NodeKind::Asset(fields), ColumnId::Duplicate) => {
                fields.duplicate = value.and_then(|text| text.parse().ok());
            }
            (NodeKind::Asset(fields), ColumnId::Linked) => {
                fields.linked = value.and_then(|text| text.parse().ok());
            }
            (NodeKind::Asset(fields), ColumnId::Notes) => {
                fields.notes = owned(value);
            }
            _ => return false,
        }
        true
    }

    /// Ancestor titles plus the node's own, root first. This is what the
    /// free-text filter matches in addition to the node's display text.
    pub fn path_text(&self, key: &NodeKey) -> String {
        let mut titles = Vec::new();
        let mut cursor = self.nodes.get(key);
        while let Some(node) = cursor {
            titles.push(node.title.clone());
            cursor = node.parent.as_ref().and_then(|parent| self.nodes.get(parent));
        }
        titles.reverse();
        titles.join(" > ")
    }

    // Expansion ---------------------------------------------------------

    pub fn is_expanded(&self, key: &NodeKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn set_expanded(&mut self, key: &NodeKey, expanded: bool) {
        if expanded {
            self.expanded.insert(key.clone());
        } else {
            self.expanded.remove(key);
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    // Selection ---------------------------------------------------------

    pub fn is_selected(&self, key: &NodeKey) -> bool {
        self.selected.contains(key)
    }

    /// Authoritative selection set, always read back after engine mutations.
    pub fn selected_keys(&self) -> &BTreeSet<NodeKey> {
        &self.selected
    }

    pub fn set_selected(&mut self, key: &NodeKey, selected: bool) {
        if !self.nodes.contains_key(key) {
            return;
        }
        if selected {
            self.selected.insert(key.clone());
        } else {
            self.selected.remove(key);
        }
    }

    /// Toggle and return the new state.
    pub fn toggle_selected(&mut self, key: &NodeKey) -> bool {
        let next = !self.is_selected(key);
        self.set_selected(key, next);
        next
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // Filter visibility -------------------------------------------------

    /// Evaluate the predicate against every materialized node and record
    /// visibility per the mode. Lazy, not-yet-loaded nodes are simply absent
    /// and get evaluated when a later apply sees them. Returns the match
    /// count over materialized nodes.
    pub fn apply_predicate(&mut self, predicate: &FilterPredicate, mode: FilterMode) -> usize {
        let mut matches: HashSet<NodeKey> = HashSet::new();
        for (key, node) in &self.nodes {
            if predicate.matches(node, &self.path_text(key)) {
                matches.insert(key.clone());
            }
        }
        let count = matches.len();

        self.hidden.clear();
        self.dimmed.clear();
        match mode {
            FilterMode::Hide => {
                let mut visible = matches.clone();
                for key in &matches {
                    let mut cursor = self.nodes.get(key).and_then(|node| node.parent.clone());
                    while let Some(parent) = cursor {
                        if !visible.insert(parent.clone()) {
                            break;
                        }
                        cursor = self
                            .nodes
                            .get(&parent)
                            .and_then(|node| node.parent.clone());
                    }
                }
                self.hidden = self
                    .nodes
                    .keys()
                    .filter(|key| !visible.contains(*key))
                    .cloned()
                    .collect();
            }
            FilterMode::Dim => {
                self.dimmed = self
                    .nodes
                    .keys()
                    .filter(|key| !matches.contains(*key))
                    .cloned()
                    .collect();
            }
        }
        self.match_count = Some(count);
        count
    }

    /// Count matches without touching visibility.
    pub fn count_matches(&self, predicate: &FilterPredicate) -> usize {
        self.nodes
            .iter()
            .filter(|(key, node)| predicate.matches(node, &self.path_text(key)))
            .count()
    }

    /// Keys of materialized nodes matching the predicate, in sibling order.
    pub fn matching_keys(&self, predicate: &FilterPredicate) -> Vec<NodeKey> {
        let mut keys = Vec::new();
        self.collect_matching(&None, predicate, &mut keys);
        keys
    }

    fn collect_matching(
        &self,
        parent: &ParentKey,
        predicate: &FilterPredicate,
        out: &mut Vec<NodeKey>,
    ) {
        for key in self.children_of(parent) {
            if let Some(node) = self.nodes.get(key)
                && predicate.matches(node, &self.path_text(key))
            {
                out.push(key.clone());
            }
            self.collect_matching(&Some(key.clone()), predicate, out);
        }
    }

    pub fn clear_predicate(&mut self) {
        self.hidden.clear();
        self.dimmed.clear();
        self.match_count = None;
    }

    pub fn match_count(&self) -> Option<usize> {
        self.match_count
    }

    pub fn is_hidden(&self, key: &NodeKey) -> bool {
        self.hidden.contains(key)
    }

    /// Reset every folder's loaded flags; pairs with a cache clear so the
    /// next expand re-fetches.
    pub fn reset_loaded_flags(&mut self) {
        for node in self.nodes.values_mut() {
            if let Some(fields) = node.folder_fields_mut() {
                fields.children_loaded = false;
                fields.assets_loaded = false;
            }
        }
    }

    // Sort --------------------------------------------------------------

    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Activate or flip the sort on a column, then re-sort every loaded
    /// sibling list. Folders always group before assets; the sort is stable
    /// within each group.
    pub fn toggle_sort(&mut self, column: ColumnId) -> SortSpec {
        let spec = match self.sort {
            Some(current) if current.column == column => SortSpec {
                column,
                ascending: !current.ascending,
            },
            _ => SortSpec {
                column,
                ascending: true,
            },
        };
        self.sort = Some(spec);
        let parents: Vec<ParentKey> = self.children.keys().cloned().collect();
        for parent in parents {
            self.sort_siblings(&parent, spec);
        }
        spec
    }

    fn sort_siblings(&mut self, parent: &ParentKey, spec: SortSpec) {
        let Some(siblings) = self.children.get(parent) else {
            return;
        };
        let mut ordered = siblings.clone();
        ordered.sort_by(|a, b| {
            let (Some(left), Some(right)) = (self.nodes.get(a), self.nodes.get(b)) else {
                return Ordering::Equal;
            };
            compare_nodes(left, right, spec)
        });
        self.children.insert(parent.clone(), ordered);
    }

    // Rendering ---------------------------------------------------------

    /// Depth-first flattening of the expanded, visible tree with display
    /// cells for the requested columns.
    pub fn visible_rows(&self, columns: &[ColumnId]) -> Vec<RowView> {
        let mut rows = Vec::new();
        self.flatten(&None, 0, columns, &mut rows);
        rows
    }

    fn flatten(&self, parent: &ParentKey, depth: u16, columns: &[ColumnId], out: &mut Vec<RowView>) {
        for key in self.children_of(parent) {
            if self.hidden.contains(key) {
                continue;
            }
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            let expanded = self.expanded.contains(key);
            out.push(RowView {
                key: key.clone(),
                depth,
                is_folder: node.is_folder(),
                has_children: self.node_has_children(node),
                expanded,
                selected: self.selected.contains(key),
                dimmed: self.dimmed.contains(key),
                cells: columns
                    .iter()
                    .map(|column| display_cell(node, *column))
                    .collect(),
            });
            if node.is_folder() && expanded {
                self.flatten(&Some(key.clone()), depth + 1, columns, out);
            }
        }
    }

    fn node_has_children(&self, node: &TreeNode) -> bool {
        let Some(fields) = node.folder_fields() else {
            return false;
        };
        if !fields.children_loaded || !fields.assets_loaded {
            return true;
        }
        !self.children_of(&Some(node.key.clone())).is_empty()
    }
}

fn compare_nodes(left: &TreeNode, right: &TreeNode, spec: SortSpec) -> Ordering {
    let group = right.is_folder().cmp(&left.is_folder());
    if group != Ordering::Equal {
        return group;
    }
    let ordering = match spec.column {
        ColumnId::FileSize | ColumnId::AssetCount => {
            numeric_value(left, spec.column).cmp(&numeric_value(right, spec.column))
        }
        ColumnId::CreatedAt | ColumnId::ModifiedAt => {
            date_value(left, spec.column).cmp(&date_value(right, spec.column))
        }
        _ => left
            .normalized_value(spec.column)
            .to_lowercase()
            .cmp(&right.normalized_value(spec.column).to_lowercase()),
    };
    if spec.ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

fn numeric_value(node: &TreeNode, column: ColumnId) -> u64 {
    match column {
        ColumnId::FileSize => node
            .asset_fields()
            .and_then(|fields| fields.file_size)
            .unwrap_or(0),
        ColumnId::AssetCount => node
            .folder_fields()
            .map(|fields| fields.asset_count)
            .unwrap_or(0),
        _ => 0,
    }
}

fn date_value(node: &TreeNode, column: ColumnId) -> i64 {
    let fields = node.asset_fields();
    let stamp = match column {
        ColumnId::CreatedAt => fields.and_then(|fields| fields.created_at),
        ColumnId::ModifiedAt => fields.and_then(|fields| fields.modified_at),
        _ => None,
    };
    stamp.map_or(i64::MIN, time::OffsetDateTime::unix_timestamp)
}

/// Human-readable cell text for one column of one node.
pub fn display_cell(node: &TreeNode, column: ColumnId) -> String {
    match column {
        ColumnId::Title => node.title.clone(),
        ColumnId::MigrationStatus => node
            .asset_fields()
            .and_then(|fields| fields.status_label.clone())
            .unwrap_or_default(),
        ColumnId::AssignedUser => match &node.kind {
            NodeKind::Folder(fields) => fields.assigned_user_label.clone(),
            NodeKind::Asset(fields) => fields.assigned_user_label.clone(),
        }
        .unwrap_or_default(),
        ColumnId::FileType => node
            .asset_fields()
            .and_then(|fields| fields.file_type.clone())
            .unwrap_or_default(),
        ColumnId::FileSize => node
            .asset_fields()
            .and_then(|fields| fields.file_size)
            .map(format_size)
            .unwrap_or_default(),
        ColumnId::CreatedAt | ColumnId::ModifiedAt => {
            let fields = node.asset_fields();
            let stamp = match column {
                ColumnId::CreatedAt => fields.and_then(|fields| fields.created_at),
                _ => fields.and_then(|fields| fields.modified_at),
            };
            stamp
                .and_then(|ts| ts.format(format_description!("[year]-[month]-[day]")).ok())
                .unwrap_or_default()
        }
        ColumnId::Collections => node
            .asset_fields()
            .map(|fields| fields.collection_labels.join(", "))
            .unwrap_or_default(),
        ColumnId::Duplicate => match node.asset_fields().and_then(|fields| fields.duplicate) {
            Some(true) => "yes".to_string(),
            Some(false) => "no".to_string(),
            None => String::new(),
        },
        ColumnId::Linked => match node.asset_fields().and_then(|fields| fields.linked) {
            Some(true) => "linked".to_string(),
            Some(false) => "unlinked".to_string(),
            None => String::new(),
        },
        ColumnId::Notes => match &node.kind {
            NodeKind::Folder(fields) => fields.notes.clone(),
            NodeKind::Asset(fields) => fields.notes.clone(),
        }
        .unwrap_or_default(),
        ColumnId::AssetCount => node
            .folder_fields()
            .map(|fields| fields.asset_count.to_string())
            .unwrap_or_default(),
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
