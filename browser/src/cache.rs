//! In-memory hierarchy cache: child-folder and asset pages keyed by parent.
//!
//! Pure data, no I/O. The fetch coordinator is the only writer; a page is
//! populated at most once per key until `clear()` wipes everything.

use crate::node::NodeKey;
use crate::node::ParentKey;
use crate::node::TreeNode;
use std::collections::HashMap;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSlot {
    Folders,
    Assets,
}

#[derive(Debug, Default)]
pub struct HierarchyCache {
    children: HashMap<ParentKey, Vec<TreeNode>>,
    assets: HashMap<NodeKey, Vec<TreeNode>>,
    children_loaded: HashSet<ParentKey>,
    assets_loaded: HashSet<NodeKey>,
}

impl HierarchyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self, parent: &ParentKey) -> Option<&[TreeNode]> {
        self.children.get(parent).map(Vec::as_slice)
    }

    pub fn set_children(&mut self, parent: ParentKey, nodes: Vec<TreeNode>) {
        self.children.insert(parent.clone(), nodes);
        self.children_loaded.insert(parent);
    }

    pub fn assets(&self, parent: &NodeKey) -> Option<&[TreeNode]> {
        self.assets.get(parent).map(Vec::as_slice)
    }

    pub fn set_assets(&mut self, parent: NodeKey, nodes: Vec<TreeNode>) {
        self.assets.insert(parent.clone(), nodes);
        self.assets_loaded.insert(parent);
    }

    pub fn is_loaded(&self, parent: &ParentKey, slot: LoadSlot) -> bool {
        match slot {
            LoadSlot::Folders => self.children_loaded.contains(parent),
            LoadSlot::Assets => match parent {
                Some(key) => self.assets_loaded.contains(key),
                None => false,
            },
        }
    }

    /// Full reset; the next fetch for any key goes back to the service.
    pub fn clear(&mut self) {
        self.children.clear();
        self.assets.clear();
        self.children_loaded.clear();
        self.assets_loaded.clear();
    }
}
