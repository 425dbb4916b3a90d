//! Fetch coordinator: the single gateway between the engines and the
//! hierarchy service. De-duplicates against the cache, runs every transport
//! call under the active generation's cancellation token, and converts
//! failures into empty results so the UI never sees an exception.

use crate::cache::HierarchyCache;
use crate::cache::LoadSlot;
use crate::generation::Generation;
use crate::node::NodeKey;
use crate::node::ParentKey;
use crate::node::TreeNode;
use crate::service::HierarchyService;
use stacks_protocol::AssetHit;
use stacks_protocol::ColumnFilters;
use stacks_protocol::FolderHit;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

#[derive(Clone, Debug, Default)]
pub struct SearchOutcome {
    pub folders: Vec<FolderHit>,
    pub assets: Vec<AssetHit>,
}

pub struct FetchCoordinator {
    service: Arc<dyn HierarchyService>,
    cache: Mutex<HierarchyCache>,
    generation: Generation,
}

impl FetchCoordinator {
    pub fn new(service: Arc<dyn HierarchyService>, generation: Generation) -> Self {
        Self {
            service,
            cache: Mutex::new(HierarchyCache::new()),
            generation,
        }
    }

    pub fn service(&self) -> &Arc<dyn HierarchyService> {
        &self.service
    }

    pub fn is_loaded(&self, parent: &ParentKey, slot: LoadSlot) -> bool {
        self.lock_cache().is_loaded(parent, slot)
    }

    /// Cancel every in-flight fetch. Superseding the generation both aborts
    /// the transport calls and invalidates any continuation that captured the
    /// old epoch.
    pub fn cancel_all(&self) {
        self.generation.supersede();
    }

    /// Drop all cached pages and loaded marks ("clear filters").
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Immediate child folders of `parent`, cache-first. Transport failures
    /// and aborts yield an empty list and leave the key unmarked so a later
    /// call retries.
    pub async fn child_folders(&self, parent: &ParentKey) -> Vec<TreeNode> {
        if self.lock_cache().is_loaded(parent, LoadSlot::Folders) {
            return self
                .lock_cache()
                .children(parent)
                .map(<[TreeNode]>::to_vec)
                .unwrap_or_default();
        }
        let token = self.generation.token();
        let fetched = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(parent = parent_label(parent), "child folder fetch aborted");
                return Vec::new();
            }
            result = self.service.child_folders(parent.as_ref()) => result,
        };
        match fetched {
            Ok(summaries) => {
                let nodes: Vec<TreeNode> = summaries
                    .into_iter()
                    .map(|summary| TreeNode::from_folder(parent.clone(), summary))
                    .collect();
                self.lock_cache().set_children(parent.clone(), nodes.clone());
                nodes
            }
            Err(error) => {
                tracing::warn!(
                    parent = parent_label(parent),
                    %error,
                    "child folder fetch failed; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// The asset page for a folder, same contract as [`Self::child_folders`].
    pub async fn child_assets(&self, parent: &NodeKey) -> Vec<TreeNode> {
        let slot_key = Some(parent.clone());
        if self.lock_cache().is_loaded(&slot_key, LoadSlot::Assets) {
            return self
                .lock_cache()
                .assets(parent)
                .map(<[TreeNode]>::to_vec)
                .unwrap_or_default();
        }
        let token = self.generation.token();
        let fetched = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(parent = parent.as_str(), "asset fetch aborted");
                return Vec::new();
            }
            result = self.service.child_assets(parent) => result,
        };
        match fetched {
            Ok(summaries) => {
                let nodes: Vec<TreeNode> = summaries
                    .into_iter()
                    .map(|summary| TreeNode::from_asset(slot_key.clone(), summary))
                    .collect();
                self.lock_cache().set_assets(parent.clone(), nodes.clone());
                nodes
            }
            Err(error) => {
                tracing::warn!(
                    parent = parent.as_str(),
                    %error,
                    "asset fetch failed; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Folder and asset search issued concurrently. Results are never
    /// cached: hits flow into the tree through path materialization.
    pub async fn search(&self, query: &str, filters: &ColumnFilters) -> SearchOutcome {
        let token = self.generation.token();
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(query, "search aborted");
                SearchOutcome::default()
            }
            (folders, assets) = async {
                tokio::join!(
                    self.service.search_folders(query, filters),
                    self.service.search_assets(query, filters),
                )
            } => SearchOutcome {
                folders: ok_or_empty(folders, "folder search"),
                assets: ok_or_empty(assets, "asset search"),
            },
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, HierarchyCache> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn ok_or_empty<T>(result: anyhow::Result<Vec<T>>, what: &str) -> Vec<T> {
    match result {
        Ok(values) => values,
        Err(error) => {
            tracing::warn!(%error, "{what} failed; treating as no matches");
            Vec::new()
        }
    }
}

fn parent_label(parent: &ParentKey) -> &str {
    parent.as_ref().map_or("<roots>", NodeKey::as_str)
}
