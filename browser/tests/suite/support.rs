//! Scripted in-memory hierarchy service for driving the browser without a
//! network. Records every call so tests can assert fetch de-duplication, and
//! can bump the filter generation mid-search to simulate a user action
//! racing an in-flight request.

use anyhow::Result;
use anyhow::anyhow;
use async_trait::async_trait;
use stacks_browser::Browser;
use stacks_browser::BrowserEvent;
use stacks_browser::Generation;
use stacks_browser::HierarchyService;
use stacks_browser::NodeKey;
use stacks_protocol::AssetHit;
use stacks_protocol::AssetSummary;
use stacks_protocol::BulkUpdateRequest;
use stacks_protocol::BulkUpdateResponse;
use stacks_protocol::CellUpdateRequest;
use stacks_protocol::CellUpdateResponse;
use stacks_protocol::ColumnFilters;
use stacks_protocol::FolderHit;
use stacks_protocol::FolderSummary;
use stacks_protocol::VocabKind;
use stacks_protocol::VocabMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn folder(id: &str, title: &str) -> FolderSummary {
    FolderSummary {
        id: id.to_string(),
        title: title.to_string(),
        lazy: true,
        folder: true,
        ..FolderSummary::default()
    }
}

pub fn asset(id: &str, title: &str) -> AssetSummary {
    AssetSummary {
        id: format!("a-{id}"),
        title: title.to_string(),
        ..AssetSummary::default()
    }
}

#[derive(Default)]
pub struct ScriptedService {
    roots: Vec<FolderSummary>,
    children: HashMap<String, Vec<FolderSummary>>,
    assets: HashMap<String, Vec<AssetSummary>>,
    folder_hits: Vec<FolderHit>,
    asset_hits: Vec<AssetHit>,
    vocab: HashMap<VocabKind, VocabMap>,

    pub child_folder_calls: Mutex<Vec<Option<String>>>,
    pub child_asset_calls: Mutex<Vec<String>>,
    pub cell_updates: Mutex<Vec<CellUpdateRequest>>,
    pub bulk_updates: Mutex<Vec<BulkUpdateRequest>>,
    pub fail_cell_update: AtomicBool,
    bump_on_search: Mutex<Option<Generation>>,
    bump_on_children_of: Mutex<Option<(String, Generation)>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roots(mut self, roots: Vec<FolderSummary>) -> Self {
        self.roots = roots;
        self
    }

    pub fn with_children(mut self, parent: &str, children: Vec<FolderSummary>) -> Self {
        self.children.insert(parent.to_string(), children);
        self
    }

    pub fn with_assets(mut self, parent: &str, assets: Vec<AssetSummary>) -> Self {
        self.assets.insert(parent.to_string(), assets);
        self
    }

    pub fn with_asset_hit(mut self, summary: AssetSummary, ancestor_path: Vec<&str>) -> Self {
        self.asset_hits.push(AssetHit {
            asset: summary,
            ancestor_path: ancestor_path.into_iter().map(str::to_string).collect(),
        });
        self
    }

    pub fn with_folder_hit(mut self, summary: FolderSummary, ancestor_path: Vec<&str>) -> Self {
        self.folder_hits.push(FolderHit {
            folder: summary,
            ancestor_path: ancestor_path.into_iter().map(str::to_string).collect(),
        });
        self
    }

    pub fn with_vocab(mut self, kind: VocabKind, entries: &[(&str, &str)]) -> Self {
        let map: VocabMap = entries
            .iter()
            .map(|(value, label)| (value.to_string(), label.to_string()))
            .collect();
        self.vocab.insert(kind, map);
        self
    }

    /// Supersede the generation while the next search is in flight,
    /// simulating a keystroke or Escape racing the response.
    pub fn bump_generation_on_search(&self, generation: Generation) {
        *lock(&self.bump_on_search) = Some(generation);
    }

    /// Same, but while fetching the children of a specific folder.
    pub fn bump_generation_on_children_of(&self, parent: &str, generation: Generation) {
        *lock(&self.bump_on_children_of) = Some((parent.to_string(), generation));
    }

    pub fn child_folder_fetches(&self, parent: Option<&str>) -> usize {
        lock(&self.child_folder_calls)
            .iter()
            .filter(|call| call.as_deref() == parent)
            .count()
    }
}

#[async_trait]
impl HierarchyService for ScriptedService {
    async fn child_folders(&self, parent: Option<&NodeKey>) -> Result<Vec<FolderSummary>> {
        let parent_id = parent.map(|key| key.as_str().to_string());
        lock(&self.child_folder_calls).push(parent_id.clone());
        if let Some(id) = &parent_id {
            let pending = lock(&self.bump_on_children_of)
                .take_if(|(target, _)| target.as_str() == id.as_str());
            if let Some((_, generation)) = pending {
                generation.supersede();
            }
            Ok(self.children.get(id).cloned().unwrap_or_default())
        } else {
            Ok(self.roots.clone())
        }
    }

    async fn child_assets(&self, parent: &NodeKey) -> Result<Vec<AssetSummary>> {
        lock(&self.child_asset_calls).push(parent.as_str().to_string());
        Ok(self.assets.get(parent.as_str()).cloned().unwrap_or_default())
    }

    async fn search_folders(
        &self,
        _query: &str,
        _filters: &ColumnFilters,
    ) -> Result<Vec<FolderHit>> {
        if let Some(generation) = lock(&self.bump_on_search).take() {
            generation.supersede();
        }
        Ok(self.folder_hits.clone())
    }

    async fn search_assets(&self, _query: &str, _filters: &ColumnFilters) -> Result<Vec<AssetHit>> {
        Ok(self.asset_hits.clone())
    }

    async fn vocabulary(&self, kind: VocabKind) -> Result<VocabMap> {
        Ok(self.vocab.get(&kind).cloned().unwrap_or_default())
    }

    async fn update_cell(&self, request: CellUpdateRequest) -> Result<CellUpdateResponse> {
        lock(&self.cell_updates).push(request);
        if self.fail_cell_update.load(Ordering::SeqCst) {
            return Err(anyhow!("service unavailable"));
        }
        Ok(CellUpdateResponse { ok: true })
    }

    async fn bulk_update(&self, request: BulkUpdateRequest) -> Result<BulkUpdateResponse> {
        let touched = (request.asset_ids.len() + request.folder_ids.len()) as u64;
        lock(&self.bulk_updates).push(request);
        Ok(BulkUpdateResponse {
            updated_count: touched,
            applied_messages: Vec::new(),
        })
    }
}

pub struct Harness {
    pub service: Arc<ScriptedService>,
    pub browser: Browser,
    pub events: UnboundedReceiver<BrowserEvent>,
}

impl Harness {
    pub async fn start(service: ScriptedService) -> Self {
        let service = Arc::new(service);
        let (tx, events) = mpsc::unbounded_channel();
        let browser = Browser::new(service.clone(), tx).await;
        Self {
            service,
            browser,
            events,
        }
    }

    pub fn drain_events(&mut self) -> Vec<BrowserEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
