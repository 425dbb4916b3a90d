//! Seam to the remote hierarchy service. The browser core only ever talks to
//! this trait; the HTTP implementation lives in `stacks-client`, and tests
//! substitute an in-memory double.

use crate::node::NodeKey;
use anyhow::Result;
use async_trait::async_trait;
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

#[async_trait]
pub trait HierarchyService: Send + Sync {
    /// Immediate child folders of `parent`, or the volume roots when absent.
    async fn child_folders(&self, parent: Option<&NodeKey>) -> Result<Vec<FolderSummary>>;

    /// Immediate child assets of a folder.
    async fn child_assets(&self, parent: &NodeKey) -> Result<Vec<AssetSummary>>;

    async fn search_folders(&self, query: &str, filters: &ColumnFilters)
    -> Result<Vec<FolderHit>>;

    async fn search_assets(&self, query: &str, filters: &ColumnFilters) -> Result<Vec<AssetHit>>;

    async fn vocabulary(&self, kind: VocabKind) -> Result<VocabMap>;

    async fn update_cell(&self, request: CellUpdateRequest) -> Result<CellUpdateResponse>;

    async fn bulk_update(&self, request: BulkUpdateRequest) -> Result<BulkUpdateResponse>;
}
