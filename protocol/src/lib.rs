//! Wire types for the hierarchy service consumed by the stacks browser.
//!
//! Everything here mirrors the JSON the service emits. Decoding is tolerant:
//! summaries use `#[serde(default)]` so older service builds that omit a
//! field still parse.

use serde::Deserialize;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Asset keys are namespaced away from folder keys with this prefix.
pub const ASSET_KEY_PREFIX: &str = "a-";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Folder,
    Asset,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Folder => write!(f, "folder"),
            NodeType::Asset => write!(f, "asset"),
        }
    }
}

/// Columns the browser renders and filters on. The wire name doubles as the
/// query-parameter key for column filters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ColumnId {
    Title,
    MigrationStatus,
    AssignedUser,
    FileType,
    FileSize,
    CreatedAt,
    ModifiedAt,
    Collections,
    Duplicate,
    Linked,
    Notes,
    AssetCount,
}

impl ColumnId {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnId::Title => "title",
            ColumnId::MigrationStatus => "migration_status",
            ColumnId::AssignedUser => "assigned_user",
            ColumnId::FileType => "file_type",
            ColumnId::FileSize => "file_size",
            ColumnId::CreatedAt => "created_at",
            ColumnId::ModifiedAt => "modified_at",
            ColumnId::Collections => "collections",
            ColumnId::Duplicate => "duplicate",
            ColumnId::Linked => "linked",
            ColumnId::Notes => "notes",
            ColumnId::AssetCount => "asset_count",
        }
    }

    /// Columns whose values are plain true/false rather than vocabulary ids.
    pub fn is_boolean(self) -> bool {
        matches!(self, ColumnId::Duplicate | ColumnId::Linked)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Active column filters, keyed by column. Ordered so serialized requests are
/// deterministic.
pub type ColumnFilters = BTreeMap<ColumnId, String>;

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FolderSummary {
    pub id: String,
    pub title: String,
    pub assigned_user_id: Option<String>,
    pub assigned_user_label: Option<String>,
    pub asset_count: u64,
    pub notes: Option<String>,
    pub lazy: bool,
    pub folder: bool,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetSummary {
    /// Prefixed key (`a-<id>`), already namespaced by the service.
    pub id: String,
    pub title: String,
    pub status_id: Option<String>,
    pub status_label: Option<String>,
    pub assigned_user_id: Option<String>,
    pub assigned_user_label: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub modified_at: Option<OffsetDateTime>,
    pub collection_ids: Vec<String>,
    pub collection_labels: Vec<String>,
    pub duplicate: Option<bool>,
    pub linked: Option<bool>,
    pub notes: Option<String>,
    pub detail_url: Option<String>,
    pub lazy: bool,
    pub folder: bool,
}

impl Default for AssetSummary {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            status_id: None,
            status_label: None,
            assigned_user_id: None,
            assigned_user_label: None,
            file_type: None,
            file_size: None,
            created_at: None,
            modified_at: None,
            collection_ids: Vec::new(),
            collection_labels: Vec::new(),
            duplicate: None,
            linked: None,
            notes: None,
            detail_url: None,
            lazy: false,
            folder: false,
        }
    }
}

/// A search hit with the ancestor chain needed to materialize it in a lazy
/// tree: folder ids ordered root to immediate parent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FolderHit {
    #[serde(flatten)]
    pub folder: FolderSummary,
    #[serde(default)]
    pub ancestor_path: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AssetHit {
    #[serde(flatten)]
    pub asset: AssetSummary,
    #[serde(default)]
    pub ancestor_path: Vec<String>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VocabKind {
    MigrationStatus,
    User,
    Collection,
    CollectionGroup,
}

impl VocabKind {
    pub const ALL: [VocabKind; 4] = [
        VocabKind::MigrationStatus,
        VocabKind::User,
        VocabKind::Collection,
        VocabKind::CollectionGroup,
    ];

    /// Path segment used by the vocabulary endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            VocabKind::MigrationStatus => "statuses",
            VocabKind::User => "users",
            VocabKind::Collection => "collections",
            VocabKind::CollectionGroup => "collection_groups",
        }
    }
}

impl fmt::Display for VocabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The vocabulary endpoint returns a flat id-to-label map.
pub type VocabMap = BTreeMap<String, String>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabEntry {
    pub value: String,
    pub label: String,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CellUpdateRequest {
    pub key: String,
    pub kind: NodeType,
    pub field: ColumnId,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CellUpdateResponse {
    pub ok: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BulkUpdateRequest {
    pub asset_ids: Vec<String>,
    pub folder_ids: Vec<String>,
    pub changes: BTreeMap<ColumnId, String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BulkUpdateResponse {
    pub updated_count: u64,
    pub applied_messages: Vec<String>,
}
