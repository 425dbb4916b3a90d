//! Tree node model: folders and assets keyed into one namespace.

use stacks_protocol::ASSET_KEY_PREFIX;
use stacks_protocol::AssetSummary;
use stacks_protocol::ColumnId;
use stacks_protocol::FolderSummary;
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Stable node identifier. Folder keys are the bare server ids; asset keys
/// carry the `a-` prefix so the two namespaces never collide. A key never
/// changes after the node is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn folder(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Accepts both pre-prefixed wire ids and bare asset ids.
    pub fn asset(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.starts_with(ASSET_KEY_PREFIX) {
            Self(id)
        } else {
            Self(format!("{ASSET_KEY_PREFIX}{id}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_asset(&self) -> bool {
        self.0.starts_with(ASSET_KEY_PREFIX)
    }

    /// The bare server id: strips the asset prefix when present.
    pub fn server_id(&self) -> &str {
        self.0.strip_prefix(ASSET_KEY_PREFIX).unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parent slot for a node; `None` means the node sits at a volume root.
pub type ParentKey = Option<NodeKey>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FolderFields {
    pub assigned_user_id: Option<String>,
    pub assigned_user_label: Option<String>,
    pub asset_count: u64,
    pub notes: Option<String>,
    /// False until the immediate child folders have been fetched once.
    /// Reset only by an explicit cache clear.
    pub children_loaded: bool,
    /// Same contract for the folder's asset page.
    pub assets_loaded: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetFields {
    pub status_id: Option<String>,
    pub status_label: Option<String>,
    pub assigned_user_id: Option<String>,
    pub assigned_user_label: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub created_at: Option<OffsetDateTime>,
    pub modified_at: Option<OffsetDateTime>,
    pub collection_ids: Vec<String>,
    pub collection_labels: Vec<String>,
    pub duplicate: Option<bool>,
    pub linked: Option<bool>,
    pub notes: Option<String>,
    pub detail_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Folder(FolderFields),
    Asset(AssetFields),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub key: NodeKey,
    pub parent: ParentKey,
    pub title: String,
    pub kind: NodeKind,
}

impl TreeNode {
    pub fn from_folder(parent: ParentKey, summary: FolderSummary) -> Self {
        Self {
            key: NodeKey::folder(summary.id),
            parent,
            title: summary.title,
            kind: NodeKind::Folder(FolderFields {
                assigned_user_id: summary.assigned_user_id,
                assigned_user_label: summary.assigned_user_label,
                asset_count: summary.asset_count,
                notes: summary.notes,
                children_loaded: false,
                assets_loaded: false,
            }),
        }
    }

    pub fn from_asset(parent: ParentKey, summary: AssetSummary) -> Self {
        Self {
            key: NodeKey::asset(summary.id),
            parent,
            title: summary.title,
            kind: NodeKind::Asset(AssetFields {
                status_id: summary.status_id,
                status_label: summary.status_label,
                assigned_user_id: summary.assigned_user_id,
                assigned_user_label: summary.assigned_user_label,
                file_type: summary.file_type,
                file_size: summary.file_size,
                created_at: summary.created_at,
                modified_at: summary.modified_at,
                collection_ids: summary.collection_ids,
                collection_labels: summary.collection_labels,
                duplicate: summary.duplicate,
                linked: summary.linked,
                notes: summary.notes,
                detail_url: summary.detail_url,
            }),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder(_))
    }

    pub fn folder_fields(&self) -> Option<&FolderFields> {
        match &self.kind {
            NodeKind::Folder(fields) => Some(fields),
            NodeKind::Asset(_) => None,
        }
    }

    pub fn folder_fields_mut(&mut self) -> Option<&mut FolderFields> {
        match &mut self.kind {
            NodeKind::Folder(fields) => Some(fields),
            NodeKind::Asset(_) => None,
        }
    }

    pub fn asset_fields(&self) -> Option<&AssetFields> {
        match &self.kind {
            NodeKind::Asset(fields) => Some(fields),
            NodeKind::Folder(_) => None,
        }
    }

    /// Text the free-text filter matches against, path excluded: title plus
    /// the human-readable labels of the node's fields.
    pub fn display_text(&self) -> String {
        let mut parts = vec![self.title.clone()];
        match &self.kind {
            NodeKind::Folder(fields) => {
                if let Some(label) = &fields.assigned_user_label {
                    parts.push(label.clone());
                }
                if let Some(notes) = &fields.notes {
                    parts.push(notes.clone());
                }
            }
            NodeKind::Asset(fields) => {
                for label in [
                    &fields.status_label,
                    &fields.assigned_user_label,
                    &fields.file_type,
                    &fields.notes,
                ]
                .into_iter()
                .flatten()
                {
                    parts.push(label.clone());
                }
                parts.extend(fields.collection_labels.iter().cloned());
            }
        }
        parts.join(" ")
    }

    /// Normalized column value used for column-filter equality checks.
    ///
    /// The rules must line up with what the search endpoints index:
    /// unassigned users become the literal `unassigned`, vocabulary columns
    /// compare by id, boolean columns by `true`/`false`, everything else by
    /// raw value with absent values as the empty string.
    pub fn normalized_value(&self, column: ColumnId) -> String {
        match column {
            ColumnId::Title => self.title.clone(),
            ColumnId::AssignedUser => {
                let id = match &self.kind {
                    NodeKind::Folder(fields) => fields.assigned_user_id.as_deref(),
                    NodeKind::Asset(fields) => fields.assigned_user_id.as_deref(),
                };
                match id {
                    Some(id) if !id.is_empty() => id.to_string(),
                    _ => "unassigned".to_string(),
                }
            }
            ColumnId::MigrationStatus => match self.asset_fields() {
                Some(fields) => fields
                    .status_id
                    .clone()
                    .or_else(|| fields.status_label.clone())
                    .unwrap_or_default(),
                None => String::new(),
            },
            ColumnId::Duplicate => match self.asset_fields().and_then(|fields| fields.duplicate) {
                Some(value) => value.to_string(),
                None => String::new(),
            },
            ColumnId::Linked => match self.asset_fields().and_then(|fields| fields.linked) {
                Some(value) => value.to_string(),
                None => String::new(),
            },
            ColumnId::FileType => self
                .asset_fields()
                .and_then(|fields| fields.file_type.clone())
                .unwrap_or_default(),
            ColumnId::FileSize => self
                .asset_fields()
                .and_then(|fields| fields.file_size)
                .map(|size| size.to_string())
                .unwrap_or_default(),
            ColumnId::CreatedAt => format_date(
                self.asset_fields().and_then(|fields| fields.created_at),
            ),
            ColumnId::ModifiedAt => format_date(
                self.asset_fields().and_then(|fields| fields.modified_at),
            ),
            ColumnId::Collections => self
                .asset_fields()
                .map(|fields| fields.collection_ids.join(","))
                .unwrap_or_default(),
            ColumnId::Notes => match &self.kind {
                NodeKind::Folder(fields) => fields.notes.clone().unwrap_or_default(),
                NodeKind::Asset(fields) => fields.notes.clone().unwrap_or_default(),
            },
            ColumnId::AssetCount => self
                .folder_fields()
                .map(|fields| fields.asset_count.to_string())
                .unwrap_or_default(),
        }
    }
}

fn format_date(value: Option<OffsetDateTime>) -> String {
    value
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn asset_node() -> TreeNode {
        TreeNode::from_asset(
            Some(NodeKey::folder("f1")),
            AssetSummary {
                id: "a-9".into(),
                title: "scan_001.tif".into(),
                status_id: Some("3".into()),
                status_label: Some("Migrated".into()),
                duplicate: Some(false),
                ..AssetSummary::default()
            },
        )
    }

    #[test]
    fn asset_keys_are_prefixed_once() {
        assert_eq!(NodeKey::asset("9").as_str(), "a-9");
        assert_eq!(NodeKey::asset("a-9").as_str(), "a-9");
        assert_eq!(NodeKey::asset("a-9").server_id(), "9");
        assert!(!NodeKey::folder("9").is_asset());
    }

    #[test]
    fn unassigned_user_normalizes_to_literal() {
        let node = asset_node();
        assert_eq!(node.normalized_value(ColumnId::AssignedUser), "unassigned");
        assert_eq!(node.normalized_value(ColumnId::MigrationStatus), "3");
        assert_eq!(node.normalized_value(ColumnId::Duplicate), "false");
        assert_eq!(node.normalized_value(ColumnId::Linked), "");
    }

    #[test]
    fn status_falls_back_to_raw_label_without_id() {
        let mut node = asset_node();
        if let NodeKind::Asset(fields) = &mut node.kind {
            fields.status_id = None;
        }
        assert_eq!(node.normalized_value(ColumnId::MigrationStatus), "Migrated");
    }
}
