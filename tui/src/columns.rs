//! Column layout for the tree table.

use stacks_protocol::ColumnId;

#[derive(Clone, Copy, Debug)]
pub struct ColumnSpec {
    pub id: ColumnId,
    pub title: &'static str,
    /// Fixed width in cells; 0 means "take the remaining space" (title).
    pub width: u16,
}

pub const COLUMNS: [ColumnSpec; 9] = [
    ColumnSpec {
        id: ColumnId::Title,
        title: "Title",
        width: 0,
    },
    ColumnSpec {
        id: ColumnId::MigrationStatus,
        title: "Status",
        width: 14,
    },
    ColumnSpec {
        id: ColumnId::AssignedUser,
        title: "Assigned",
        width: 16,
    },
    ColumnSpec {
        id: ColumnId::FileType,
        title: "Type",
        width: 8,
    },
    ColumnSpec {
        id: ColumnId::FileSize,
        title: "Size",
        width: 10,
    },
    ColumnSpec {
        id: ColumnId::AssetCount,
        title: "Assets",
        width: 7,
    },
    ColumnSpec {
        id: ColumnId::Duplicate,
        title: "Dup",
        width: 5,
    },
    ColumnSpec {
        id: ColumnId::Linked,
        title: "Linked",
        width: 9,
    },
    ColumnSpec {
        id: ColumnId::Notes,
        title: "Notes",
        width: 18,
    },
];

pub fn column_ids() -> Vec<ColumnId> {
    COLUMNS.iter().map(|spec| spec.id).collect()
}

/// Columns offering a value dropdown in the column-filter picker.
pub const FILTERABLE: [ColumnId; 4] = [
    ColumnId::MigrationStatus,
    ColumnId::AssignedUser,
    ColumnId::Duplicate,
    ColumnId::Linked,
];

pub fn title_of(column: ColumnId) -> &'static str {
    COLUMNS
        .iter()
        .find(|spec| spec.id == column)
        .map_or("?", |spec| spec.title)
}
