//! Inline edit support: which cells take a dropdown, and what it offers.

use crate::vocab::Vocabularies;
use stacks_protocol::ColumnId;
use stacks_protocol::VocabEntry;
use stacks_protocol::VocabKind;

/// Dropdown entry representing "no assignment" for the user column. The
/// empty value maps to a `null` on the wire.
pub const UNASSIGNED_LABEL: &str = "(unassigned)";

/// Whether a column is inline-editable for the given node kind. Only
/// select-like and boolean-like columns get the dropdown editor.
pub fn is_editable(column: ColumnId, is_folder: bool) -> bool {
    if is_folder {
        matches!(column, ColumnId::AssignedUser)
    } else {
        matches!(
            column,
            ColumnId::MigrationStatus | ColumnId::AssignedUser | ColumnId::Duplicate | ColumnId::Linked
        )
    }
}

/// Options the dropdown offers for a column: the matching vocabulary, or the
/// literal true/false pair for boolean-like columns.
pub fn options_for(column: ColumnId, vocabs: &Vocabularies) -> Vec<VocabEntry> {
    match column {
        ColumnId::MigrationStatus => vocabs.entries(VocabKind::MigrationStatus).to_vec(),
        ColumnId::AssignedUser => {
            let mut options = vec![VocabEntry {
                value: String::new(),
                label: UNASSIGNED_LABEL.to_string(),
            }];
            options.extend(vocabs.entries(VocabKind::User).iter().cloned());
            options
        }
        column if column.is_boolean() => vec![
            VocabEntry {
                value: "true".to_string(),
                label: "true".to_string(),
            },
            VocabEntry {
                value: "false".to_string(),
                label: "false".to_string(),
            },
        ],
        _ => Vec::new(),
    }
}

/// Resolve the display label for a committed choice.
pub fn label_for_choice(
    column: ColumnId,
    vocabs: &Vocabularies,
    value: Option<&str>,
) -> Option<String> {
    let value = value?;
    match column {
        ColumnId::MigrationStatus => vocabs
            .label_for(VocabKind::MigrationStatus, value)
            .map(str::to_string),
        ColumnId::AssignedUser => vocabs.label_for(VocabKind::User, value).map(str::to_string),
        _ => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vocabs() -> Vocabularies {
        Vocabularies::for_tests(
            vec![VocabEntry {
                value: "3".into(),
                label: "Migrated".into(),
            }],
            vec![VocabEntry {
                value: "u7".into(),
                label: "D. Archivist".into(),
            }],
        )
    }

    #[test]
    fn boolean_columns_offer_literal_pair() {
        let options = options_for(ColumnId::Duplicate, &vocabs());
        let values: Vec<&str> = options.iter().map(|entry| entry.value.as_str()).collect();
        assert_eq!(values, vec!["true", "false"]);
    }

    #[test]
    fn user_options_lead_with_unassigned() {
        let options = options_for(ColumnId::AssignedUser, &vocabs());
        assert_eq!(options[0].value, "");
        assert_eq!(options[0].label, UNASSIGNED_LABEL);
        assert_eq!(options[1].value, "u7");
    }

    #[test]
    fn labels_resolve_through_vocabulary() {
        let label = label_for_choice(ColumnId::MigrationStatus, &vocabs(), Some("3"));
        assert_eq!(label.as_deref(), Some("Migrated"));
        let label = label_for_choice(ColumnId::Duplicate, &vocabs(), Some("true"));
        assert_eq!(label.as_deref(), Some("true"));
    }

    #[test]
    fn folders_only_edit_assignment() {
        assert!(is_editable(ColumnId::AssignedUser, true));
        assert!(!is_editable(ColumnId::MigrationStatus, true));
        assert!(is_editable(ColumnId::MigrationStatus, false));
        assert!(!is_editable(ColumnId::FileSize, false));
    }
}
