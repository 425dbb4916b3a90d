//! Filter state and the combined predicate.
//!
//! The filter pipeline itself (search, materialize, apply) lives on
//! [`crate::Browser`]; this module owns the pieces it transitions between.

use crate::node::TreeNode;
use crate::tree::FilterMode;
use stacks_protocol::ColumnFilters;
use stacks_protocol::ColumnId;
use std::fmt;

/// Where the filter engine currently is. Purely observational: transitions
/// are driven by the pipeline, the phase exists for status display and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterPhase {
    #[default]
    Idle,
    Searching,
    Materializing,
    Applying,
}

impl fmt::Display for FilterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FilterPhase::Idle => "idle",
            FilterPhase::Searching => "searching",
            FilterPhase::Materializing => "materializing",
            FilterPhase::Applying => "applying",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, Default)]
pub struct FilterState {
    query: String,
    filters: ColumnFilters,
    mode: FilterMode,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower-cased, trimmed free-text query.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, raw: &str) {
        self.query = raw.trim().to_lowercase();
    }

    pub fn column_filters(&self) -> &ColumnFilters {
        &self.filters
    }

    /// `None` removes the column's filter.
    pub fn set_column_filter(&mut self, column: ColumnId, value: Option<String>) {
        match value {
            Some(value) => {
                self.filters.insert(column, value);
            }
            None => {
                self.filters.remove(&column);
            }
        }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.filters.is_empty()
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.filters.clear();
    }

    pub fn predicate(&self) -> FilterPredicate {
        FilterPredicate::new(&self.query, &self.filters)
    }
}

/// The combined match rule: a node matches iff the free-text query (when
/// non-empty) occurs case-insensitively in its display text or path, AND its
/// normalized value equals every active column filter, case-insensitively.
#[derive(Clone, Debug)]
pub struct FilterPredicate {
    query: String,
    filters: Vec<(ColumnId, String)>,
}

impl FilterPredicate {
    pub fn new(query: &str, filters: &ColumnFilters) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            filters: filters
                .iter()
                .map(|(column, value)| (*column, value.to_lowercase()))
                .collect(),
        }
    }

    /// Matches everything.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.filters.is_empty()
    }

    pub fn matches(&self, node: &TreeNode, path_text: &str) -> bool {
        if !self.query.is_empty() {
            let mut haystack = node.display_text();
            haystack.push(' ');
            haystack.push_str(path_text);
            if !haystack.to_lowercase().contains(&self.query) {
                return false;
            }
        }
        self.filters
            .iter()
            .all(|(column, value)| node.normalized_value(*column).to_lowercase() == *value)
    }
}
