//! Notifications the browser emits to external collaborators (the bulk
//! toolbar, the status bar). Explicit channel registration instead of a
//! global event bus: whoever constructs the [`crate::Browser`] hands it the
//! sender and owns the receiving end.

use crate::node::NodeKey;
use stacks_protocol::ColumnId;
use std::collections::BTreeSet;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Clone, Debug, PartialEq)]
pub enum BrowserEvent {
    /// Authoritative selection set after an engine mutation settled.
    SelectionChanged { selected: BTreeSet<NodeKey> },

    /// Incremental progress while a large selection sweep is running.
    SelectionProgress { processed: usize },

    /// A filter pipeline finished and applied its predicate.
    FilterApplied { matches: usize, generation: u64 },

    /// The filter pipeline reset to idle (empty query, no column filters).
    FilterCleared,

    /// A remote single-cell commit failed; the optimistic local value is
    /// kept (see DESIGN.md).
    EditFailed {
        key: NodeKey,
        column: ColumnId,
        message: String,
    },

    /// Outcome of a bulk field update over the current selection.
    BulkApplied {
        updated: u64,
        messages: Vec<String>,
    },
}

pub type EventSender = UnboundedSender<BrowserEvent>;
