use stacks_browser::BrowserEvent;
use stacks_browser::TreeSnapshot;

#[derive(Debug)]
pub enum AppEvent {
    /// Fresh render state from the browser worker after a command settled.
    Snapshot(TreeSnapshot),

    /// One worker command finished (success, failure, or abort); pairs with
    /// the busy counter incremented at dispatch so the spinner can never
    /// hang.
    WorkerDone,

    /// Notification forwarded from the browser's observer channel.
    Browser(BrowserEvent),

    /// The free-text debounce window closed on this query.
    DebouncedQuery(String),
}
