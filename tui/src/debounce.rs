//! Free-text input debounce: only the last keystroke inside the window
//! triggers a search. Each keystroke restarts the timer by bumping the
//! sequence; a stale timer sees the newer sequence and drops its query.

use crate::app_event::AppEvent;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

pub struct QueryDebouncer {
    app_tx: UnboundedSender<AppEvent>,
    seq: Arc<AtomicU64>,
}

impl QueryDebouncer {
    pub fn new(app_tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            app_tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn on_input(&self, query: String) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let current = self.seq.clone();
        let app_tx = self.app_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_WINDOW).await;
            if current.load(Ordering::SeqCst) == seq {
                let _ = app_tx.send(AppEvent::DebouncedQuery(query));
            }
        });
    }

    /// Invalidate any pending timer (Escape, clear filters).
    pub fn cancel(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
    }
}
