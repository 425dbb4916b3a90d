//! Background task owning the [`Browser`]. The UI thread stays responsive:
//! it enqueues commands here and, for filter-affecting actions, supersedes
//! the shared generation first so in-flight work aborts without waiting for
//! the queue to drain.

use crate::app_event::AppEvent;
use crate::columns;
use stacks_browser::Browser;
use stacks_browser::FilterMode;
use stacks_browser::Generation;
use stacks_browser::HierarchyService;
use stacks_browser::NodeKey;
use stacks_browser::Vocabularies;
use stacks_protocol::ColumnId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug)]
pub enum BrowserCommand {
    LoadRoots,
    Expand(NodeKey),
    Collapse(NodeKey),
    RunQuery(String),
    SetColumnFilter(ColumnId, Option<String>),
    SetFilterMode(FilterMode),
    ClearFilters,
    ToggleSelected(NodeKey),
    SelectDescendants { key: NodeKey, select: bool },
    SelectAllFiltered { select: bool },
    ToggleSort(ColumnId),
    CommitEdit {
        key: NodeKey,
        column: ColumnId,
        value: Option<String>,
    },
    BulkUpdate(BTreeMap<ColumnId, String>),
}

pub struct WorkerHandle {
    pub commands: UnboundedSender<BrowserCommand>,
    /// Shared epoch; the UI supersedes it synchronously before enqueueing a
    /// filter-affecting command.
    pub generation: Generation,
    /// Startup copy of the option vocabularies for popup population.
    pub vocabularies: Vocabularies,
}

pub async fn spawn_worker(
    service: Arc<dyn HierarchyService>,
    app_tx: UnboundedSender<AppEvent>,
) -> WorkerHandle {
    let (browser_tx, mut browser_rx) = mpsc::unbounded_channel();
    let mut browser = Browser::new(service, browser_tx).await;
    let generation = browser.generation();
    let vocabularies = browser.vocabularies().clone();

    // Forward observer notifications into the app event stream.
    let notice_tx = app_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = browser_rx.recv().await {
            if notice_tx.send(AppEvent::Browser(event)).is_err() {
                break;
            }
        }
    });

    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let display = columns::column_ids();
        while let Some(command) = command_rx.recv().await {
            match command {
                BrowserCommand::LoadRoots => browser.load_roots().await,
                BrowserCommand::Expand(key) => browser.expand(&key).await,
                BrowserCommand::Collapse(key) => browser.collapse(&key),
                BrowserCommand::RunQuery(query) => browser.set_query(&query).await,
                BrowserCommand::SetColumnFilter(column, value) => {
                    browser.set_column_filter(column, value).await;
                }
                BrowserCommand::SetFilterMode(mode) => browser.set_filter_mode(mode),
                BrowserCommand::ClearFilters => browser.clear_filters(),
                BrowserCommand::ToggleSelected(key) => {
                    browser.toggle_selected(&key);
                }
                BrowserCommand::SelectDescendants { key, select } => {
                    browser.select_descendants(&key, select).await;
                }
                BrowserCommand::SelectAllFiltered { select } => {
                    browser.select_all_filtered(select).await;
                }
                BrowserCommand::ToggleSort(column) => {
                    browser.toggle_sort(column);
                }
                BrowserCommand::CommitEdit { key, column, value } => {
                    browser.commit_edit(&key, column, value).await;
                }
                BrowserCommand::BulkUpdate(changes) => browser.bulk_update(changes).await,
            }
            let snapshot = browser.snapshot(&display);
            if app_tx.send(AppEvent::Snapshot(snapshot)).is_err() {
                break;
            }
            if app_tx.send(AppEvent::WorkerDone).is_err() {
                break;
            }
        }
    });

    WorkerHandle {
        commands: command_tx,
        generation,
        vocabularies,
    }
}
