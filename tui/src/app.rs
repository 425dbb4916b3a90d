//! Event loop and key handling: crossterm events plus the app event channel
//! fed by the browser worker, multiplexed with `select!`.

use crate::app_event::AppEvent;
use crate::columns;
use crate::columns::COLUMNS;
use crate::debounce::QueryDebouncer;
use crate::popup::SelectPopup;
use crate::status_bar;
use crate::tree_list::TreeList;
use crate::worker::BrowserCommand;
use crate::worker::WorkerHandle;
use crate::worker::spawn_worker;
use color_eyre::eyre::Result;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use futures::StreamExt;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use stacks_browser::BrowserEvent;
use stacks_browser::FilterMode;
use stacks_browser::FilterPhase;
use stacks_browser::HierarchyService;
use stacks_browser::NodeKey;
use stacks_browser::TreeSnapshot;
use stacks_browser::edit;
use stacks_protocol::ColumnFilters;
use stacks_protocol::ColumnId;
use stacks_protocol::VocabEntry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Focus {
    Tree,
    Query,
}

enum Popup {
    Edit {
        key: NodeKey,
        column: ColumnId,
        select: SelectPopup,
    },
    FilterColumn {
        select: SelectPopup,
    },
    FilterValue {
        column: ColumnId,
        select: SelectPopup,
    },
    BulkColumn {
        select: SelectPopup,
    },
    BulkValue {
        column: ColumnId,
        select: SelectPopup,
    },
}

pub struct App {
    worker: WorkerHandle,
    debouncer: QueryDebouncer,
    snapshot: TreeSnapshot,
    tree_list: TreeList,
    focus: Focus,
    popup: Option<Popup>,
    query_input: String,
    focused_column: usize,
    busy: usize,
    notice: Option<String>,
    viewport_rows: usize,
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    service: Arc<dyn HierarchyService>,
) -> Result<()> {
    let (app_tx, mut app_rx) = mpsc::unbounded_channel();
    let worker = spawn_worker(service, app_tx.clone()).await;
    let debouncer = QueryDebouncer::new(app_tx);

    let mut app = App {
        worker,
        debouncer,
        snapshot: empty_snapshot(),
        tree_list: TreeList::new(),
        focus: Focus::Tree,
        popup: None,
        query_input: String::new(),
        focused_column: 0,
        busy: 0,
        notice: None,
        viewport_rows: 1,
    };
    app.dispatch(BrowserCommand::LoadRoots);

    let mut terminal_events = EventStream::new();
    loop {
        terminal.draw(|frame| app.render(frame))?;
        tokio::select! {
            Some(event) = app_rx.recv() => {
                app.handle_app_event(event);
            }
            maybe_event = terminal_events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                        if !app.handle_key(key) {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }
    }
    Ok(())
}

impl App {
    fn dispatch(&mut self, command: BrowserCommand) {
        self.busy += 1;
        let _ = self.worker.commands.send(command);
    }

    /// Filter-affecting commands supersede the shared generation first so
    /// any in-flight work aborts immediately instead of at queue drain.
    fn dispatch_filter(&mut self, command: BrowserCommand) {
        self.worker.generation.supersede();
        self.dispatch(command);
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Snapshot(snapshot) => {
                self.tree_list.clamp(snapshot.rows.len());
                self.snapshot = snapshot;
            }
            AppEvent::WorkerDone => {
                self.busy = self.busy.saturating_sub(1);
            }
            AppEvent::DebouncedQuery(query) => {
                self.dispatch_filter(BrowserCommand::RunQuery(query));
            }
            AppEvent::Browser(event) => self.handle_browser_event(event),
        }
    }

    fn handle_browser_event(&mut self, event: BrowserEvent) {
        match event {
            BrowserEvent::SelectionProgress { processed } => {
                self.notice = Some(format!("selecting… {processed} nodes"));
            }
            BrowserEvent::SelectionChanged { .. } => {
                self.notice = None;
            }
            BrowserEvent::EditFailed {
                key,
                column,
                message,
            } => {
                self.notice = Some(format!(
                    "update of {} on {key} failed: {message}",
                    columns::title_of(column)
                ));
            }
            BrowserEvent::BulkApplied { updated, messages } => {
                let mut text = format!("bulk update applied to {updated} records");
                if let Some(first) = messages.first() {
                    text.push_str(&format!(" ({first})"));
                }
                self.notice = Some(text);
            }
            BrowserEvent::FilterApplied { .. } | BrowserEvent::FilterCleared => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        if self.popup.is_some() {
            self.handle_popup_key(key);
            return true;
        }
        match self.focus {
            Focus::Query => self.handle_query_key(key),
            Focus::Tree => return self.handle_tree_key(key),
        }
        true
    }

    fn handle_tree_key(&mut self, key: KeyEvent) -> bool {
        let len = self.snapshot.rows.len();
        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Up => self.tree_list.move_by(-1, len),
            KeyCode::Down => self.tree_list.move_by(1, len),
            KeyCode::PageUp => self.tree_list.move_by(-(self.viewport_rows as isize), len),
            KeyCode::PageDown => self.tree_list.move_by(self.viewport_rows as isize, len),
            KeyCode::Home => self.tree_list.jump_to_start(),
            KeyCode::End => self.tree_list.jump_to_end(len),
            KeyCode::Right => {
                if let Some(row) = self.current_row()
                    && row.is_folder
                    && !row.expanded
                {
                    let key = row.key.clone();
                    self.dispatch(BrowserCommand::Expand(key));
                }
            }
            KeyCode::Left => {
                if let Some(row) = self.current_row()
                    && row.is_folder
                    && row.expanded
                {
                    let key = row.key.clone();
                    self.dispatch(BrowserCommand::Collapse(key));
                }
            }
            KeyCode::Enter => {
                if let Some(row) = self.current_row()
                    && row.is_folder
                {
                    let command = if row.expanded {
                        BrowserCommand::Collapse(row.key.clone())
                    } else {
                        BrowserCommand::Expand(row.key.clone())
                    };
                    self.dispatch(command);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(row) = self.current_row() {
                    let command = if row.is_folder {
                        BrowserCommand::SelectDescendants {
                            key: row.key.clone(),
                            select: !row.selected,
                        }
                    } else {
                        BrowserCommand::ToggleSelected(row.key.clone())
                    };
                    self.dispatch(command);
                }
            }
            KeyCode::Char('a') => self.dispatch(BrowserCommand::SelectAllFiltered { select: true }),
            KeyCode::Char('A') => {
                self.dispatch(BrowserCommand::SelectAllFiltered { select: false });
            }
            KeyCode::Char('/') => {
                self.query_input = self.snapshot.query.clone();
                self.focus = Focus::Query;
            }
            KeyCode::Char('f') => {
                let options = columns::FILTERABLE
                    .iter()
                    .map(|column| VocabEntry {
                        value: column.as_str().to_string(),
                        label: columns::title_of(*column).to_string(),
                    })
                    .collect();
                self.popup = Some(Popup::FilterColumn {
                    select: SelectPopup::new("Filter column", options),
                });
            }
            KeyCode::Char('e') => self.open_edit_popup(),
            KeyCode::Char('b') => {
                if self.snapshot.selected_count > 0 {
                    let options = columns::FILTERABLE
                        .iter()
                        .map(|column| VocabEntry {
                            value: column.as_str().to_string(),
                            label: columns::title_of(*column).to_string(),
                        })
                        .collect();
                    self.popup = Some(Popup::BulkColumn {
                        select: SelectPopup::new("Bulk change column", options),
                    });
                }
            }
            KeyCode::Char('s') => {
                let column = COLUMNS[self.focused_column].id;
                self.dispatch(BrowserCommand::ToggleSort(column));
            }
            KeyCode::Char('[') => {
                self.focused_column = self.focused_column.checked_sub(1).unwrap_or(COLUMNS.len() - 1);
            }
            KeyCode::Char(']') => {
                self.focused_column = (self.focused_column + 1) % COLUMNS.len();
            }
            KeyCode::Char('m') => {
                let mode = match self.snapshot.mode {
                    FilterMode::Hide => FilterMode::Dim,
                    FilterMode::Dim => FilterMode::Hide,
                };
                self.dispatch(BrowserCommand::SetFilterMode(mode));
            }
            KeyCode::Char('c') => {
                self.debouncer.cancel();
                self.query_input.clear();
                self.dispatch_filter(BrowserCommand::ClearFilters);
            }
            KeyCode::Esc => {
                if !self.snapshot.query.is_empty() || !self.snapshot.column_filters.is_empty() {
                    self.debouncer.cancel();
                    self.query_input.clear();
                    self.dispatch_filter(BrowserCommand::RunQuery(String::new()));
                }
            }
            _ => {}
        }
        true
    }

    fn handle_query_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.debouncer.cancel();
                self.query_input.clear();
                self.dispatch_filter(BrowserCommand::RunQuery(String::new()));
                self.focus = Focus::Tree;
            }
            KeyCode::Enter => self.focus = Focus::Tree,
            KeyCode::Backspace => {
                self.query_input.pop();
                self.debouncer.on_input(self.query_input.clone());
            }
            KeyCode::Char(c) => {
                self.query_input.push(c);
                self.debouncer.on_input(self.query_input.clone());
            }
            _ => {}
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        let Some(mut popup) = self.popup.take() else {
            return;
        };
        let select = match &mut popup {
            Popup::Edit { select, .. }
            | Popup::FilterColumn { select }
            | Popup::FilterValue { select, .. }
            | Popup::BulkColumn { select }
            | Popup::BulkValue { select, .. } => select,
        };
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Up => select.move_by(-1),
            KeyCode::Down => select.move_by(1),
            KeyCode::Enter => {
                self.commit_popup(popup);
                return;
            }
            _ => {}
        }
        self.popup = Some(popup);
    }

    fn commit_popup(&mut self, popup: Popup) {
        match popup {
            Popup::Edit {
                key,
                column,
                select,
            } => {
                if let Some(entry) = select.current() {
                    let value = if entry.value.is_empty() {
                        None
                    } else {
                        Some(entry.value.clone())
                    };
                    self.dispatch(BrowserCommand::CommitEdit { key, column, value });
                }
            }
            Popup::FilterColumn { select } => {
                if let Some(column) = select.current().and_then(|entry| column_by_name(&entry.value)) {
                    let current = self.snapshot.column_filters.get(&column).cloned();
                    self.popup = Some(Popup::FilterValue {
                        column,
                        select: SelectPopup::new(
                            format!("Filter {}", columns::title_of(column)),
                            filter_options(column, &self.worker),
                        )
                        .with_current(current.as_deref()),
                    });
                }
            }
            Popup::FilterValue { column, select } => {
                if let Some(entry) = select.current() {
                    let value = if entry.value.is_empty() {
                        None
                    } else {
                        Some(entry.value.clone())
                    };
                    self.dispatch_filter(BrowserCommand::SetColumnFilter(column, value));
                }
            }
            Popup::BulkColumn { select } => {
                if let Some(column) = select.current().and_then(|entry| column_by_name(&entry.value)) {
                    self.popup = Some(Popup::BulkValue {
                        column,
                        select: SelectPopup::new(
                            format!("Bulk set {}", columns::title_of(column)),
                            edit::options_for(column, &self.worker.vocabularies),
                        ),
                    });
                }
            }
            Popup::BulkValue { column, select } => {
                if let Some(entry) = select.current() {
                    let mut changes = BTreeMap::new();
                    changes.insert(column, entry.value.clone());
                    self.dispatch(BrowserCommand::BulkUpdate(changes));
                }
            }
        }
    }

    fn open_edit_popup(&mut self) {
        let Some(row) = self.current_row() else {
            return;
        };
        let column = COLUMNS[self.focused_column].id;
        if !edit::is_editable(column, row.is_folder) {
            self.notice = Some(format!(
                "{} is not editable here",
                columns::title_of(column)
            ));
            return;
        }
        let key = row.key.clone();
        let options = edit::options_for(column, &self.worker.vocabularies);
        self.popup = Some(Popup::Edit {
            key,
            column,
            select: SelectPopup::new(format!("Set {}", columns::title_of(column)), options),
        });
    }

    fn current_row(&self) -> Option<&stacks_browser::RowView> {
        self.tree_list.current_row(&self.snapshot.rows)
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let query_height = u16::from(self.focus == Focus::Query);
        let tree_height = area.height.saturating_sub(query_height + 2);
        let status_height = area.height.saturating_sub(tree_height + query_height);

        let tree_area = Rect::new(area.x, area.y, area.width, tree_height);
        self.tree_list
            .render(frame, tree_area, &self.snapshot, self.focused_column);
        self.viewport_rows = tree_area.height.saturating_sub(1).max(1) as usize;

        let mut y = area.y + tree_height;
        if query_height > 0 {
            let query_area = Rect::new(area.x, y, area.width, 1);
            frame.render_widget(
                Line::from(format!("filter: {}▏", self.query_input).yellow()),
                query_area,
            );
            y += 1;
        }
        let status_area = Rect::new(area.x, y, area.width, status_height);
        status_bar::render(
            frame,
            status_area,
            &self.snapshot,
            self.busy,
            self.notice.as_deref(),
        );

        if let Some(popup) = &self.popup {
            let select = match popup {
                Popup::Edit { select, .. }
                | Popup::FilterColumn { select }
                | Popup::FilterValue { select, .. }
                | Popup::BulkColumn { select }
                | Popup::BulkValue { select, .. } => select,
            };
            select.render(frame, area);
        }
    }
}

fn column_by_name(name: &str) -> Option<ColumnId> {
    COLUMNS
        .iter()
        .map(|spec| spec.id)
        .find(|column| column.as_str() == name)
}

/// Value options for a column filter: `(any)` clears, the user column gets
/// the literal `unassigned` bucket the normalization produces.
fn filter_options(column: ColumnId, worker: &WorkerHandle) -> Vec<VocabEntry> {
    let mut options = vec![VocabEntry {
        value: String::new(),
        label: "(any)".to_string(),
    }];
    match column {
        ColumnId::AssignedUser => {
            options.push(VocabEntry {
                value: "unassigned".to_string(),
                label: "(unassigned)".to_string(),
            });
            options.extend(
                edit::options_for(column, &worker.vocabularies)
                    .into_iter()
                    .filter(|entry| !entry.value.is_empty()),
            );
        }
        _ => {
            options.extend(edit::options_for(column, &worker.vocabularies));
        }
    }
    options
}

fn empty_snapshot() -> TreeSnapshot {
    TreeSnapshot {
        rows: Vec::new(),
        match_count: None,
        selected_count: 0,
        query: String::new(),
        column_filters: ColumnFilters::new(),
        mode: FilterMode::Hide,
        phase: FilterPhase::Idle,
        sort: None,
        generation: 0,
    }
}
