//! Bottom status line: filter summary, counts, busy spinner, and key hints.

use crate::columns;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use stacks_browser::FilterMode;
use stacks_browser::FilterPhase;
use stacks_browser::TreeSnapshot;

const HINTS: &str =
    "/ filter · f column filter · space select · a/A select all · e edit · b bulk · s sort · c clear · q quit";

pub fn render(
    frame: &mut Frame,
    area: Rect,
    snapshot: &TreeSnapshot,
    busy: usize,
    notice: Option<&str>,
) {
    if area.height == 0 {
        return;
    }
    let status = Rect::new(area.x, area.y, area.width, 1);
    frame.render_widget(status_line(snapshot, busy, notice), status);
    if area.height > 1 {
        let hints = Rect::new(area.x, area.y + 1, area.width, 1);
        frame.render_widget(Line::from(HINTS.dim()), hints);
    }
}

fn status_line(snapshot: &TreeSnapshot, busy: usize, notice: Option<&str>) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    if busy > 0 || snapshot.phase != FilterPhase::Idle {
        spans.push(Span::from(format!("⟳ {} ", snapshot.phase)).cyan());
    }
    if !snapshot.query.is_empty() {
        spans.push(Span::from(format!("/{} ", snapshot.query)).yellow());
    }
    for (column, value) in &snapshot.column_filters {
        spans.push(Span::from(format!("{}={value} ", columns::title_of(*column))).yellow());
    }
    if let Some(matches) = snapshot.match_count {
        let mode = match snapshot.mode {
            FilterMode::Hide => "hide",
            FilterMode::Dim => "dim",
        };
        spans.push(format!("{matches} matches ({mode}) ").into());
    }
    if snapshot.selected_count > 0 {
        spans.push(Span::from(format!("{} selected ", snapshot.selected_count)).bold());
    }
    if let Some(notice) = notice {
        spans.push(Span::from(notice.to_string()).magenta());
    }
    if spans.is_empty() {
        spans.push(Span::from("ready").dim());
    }
    Line::from(spans)
}
