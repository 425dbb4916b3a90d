//! Virtualized rendering of the flattened tree rows: only the window of rows
//! that fits the viewport is drawn, and the cursor is kept inside it.

use crate::columns::COLUMNS;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use stacks_browser::RowView;
use stacks_browser::TreeSnapshot;
use unicode_width::UnicodeWidthChar;

const ROW_MARKERS_WIDTH: u16 = 4;

#[derive(Default)]
pub struct TreeList {
    pub cursor: usize,
    first_visible: usize,
}

impl TreeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_row<'a>(&self, rows: &'a [RowView]) -> Option<&'a RowView> {
        rows.get(self.cursor.min(rows.len().saturating_sub(1)))
    }

    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let max = len.saturating_sub(1) as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }

    pub fn jump_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn jump_to_end(&mut self, len: usize) {
        self.cursor = len.saturating_sub(1);
    }

    /// Clamp the cursor after the row set changed underneath it.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.first_visible = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn ensure_visible(&mut self, height: usize, len: usize) {
        if height == 0 || len == 0 {
            self.first_visible = 0;
            return;
        }
        if self.first_visible > self.cursor {
            self.first_visible = self.cursor;
        }
        if self.cursor >= self.first_visible + height {
            self.first_visible = self.cursor + 1 - height;
        }
        self.first_visible = self.first_visible.min(len.saturating_sub(1));
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        snapshot: &TreeSnapshot,
        focused_column: usize,
    ) {
        if area.height < 2 {
            return;
        }
        let header_area = Rect::new(area.x, area.y, area.width, 1);
        let body_area = Rect::new(area.x, area.y + 1, area.width, area.height - 1);

        let widths = column_widths(area.width);
        frame.render_widget(header_line(snapshot, &widths, focused_column), header_area);

        let rows = &snapshot.rows;
        self.clamp(rows.len());
        self.ensure_visible(body_area.height as usize, rows.len());

        let window = rows
            .iter()
            .enumerate()
            .skip(self.first_visible)
            .take(body_area.height as usize);
        for (offset, (index, row)) in window.enumerate() {
            let row_area = Rect::new(
                body_area.x,
                body_area.y + offset as u16,
                body_area.width,
                1,
            );
            frame.render_widget(row_line(row, &widths, index == self.cursor), row_area);
        }
        if rows.is_empty() {
            frame.render_widget(
                Line::from("No folders loaded".dim().italic()),
                Rect::new(body_area.x, body_area.y, body_area.width, 1),
            );
        }
    }
}

/// Resolved width per column: the title column absorbs whatever the fixed
/// columns and row markers leave over.
fn column_widths(total: u16) -> Vec<u16> {
    let fixed: u16 = COLUMNS
        .iter()
        .map(|spec| if spec.width == 0 { 0 } else { spec.width + 1 })
        .sum();
    let flex = total.saturating_sub(fixed + ROW_MARKERS_WIDTH).max(12);
    COLUMNS
        .iter()
        .map(|spec| if spec.width == 0 { flex } else { spec.width })
        .collect()
}

fn header_line(snapshot: &TreeSnapshot, widths: &[u16], focused_column: usize) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = vec![Span::raw(" ".repeat(ROW_MARKERS_WIDTH as usize))];
    for (index, (spec, width)) in COLUMNS.iter().zip(widths).enumerate() {
        let mut title = spec.title.to_string();
        if let Some(sort) = snapshot.sort
            && sort.column == spec.id
        {
            title.push(if sort.ascending { '▲' } else { '▼' });
        }
        let mut span = Span::from(fit(&title, *width as usize)).bold();
        if index == focused_column {
            span = span.underlined();
        }
        spans.push(span);
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn row_line(row: &RowView, widths: &[u16], is_cursor: bool) -> Line<'static> {
    let marker = if row.is_folder {
        if !row.has_children {
            "  "
        } else if row.expanded {
            "▾ "
        } else {
            "▸ "
        }
    } else {
        "  "
    };
    let selection = if row.selected { "✓ " } else { "  " };

    let mut spans: Vec<Span<'static>> = vec![Span::raw(selection.to_string()), Span::raw(marker)];
    for (index, (cell, width)) in row.cells.iter().zip(widths).enumerate() {
        let text = if index == 0 {
            let indent = "  ".repeat(row.depth as usize);
            fit(&format!("{indent}{cell}"), *width as usize)
        } else {
            fit(cell, *width as usize)
        };
        spans.push(Span::raw(text));
        spans.push(Span::raw(" "));
    }

    let mut line = Line::from(spans);
    if row.dimmed {
        line = line.dim();
    }
    if is_cursor {
        line = line.reversed();
    }
    line
}

/// Truncate or pad to an exact display width.
fn fit(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    while used < width {
        out.push(' ');
        used += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fit_pads_and_truncates() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 3), "abc");
        assert_eq!(fit("", 2), "  ");
    }

    #[test]
    fn cursor_stays_inside_window() {
        let mut list = TreeList::new();
        list.cursor = 10;
        list.ensure_visible(5, 20);
        assert!(list.first_visible <= 10 && 10 < list.first_visible + 5);

        list.cursor = 0;
        list.ensure_visible(5, 20);
        assert_eq!(list.first_visible, 0);
    }

    #[test]
    fn clamp_handles_shrinking_row_sets() {
        let mut list = TreeList::new();
        list.cursor = 9;
        list.clamp(3);
        assert_eq!(list.cursor, 2);
        list.clamp(0);
        assert_eq!(list.cursor, 0);
    }
}
