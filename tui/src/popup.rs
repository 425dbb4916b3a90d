//! Centered single-choice dropdown used for inline edits, column filters,
//! and bulk changes.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::StatefulWidget;
use ratatui::widgets::Widget;
use stacks_protocol::VocabEntry;

pub struct SelectPopup {
    pub title: String,
    pub options: Vec<VocabEntry>,
    pub cursor: usize,
}

impl SelectPopup {
    pub fn new(title: impl Into<String>, options: Vec<VocabEntry>) -> Self {
        Self {
            title: title.into(),
            options,
            cursor: 0,
        }
    }

    /// Start with the cursor on the current value, when present.
    pub fn with_current(mut self, current: Option<&str>) -> Self {
        if let Some(current) = current
            && let Some(index) = self
                .options
                .iter()
                .position(|entry| entry.value == current)
        {
            self.cursor = index;
        }
        self
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.options.is_empty() {
            return;
        }
        let max = self.options.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
    }

    pub fn current(&self) -> Option<&VocabEntry> {
        self.options.get(self.cursor)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let height = (self.options.len() as u16 + 2).min(area.height.saturating_sub(2)).max(3);
        let width = self
            .options
            .iter()
            .map(|entry| entry.label.len() as u16)
            .chain([self.title.len() as u16])
            .max()
            .unwrap_or(16)
            .saturating_add(6)
            .min(area.width.saturating_sub(2));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let popup = Rect::new(x, y, width, height);

        Clear.render(popup, frame.buffer_mut());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.clone());
        let items: Vec<ListItem> = if self.options.is_empty() {
            vec![ListItem::new(Line::from("(no options)".dim().italic()))]
        } else {
            self.options
                .iter()
                .map(|entry| ListItem::new(Line::from(entry.label.clone())))
                .collect()
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        state.select((!self.options.is_empty()).then_some(self.cursor));
        StatefulWidget::render(list, popup, frame.buffer_mut(), &mut state);
    }
}
