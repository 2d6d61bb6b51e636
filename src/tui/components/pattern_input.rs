//! # PatternInput Component
//!
//! Single-line prompt for the scan pattern, opened with `/` from the finder.
//! Starts pre-filled with the active pattern.
//!
//! The buffer scrolls horizontally so the cursor stays visible. Columns are
//! measured with `unicode-width`, so wide characters keep the cursor aligned.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Rows taken by the prompt: one line of text plus borders.
pub const PATTERN_INPUT_HEIGHT: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternEvent {
    Submit(String),
    Cancel,
    Changed,
}

pub struct PatternInput {
    pub buffer: String,
    /// Byte offset into `buffer`, always on a char boundary
    cursor: usize,
}

impl PatternInput {
    pub fn new(initial: &str) -> Self {
        Self {
            buffer: initial.to_string(),
            cursor: initial.len(),
        }
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }

    /// The slice of the buffer that fits in `width` columns, and the cursor
    /// column within it.
    fn visible(&self, width: u16) -> (&str, u16) {
        let width = width.max(1) as usize;
        let mut start = 0;
        let mut column: usize = self.buffer[..self.cursor]
            .chars()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        // Drop leading chars until the cursor fits
        while column >= width {
            let Some(c) = self.buffer[start..].chars().next() else {
                break;
            };
            column -= c.width().unwrap_or(0);
            start += c.len_utf8();
        }
        (&self.buffer[start..], column as u16)
    }
}

impl EventHandler for PatternInput {
    type Event = PatternEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PatternEvent> {
        match event {
            TuiEvent::Escape => Some(PatternEvent::Cancel),
            TuiEvent::Submit => Some(PatternEvent::Submit(self.buffer.trim().to_string())),
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(PatternEvent::Changed)
            }
            TuiEvent::Paste(text) => {
                // Patterns are one line
                let text: String = text.chars().filter(|c| !c.is_control()).collect();
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                Some(PatternEvent::Changed)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = self.prev_boundary();
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                PatternEvent::Changed
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = self.next_boundary();
                self.buffer.drain(self.cursor..next);
                PatternEvent::Changed
            }),
            TuiEvent::CursorLeft => {
                self.cursor = self.prev_boundary();
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = self.next_boundary();
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer.len();
                None
            }
            _ => None,
        }
    }
}

impl Component for PatternInput {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Pattern ")
            .title_bottom(Line::from(" Enter Scan  Esc Cancel ").centered());
        let inner = block.inner(area);
        let (text, column) = self.visible(inner.width);

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(text.to_string())
                .style(Style::default().fg(Color::Green))
                .block(block),
            area,
        );
        frame.set_cursor_position((inner.x + column, inner.y));
    }
}
