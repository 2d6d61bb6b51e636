//! # TitleBar Component
//!
//! Top status bar: which server we are looking at, the active pattern,
//! and the latest status message.
//!
//! Stateless. Every field is a prop copied from core `App` state each
//! frame:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(&app.endpoint_label, &app.pattern, &app.status_message);
//! title_bar.spinner = app.is_loading.then_some(spinner_frame);
//! title_bar.render(frame, title_area);
//! ```
//!
//! The status part is dropped when empty, so a narrow terminal always
//! keeps the endpoint visible.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct TitleBar<'a> {
    /// Server being browsed, e.g. "localhost:6379"
    pub endpoint: &'a str,
    /// Active MATCH pattern
    pub pattern: &'a str,
    pub status_message: &'a str,
    /// Animation frame while a scan is running
    pub spinner: Option<usize>,
}

impl<'a> TitleBar<'a> {
    pub fn new(endpoint: &'a str, pattern: &'a str, status_message: &'a str) -> Self {
        Self {
            endpoint,
            pattern,
            status_message,
            spinner: None,
        }
    }

    fn line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(
                "Redview",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" {} [{}]", self.endpoint, self.pattern)),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }
        if let Some(frame) = self.spinner {
            spans.push(Span::styled(
                format!(" {}", SPINNER[frame % SPINNER.len()]),
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::buffer_text;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let mut title_bar = TitleBar::new("localhost:6379", "user:*", "3 key(s) matching 'user:*'");
        let text = draw(&mut title_bar);

        assert!(text.contains("Redview"));
        assert!(text.contains("localhost:6379 [user:*]"));
        assert!(text.contains("| 3 key(s)"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("localhost:6379", "*", "");
        let text = draw(&mut title_bar);

        assert!(text.contains("localhost:6379 [*]"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_title_bar_spinner() {
        let mut title_bar = TitleBar::new("h:1", "*", "Scanning '*'...");
        title_bar.spinner = Some(1);
        let text = draw(&mut title_bar);

        assert!(text.contains("Scanning '*'... /"));
    }
}
