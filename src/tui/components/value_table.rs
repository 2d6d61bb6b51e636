//! # ValueTable Component
//!
//! Right pane of the finder: a one-row table describing the highlighted
//! key as `Key | Value | Type`, the value rendered as compact JSON.
//!
//! Stateless. Takes the preview `ValueView` as a prop.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::core::state::ValueView;
use crate::store::{Inspection, render_inline};
use crate::tui::component::Component;

pub const UNSUPPORTED_TEXT: &str = "(type not supported)";

pub struct ValueTable<'a> {
    pub view: Option<&'a ValueView>,
}

impl<'a> ValueTable<'a> {
    pub fn new(view: Option<&'a ValueView>) -> Self {
        Self { view }
    }
}

/// The three preview cells for a fetched key.
pub fn preview_cells(inspection: &Inspection) -> [String; 3] {
    let value = match &inspection.value {
        Some(value) => render_inline(value),
        None => UNSUPPORTED_TEXT.to_string(),
    };
    [
        inspection.key.clone(),
        value,
        inspection.value_type.label().to_uppercase(),
    ]
}

impl Component for ValueTable<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Columns ");

        let cells = match self.view {
            None => {
                let hint = Paragraph::new("Select a key to preview its value.")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block);
                frame.render_widget(hint, area);
                return;
            }
            Some(ValueView::Failed { key, message }) => {
                let failed = Paragraph::new(format!("{key}: {message}"))
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(failed, area);
                return;
            }
            Some(ValueView::Loading { key }) => {
                [key.clone(), "Loading...".to_string(), String::new()]
            }
            Some(ValueView::Ready(inspection)) => preview_cells(inspection),
        };

        let header = Row::new(["Key", "Value", "Type"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
        let [key, value, value_type] = cells;
        let row = Row::new([
            Cell::from(key),
            Cell::from(value),
            Cell::from(value_type).style(Style::default().fg(Color::Cyan)),
        ]);

        let table = Table::new(
            [row],
            [
                Constraint::Percentage(25),
                Constraint::Fill(1),
                Constraint::Length(11),
            ],
        )
        .header(header)
        .block(block);

        frame.render_widget(table, area);
    }
}
