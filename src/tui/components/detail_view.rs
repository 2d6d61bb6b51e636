//! # DetailView Component
//!
//! Full-screen page for one key. Hashes are shown as a field table,
//! everything else as syntax-highlighted, indented JSON. Long values
//! scroll inside a `ScrollView`.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `DetailViewState` lives in `TuiState` (scroll offset, prepared body)
//! - `DetailView` is created each frame with borrowed state
//!
//! The body is rendered and highlighted once per opened key, then reused
//! by every frame until `reset`. Values longer than `MAX_DETAIL_ROWS` are
//! cut there, and a note under the content says so.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::state::ValueView;
use crate::store::{EditField, Inspection, NormalizedValue, render_for_display, render_for_edit};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::highlight::highlight_json;

/// Most content rows laid out on the detail page.
pub const MAX_DETAIL_ROWS: usize = 5_000;

/// Persistent state for the detail page.
#[derive(Default)]
pub struct DetailViewState {
    pub scroll_state: ScrollViewState,
    prepared: Option<PreparedBody>,
}

/// Events emitted by the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEvent {
    Close,
}

impl DetailViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the top, for a freshly opened key.
    pub fn reset(&mut self) {
        self.scroll_state = ScrollViewState::default();
        self.prepared = None;
    }

    /// Key whose body is currently cached.
    pub fn prepared_key(&self) -> Option<&str> {
        self.prepared.as_ref().map(|p| p.key.as_str())
    }
}

impl EventHandler for DetailViewState {
    type Event = DetailEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<DetailEvent> {
        match event {
            TuiEvent::Escape | TuiEvent::Submit | TuiEvent::Backspace => {
                return Some(DetailEvent::Close);
            }
            TuiEvent::CursorUp | TuiEvent::ScrollUp => self.scroll_state.scroll_up(),
            TuiEvent::CursorDown | TuiEvent::ScrollDown => self.scroll_state.scroll_down(),
            TuiEvent::PageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::PageDown => self.scroll_state.scroll_page_down(),
            TuiEvent::CursorHome => self.scroll_state.scroll_to_top(),
            TuiEvent::CursorEnd => self.scroll_state.scroll_to_bottom(),
            _ => {}
        }
        None
    }
}

/// What the page body shows for a fetched key.
enum Body {
    Fields(Vec<EditField>),
    Json(Text<'static>),
    Unsupported,
}

/// A body cut to at most `MAX_DETAIL_ROWS` rows.
struct PreparedBody {
    key: String,
    body: Body,
    /// Fields or lines kept in `body`
    shown: usize,
    /// Fields or lines in the whole value
    total: usize,
}

impl PreparedBody {
    fn of(inspection: &Inspection) -> Self {
        let key = inspection.key.clone();
        match &inspection.value {
            None => Self {
                key,
                body: Body::Unsupported,
                shown: 0,
                total: 0,
            },
            Some(value @ NormalizedValue::Mapping(_)) => match render_for_edit(value) {
                Ok(mut fields) => {
                    let total = fields.len();
                    fields.truncate(MAX_DETAIL_ROWS);
                    Self {
                        key,
                        shown: fields.len(),
                        body: Body::Fields(fields),
                        total,
                    }
                }
                Err(_) => Self::json(key, value),
            },
            Some(value) => Self::json(key, value),
        }
    }

    /// Highlights only the lines that will be shown.
    fn json(key: String, value: &NormalizedValue) -> Self {
        let rendered = render_for_display(value);
        let total = rendered.lines().count();
        let kept: Vec<&str> = rendered.lines().take(MAX_DETAIL_ROWS).collect();
        Self {
            key,
            shown: kept.len(),
            body: Body::Json(highlight_json(&kept.join("\n"))),
            total,
        }
    }

    fn unit(&self) -> &'static str {
        match self.body {
            Body::Fields(_) => "fields",
            _ => "lines",
        }
    }
}

/// Rows as a scroll height, saturating at `u16::MAX`.
fn rows(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

/// Transient render wrapper for the detail page.
pub struct DetailView<'a> {
    state: &'a mut DetailViewState,
    view: &'a ValueView,
}

impl<'a> DetailView<'a> {
    pub fn new(state: &'a mut DetailViewState, view: &'a ValueView) -> Self {
        Self { state, view }
    }

    fn title(&self) -> String {
        match self.view {
            ValueView::Ready(inspection) => format!(
                " {} ({}) ",
                inspection.key,
                inspection.value_type.label().to_uppercase()
            ),
            other => format!(" {} ", other.key()),
        }
    }

    fn render_message(frame: &mut Frame, area: Rect, text: String, style: Style) {
        let paragraph = Paragraph::new(text).style(style).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_ready(&mut self, frame: &mut Frame, area: Rect, inspection: &Inspection) {
        let DetailViewState {
            scroll_state,
            prepared,
        } = &mut *self.state;
        let stale = prepared.as_ref().is_none_or(|p| p.key != inspection.key);
        if stale {
            *prepared = Some(PreparedBody::of(inspection));
        }
        let Some(prepared) = prepared.as_ref() else {
            return;
        };

        let content_width = area.width.saturating_sub(1);
        let (height, overflow, mut scroll_view) = match &prepared.body {
            Body::Unsupported => {
                return Self::render_message(
                    frame,
                    area,
                    "This type is not supported.".to_string(),
                    Style::default().fg(Color::DarkGray),
                );
            }
            Body::Fields(fields) => {
                let height = rows(fields.len()).saturating_add(1);
                let mut scroll_view = ScrollView::new(Size::new(content_width, height));
                scroll_view.render_widget(
                    field_table(fields),
                    Rect::new(0, 0, content_width, height),
                );
                (height, false, scroll_view)
            }
            Body::Json(text) => {
                let paragraph = Paragraph::new(text.clone()).wrap(Wrap { trim: false });
                let wrapped = paragraph.line_count(content_width);
                let height = rows(wrapped.min(MAX_DETAIL_ROWS));
                let mut scroll_view = ScrollView::new(Size::new(content_width, height));
                scroll_view.render_widget(paragraph, Rect::new(0, 0, content_width, height));
                (height, wrapped > MAX_DETAIL_ROWS, scroll_view)
            }
        };

        let note = if prepared.shown < prepared.total {
            Some(format!(
                "Truncated: showing the first {} of {} {}",
                prepared.shown,
                prepared.total,
                prepared.unit()
            ))
        } else {
            overflow.then(|| format!("Truncated: showing the first {MAX_DETAIL_ROWS} rows"))
        };
        let area = if let Some(note_text) = note {
            let [content, note] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            frame.render_widget(
                Paragraph::new(note_text).style(Style::default().fg(Color::Yellow)),
                note,
            );
            content
        } else {
            area
        };

        let visibility = if height > area.height {
            ScrollbarVisibility::Always
        } else {
            ScrollbarVisibility::Never
        };
        scroll_view = scroll_view
            .vertical_scrollbar_visibility(visibility)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        frame.render_stateful_widget(scroll_view, area, scroll_state);
    }
}

fn field_table(fields: &[EditField]) -> Table<'static> {
    let header = Row::new(["Field", "Value"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = fields
        .iter()
        .map(|field| Row::new([field.label.to_uppercase(), field.text.clone()]))
        .collect();
    Table::new(rows, [Constraint::Percentage(30), Constraint::Fill(1)]).header(header)
}

impl Component for DetailView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(self.title())
            .title_bottom(Line::from(" Esc/Enter/Backspace Back ").centered());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let view = self.view;
        match view {
            ValueView::Loading { .. } => Self::render_message(
                frame,
                inner,
                "Loading...".to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            ValueView::Failed { message, .. } => Self::render_message(
                frame,
                inner,
                message.clone(),
                Style::default().fg(Color::Red),
            ),
            ValueView::Ready(inspection) => self.render_ready(frame, inner, inspection),
        }
    }
}
