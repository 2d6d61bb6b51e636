//! # KeyList Component
//!
//! Left pane of the finder: the keys returned by the last scan, with the
//! highlighted one tracking `App::selected`.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `KeyListState` lives in `TuiState` (scroll offset, last drawn area)
//! - `KeyList` is created each frame with borrowed state and props

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::core::action::Action;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Persistent state for the key list.
#[derive(Default)]
pub struct KeyListState {
    pub list_state: ListState,
    /// Area drawn on the last frame, for paging and mouse hit testing.
    area: Rect,
}

/// Events emitted by the finder's key list.
#[derive(Debug)]
pub enum FinderEvent {
    /// Forward to the core reducer.
    Dispatch(Action),
    /// Open the pattern prompt.
    EditPattern,
}

impl KeyListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows visible inside the border on the last frame.
    pub fn page_height(&self) -> usize {
        self.inner().height.max(1) as usize
    }

    fn inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.area)
    }

    /// Index of the key drawn at screen cell (`column`, `row`), if any.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        let inner = self.inner();
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        Some(self.list_state.offset() + (row - inner.y) as usize)
    }
}

impl EventHandler for KeyListState {
    type Event = FinderEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<FinderEvent> {
        let page = self.page_height() as isize;
        let action = match event {
            TuiEvent::CursorUp | TuiEvent::ScrollUp => Action::SelectPrevious,
            TuiEvent::CursorDown | TuiEvent::ScrollDown => Action::SelectNext,
            TuiEvent::PageUp => Action::SelectBy(-page),
            TuiEvent::PageDown => Action::SelectBy(page),
            TuiEvent::CursorHome => Action::SelectFirst,
            TuiEvent::CursorEnd => Action::SelectLast,
            TuiEvent::Submit => Action::OpenDetail,
            TuiEvent::Escape | TuiEvent::InputChar('q') => Action::Quit,
            TuiEvent::InputChar('r') => Action::Rescan,
            TuiEvent::InputChar('/') => return Some(FinderEvent::EditPattern),
            TuiEvent::MouseClick(column, row) => Action::Select(self.hit_test(*column, *row)?),
            _ => return None,
        };
        Some(FinderEvent::Dispatch(action))
    }
}

/// Transient render wrapper for the key list.
pub struct KeyList<'a> {
    state: &'a mut KeyListState,
    keys: &'a [String],
    selected: Option<usize>,
    is_loading: bool,
}

impl<'a> KeyList<'a> {
    pub fn new(
        state: &'a mut KeyListState,
        keys: &'a [String],
        selected: Option<usize>,
        is_loading: bool,
    ) -> Self {
        Self {
            state,
            keys,
            selected,
            is_loading,
        }
    }
}

impl Component for KeyList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.area = area;
        self.state.list_state.select(self.selected);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" Keys ({}) ", self.keys.len()))
            .title_bottom(Line::from(" / Filter  r Rescan  Enter Open  q Quit ").centered());

        if self.keys.is_empty() {
            let message = if self.is_loading {
                "Scanning..."
            } else {
                "No keys match."
            };
            let empty = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .keys
            .iter()
            .map(|key| ListItem::new(key.as_str()))
            .collect();

        let list = List::new(items)
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            );

        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
