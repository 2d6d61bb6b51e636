use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    DetailView, KeyList, PATTERN_INPUT_HEIGHT, TitleBar, ValueTable,
};

/// Share of the finder width given to the key list.
const KEY_LIST_PERCENT: u16 = 35;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    let mut title_bar = TitleBar::new(&app.endpoint_label, &app.pattern, &app.status_message);
    title_bar.spinner = app.is_loading.then_some(spinner_frame);
    title_bar.render(frame, title_area);

    match &app.detail {
        Some(view) => DetailView::new(&mut tui.detail, view).render(frame, main_area),
        None => {
            let [list_area, preview_area] = Layout::horizontal([
                Constraint::Percentage(KEY_LIST_PERCENT),
                Constraint::Min(0),
            ])
            .areas(main_area);
            KeyList::new(&mut tui.key_list, &app.keys, app.selected, app.is_loading)
                .render(frame, list_area);
            ValueTable::new(app.preview.as_ref()).render(frame, preview_area);
        }
    }

    if let Some(input) = tui.pattern_input.as_mut() {
        input.render(frame, bottom_rect(main_area, PATTERN_INPUT_HEIGHT));
    }

    if let Some(message) = &app.error {
        draw_error_banner(frame, main_area, message);
    }
}

/// Modal banner across the top of the main area. Any key dismisses it.
fn draw_error_banner(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ")
        .title_bottom(Line::from(" Press any key to dismiss ").centered());
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });

    let inner_width = area.width.saturating_sub(2);
    let height = (paragraph.line_count(inner_width) as u16 + 2).min(area.height);
    let banner = Rect { height, ..area };

    frame.render_widget(Clear, banner);
    frame.render_widget(paragraph.block(block), banner);
}

/// The last `height` rows of `area`.
fn bottom_rect(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + area.height - height,
        height,
        ..area
    }
}
