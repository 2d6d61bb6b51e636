//! JSON syntax highlighting for the detail page.
//!
//! Converts the indented JSON rendering of a value into ratatui `Text`
//! using syntect. Falls back to plain lines when the JSON syntax is not
//! available in the bundled set.

use std::sync::LazyLock;

use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

/// Highlight `json` line by line. Returns owned text (`'static`).
pub fn highlight_json(json: &str) -> Text<'static> {
    let syntax = SYNTAX_SET.find_syntax_by_token("json");
    let theme = THEME_SET.themes.get(THEME);
    let (Some(syntax), Some(theme)) = (syntax, theme) else {
        return plain(json);
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(json) {
        let Ok(ranges) = highlighter.highlight_line(line, &SYNTAX_SET) else {
            // Keep the text even if a line defeats the highlighter
            lines.push(Line::from(expand_tabs(line.trim_end_matches('\n'))));
            continue;
        };
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .filter_map(|(hl_style, frag)| {
                let content = expand_tabs(frag.trim_end_matches('\n'));
                if content.is_empty() {
                    return None;
                }
                let fg = Color::Rgb(
                    hl_style.foreground.r,
                    hl_style.foreground.g,
                    hl_style.foreground.b,
                );
                Some(Span::styled(content, Style::default().fg(fg)))
            })
            .collect();
        lines.push(Line::from(spans));
    }
    Text::from(lines)
}

fn plain(text: &str) -> Text<'static> {
    Text::from(
        text.lines()
            .map(|l| Line::from(expand_tabs(l)))
            .collect::<Vec<_>>(),
    )
}

// ratatui renders \t as zero-width
fn expand_tabs(s: &str) -> String {
    s.replace('\t', "    ")
}
