use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, ResolvedKeybinds, key_label};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    input_mode: InputMode,
    filter_text: &str,
    status_message: Option<&(String, Instant)>,
    keybinds: &ResolvedKeybinds,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    if let Some((msg, _)) = status_message {
        let color = if msg.starts_with("Fetch failed") {
            theme.status_err
        } else {
            theme.status_ok
        };
        let line = Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let line = match input_mode {
        InputMode::Filter => {
            let mut spans = vec![
                Span::styled(
                    format!(" {} ", key_label(keybinds.filter)),
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" {filter_text}"),
                    Style::default().fg(theme.pill_desc_fg),
                ),
                Span::styled("\u{2588}", Style::default().fg(theme.pill_key_bg)),
            ];
            spans.extend(pill_spans("Esc".to_string(), "Cancel", theme));
            spans.extend(pill_spans("Enter".to_string(), "Apply", theme));
            Line::from(spans)
        }
        InputMode::Normal if !filter_text.is_empty() => {
            let mut spans = vec![
                Span::styled(
                    " Filter: ",
                    Style::default()
                        .fg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(filter_text.to_string(), Style::default().fg(theme.pill_desc_fg)),
            ];
            spans.extend(pill_spans("Esc".to_string(), "Clear", theme));
            spans.extend(pill_spans(key_label(keybinds.filter), "Edit", theme));
            Line::from(spans)
        }
        InputMode::Normal | InputMode::Help => {
            let mut spans = Vec::new();
            spans.extend(pill_spans(key_label(keybinds.quit), "Quit", theme));
            spans.extend(pill_spans(key_label(keybinds.filter), "Filter", theme));
            spans.extend(pill_spans(key_label(keybinds.refresh), "Refresh", theme));
            spans.extend(pill_spans(key_label(keybinds.cycle_theme), "Theme", theme));
            spans.extend(pill_spans(key_label(keybinds.help), "Help", theme));
            spans.extend(pill_spans("\u{2191}\u{2193}".to_string(), "Select", theme));
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).style(bg_style), area);
}

fn pill_spans(key: String, desc: &'static str, theme: &Theme) -> [Span<'static>; 3] {
    [
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
