use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::cluster::worker::WorkerRecord;
use crate::format::{format_cpu_cell, format_memory_cell, truncate_unicode};
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, selected: Option<&WorkerRecord>, theme: &Theme) {
    let style = Style::default()
        .bg(theme.statusbar_bg)
        .fg(theme.text_primary);
    let width = area.width as usize;
    let line = match selected {
        Some(worker) => format_selection_line(worker, width),
        None => " ".repeat(width),
    };

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(line, style))).style(style),
        area,
    );
}

/// Address on the left, metrics flush right. Metrics win when space is short.
fn format_selection_line(worker: &WorkerRecord, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let mut metrics = format!(
        "cpu {}  mem {}  tasks {} ",
        format_cpu_cell(worker).text,
        format_memory_cell(worker).text,
        worker.executing + worker.ready,
    );
    if metrics.width() > width {
        metrics = truncate_unicode(&metrics, width);
        let pad = width.saturating_sub(metrics.width());
        return format!("{}{}", " ".repeat(pad), metrics);
    }

    let metrics_width = metrics.width();
    let left_capacity = width.saturating_sub(metrics_width + 1);
    let address = truncate_unicode(&format!(" {}", worker.address), left_capacity);
    let gap = width.saturating_sub(address.width() + metrics_width);
    format!("{address}{}{metrics}", " ".repeat(gap))
}
