use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::cluster::worker::WorkerRecord;
use crate::format::{FormattedCell, format_cpu_cell, format_memory_cell, truncate_unicode};
use crate::ui::theme::Theme;

pub const TITLES: [&str; 8] = [
    "Address",
    "CPU",
    "Memory",
    "FDs",
    "Executing",
    "In Memory",
    "Ready",
    "In Flight",
];

const WIDTHS: [u16; 8] = [22, 10, 24, 8, 9, 9, 9, 9];

pub fn render(
    frame: &mut Frame,
    area: Rect,
    workers: &[&WorkerRecord],
    selected: Option<usize>,
    theme: &Theme,
) {
    let header = Row::new(TITLES).style(
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    );

    // Borders eat two columns.
    let inner_width = area.width.saturating_sub(2);
    let address_width = (inner_width as usize * WIDTHS[0] as usize / 100).max(1);

    let rows = workers
        .iter()
        .map(|worker| worker_row(worker, address_width, theme));
    let widths = WIDTHS.map(Constraint::Percentage);

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(theme.overlay_border))
                .title(format!(" Workers ({}) ", workers.len())),
        )
        .row_highlight_style(
            Style::default()
                .bg(theme.row_highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn worker_row<'a>(worker: &WorkerRecord, address_width: usize, theme: &Theme) -> Row<'a> {
    let plain = Style::default().fg(theme.text_primary);
    let severity_cell = |cell: FormattedCell| {
        Cell::from(cell.text).style(Style::default().fg(theme.severity_color(cell.severity)))
    };

    Row::new([
        Cell::from(truncate_unicode(&worker.address, address_width)).style(plain),
        severity_cell(format_cpu_cell(worker)),
        severity_cell(format_memory_cell(worker)),
        Cell::from(worker.fd_count.to_string()).style(plain),
        Cell::from(worker.executing.to_string()).style(plain),
        Cell::from(worker.in_memory.to_string()).style(plain),
        Cell::from(worker.ready.to_string()).style(plain),
        Cell::from(worker.in_flight.to_string()).style(plain),
    ])
}
