use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Row, Table};

use crate::cluster::rollup::Rollup;
use crate::format::format_rollup;
use crate::ui::theme::Theme;

pub const TITLES: [&str; 8] = [
    "No. Workers",
    "Avg. CPU",
    "Avg. Mem",
    "Ttl Fds",
    "Ttl Executing",
    "Ttl In Mem",
    "Ttl Ready",
    "Ttl In Flight",
];

pub fn render(frame: &mut Frame, area: Rect, rollup: &Rollup, theme: &Theme) {
    let header = Row::new(TITLES).style(
        Style::default()
            .fg(theme.text_secondary)
            .add_modifier(Modifier::BOLD),
    );
    let row = Row::new(format_rollup(rollup)).style(Style::default().fg(theme.text_primary));
    let widths = [Constraint::Ratio(1, TITLES.len() as u32); 8];

    let table = Table::new([row], widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.overlay_border))
            .title(" Cluster "),
    );

    frame.render_widget(table, area);
}
