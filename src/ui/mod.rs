pub mod header;
pub mod help;
pub mod rollup_table;
pub mod selection_bar;
pub mod statusbar;
pub mod theme;
pub mod worker_table;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;
use crate::cluster::telemetry::TelemetrySource;

pub fn draw<S: TelemetrySource>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let snapshot = app.snapshot();

    header::render(
        frame,
        chunks[0],
        &header::HeaderInfo {
            endpoint: &app.endpoint,
            rollup: &snapshot.rollup,
            skipped_count: snapshot.skipped_count,
            updated_at: app.last_refreshed_at(),
            stale: app.last_fetch_failed(),
        },
        &app.theme,
        &app.cpu_history,
    );
    rollup_table::render(frame, chunks[1], &snapshot.rollup, &app.theme);

    let visible = app.visible_workers();
    worker_table::render(
        frame,
        chunks[2],
        &visible,
        app.selected_index(),
        &app.theme,
    );

    selection_bar::render(frame, chunks[3], app.selected_worker(), &app.theme);
    statusbar::render(
        frame,
        chunks[4],
        app.input_mode,
        &app.filter_text,
        app.status_message.as_ref(),
        &app.keybinds,
        &app.theme,
    );

    // Overlay last so it draws on top.
    if app.show_help() {
        help::render(frame, frame.area(), &app.help_entries(), &app.theme);
    }
}
