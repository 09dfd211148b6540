use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::{Action, Direction};
use crate::cluster::aggregator::Aggregator;
use crate::cluster::snapshot::ClusterSnapshot;
use crate::cluster::telemetry::{RawWorkers, TelemetrySource};
use crate::cluster::worker::WorkerRecord;
use crate::config::{Config, parse_key};
use crate::error::SourceError;
use crate::refresh::RefreshController;
use crate::ui::theme::{ColorSupport, SeverityOverrides, Theme, resolve_color_support};

const STATUS_TTL_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Filter,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub filter: KeyCode,
    pub refresh: KeyCode,
    pub cycle_theme: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &crate::config::KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            filter: parse_key(&kb.filter).unwrap_or(KeyCode::Char('/')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            cycle_theme: parse_key(&kb.cycle_theme).unwrap_or(KeyCode::Char('t')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        let mut entries = vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.filter), "Filter workers"),
            (key_label(self.refresh), "Refresh now"),
            (key_label(self.cycle_theme), "Cycle theme"),
            (key_label(self.help), "Toggle help"),
        ];
        entries.push(("↑↓".to_string(), "Select worker"));
        entries.push(("Home/End".to_string(), "First/last worker"));
        entries.push(("Ctrl+C".to_string(), "Quit (always)"));
        entries
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => "?".to_string(),
    }
}

/// Dashboard state driven by the event loop: owns the aggregator and the
/// refresh cadence, plus whatever the operator has toggled.
pub struct App<S> {
    pub running: bool,
    pub aggregator: Aggregator<S>,
    pub refresh: RefreshController,
    pub tick: u64,
    fetch_in_flight: bool,
    pub endpoint: String,
    pub input_mode: InputMode,
    pub filter_text: String,
    pub selected_address: Option<String>,
    pub theme: Theme,
    pub color_support: ColorSupport,
    severity_overrides: SeverityOverrides,
    pub status_message: Option<(String, Instant)>,
    pub cpu_history: VecDeque<u64>,
    cpu_history_capacity: usize,
    pub keybinds: ResolvedKeybinds,
}

impl<S: TelemetrySource> App<S> {
    pub fn new(aggregator: Aggregator<S>, config: &Config) -> Self {
        let color_support = resolve_color_support(&config.general.color_support);
        let severity_overrides = SeverityOverrides::from_config(&config.colors);
        let theme = Theme::from_config(&config.colors.theme, &severity_overrides, color_support);
        let sparkline_length = config.general.sparkline_length;
        let endpoint = aggregator.source().describe();

        let mut app = App {
            running: true,
            aggregator,
            refresh: RefreshController::new(config.general.refresh_period_ticks),
            tick: 0,
            fetch_in_flight: false,
            endpoint,
            input_mode: InputMode::Normal,
            filter_text: String::new(),
            selected_address: None,
            theme,
            color_support,
            severity_overrides,
            status_message: None,
            cpu_history: VecDeque::with_capacity(sparkline_length),
            cpu_history_capacity: sparkline_length,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
        };
        // A snapshot taken before the loop starts counts as tick 0's refresh.
        if app.snapshot().fetched_at.is_some() {
            app.refresh.poll(0);
            app.record_cpu_history();
            app.ensure_selection();
        }
        app
    }

    pub fn snapshot(&self) -> &Arc<ClusterSnapshot> {
        self.aggregator.snapshot()
    }

    pub fn last_fetch_failed(&self) -> bool {
        self.aggregator.last_fetch_failed()
    }

    pub fn last_refreshed_at(&self) -> Option<DateTime<Local>> {
        self.snapshot().fetched_at
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Advances the tick counter. Returns true when the caller should start a
    /// fetch; the result must come back through [`App::apply_fetch`].
    pub fn on_tick(&mut self) -> bool {
        let tick = self.tick;
        self.tick += 1;

        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= STATUS_TTL_SECS
        {
            self.status_message = None;
        }

        if self.fetch_in_flight {
            // A manual refresh waits for the running fetch instead of being spent here.
            if !self.refresh.is_forced() && self.refresh.poll(tick) {
                tracing::debug!(tick, "refresh due but previous fetch still running");
            }
            return false;
        }
        if !self.refresh.poll(tick) {
            return false;
        }
        self.fetch_in_flight = true;
        true
    }

    pub fn apply_fetch(&mut self, fetched: Result<RawWorkers, SourceError>) {
        self.fetch_in_flight = false;
        match self.aggregator.apply(fetched) {
            Ok(_) => {
                self.record_cpu_history();
                self.ensure_selection();
            }
            Err(err) => {
                self.status_message = Some((format!("Fetch failed: {err}"), Instant::now()));
            }
        }
    }

    fn record_cpu_history(&mut self) {
        if self.cpu_history_capacity == 0 {
            return;
        }
        let cpu_val = (self.snapshot().rollup.avg_cpu * 100.0).round() as u64;
        if self.cpu_history.len() == self.cpu_history_capacity {
            self.cpu_history.pop_front();
        }
        self.cpu_history.push_back(cpu_val);
    }

    /// Workers shown in the table: the snapshot's order, narrowed by the filter.
    pub fn visible_workers(&self) -> Vec<&WorkerRecord> {
        let filter_lower = self.filter_text.to_lowercase();
        self.snapshot()
            .workers
            .iter()
            .filter(|w| filter_lower.is_empty() || w.address.to_lowercase().contains(&filter_lower))
            .collect()
    }

    pub fn selected_index(&self) -> Option<usize> {
        let address = self.selected_address.as_deref()?;
        self.visible_workers()
            .iter()
            .position(|w| w.address == address)
    }

    pub fn selected_worker(&self) -> Option<&WorkerRecord> {
        let address = self.selected_address.as_deref()?;
        self.snapshot().worker(address)
    }

    /// Keeps the selection on the same address across refreshes; falls back to
    /// the first visible row when that worker is gone or filtered out.
    fn ensure_selection(&mut self) {
        if self.selected_index().is_some() {
            return;
        }
        let first = self.visible_workers().first().map(|w| w.address.clone());
        self.selected_address = first;
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Filter => self.map_key_filter(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        // Arrow keys are hardwired (not configurable)
        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            KeyCode::Home => return Action::Navigate(Direction::Top),
            KeyCode::End => return Action::Navigate(Direction::Bottom),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.filter {
            return Action::EnterFilterMode;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.cycle_theme {
            return Action::CycleTheme;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == KeyCode::Esc && !self.filter_text.is_empty() {
            return Action::ClearFilter;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        let code = key.code;
        // In help mode, only the help key and Esc dismiss, everything else is ignored
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    fn map_key_filter(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => Action::ClearFilter,
            KeyCode::Enter => Action::ExitFilterMode,
            KeyCode::Backspace => {
                let mut text = self.filter_text.clone();
                text.pop();
                Action::UpdateFilter(text)
            }
            KeyCode::Char(c) => {
                let mut text = self.filter_text.clone();
                text.push(c);
                Action::UpdateFilter(text)
            }
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Navigate(dir) => self.navigate(dir),
            Action::EnterFilterMode => self.input_mode = InputMode::Filter,
            Action::ExitFilterMode => self.input_mode = InputMode::Normal,
            Action::ClearFilter => {
                self.filter_text.clear();
                self.input_mode = InputMode::Normal;
                self.ensure_selection();
            }
            Action::UpdateFilter(text) => {
                self.filter_text = text;
                self.ensure_selection();
            }
            Action::CycleTheme => {
                self.theme = self
                    .theme
                    .next(&self.severity_overrides, self.color_support);
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::Refresh => {
                self.refresh.force();
                self.status_message = Some(("Refreshing…".to_string(), Instant::now()));
            }
            Action::None => {}
        }
    }

    fn navigate(&mut self, direction: Direction) {
        let visible = self.visible_workers();
        if visible.is_empty() {
            return;
        }
        let last = visible.len() - 1;
        let current = self
            .selected_address
            .as_deref()
            .and_then(|addr| visible.iter().position(|w| w.address == addr));
        let next = match (direction, current) {
            (Direction::Top, _) | (_, None) => 0,
            (Direction::Bottom, _) => last,
            (Direction::Up, Some(i)) => i.saturating_sub(1),
            (Direction::Down, Some(i)) => (i + 1).min(last),
        };
        let address = visible[next].address.clone();
        self.selected_address = Some(address);
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }
}
