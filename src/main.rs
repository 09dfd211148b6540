use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::KeyEventKind;
use tokio::sync::mpsc::WeakUnboundedSender;

use dtop::app::App;
use dtop::cluster::aggregator::Aggregator;
use dtop::cluster::telemetry::{HttpSource, TelemetrySource};
use dtop::config::{self, Config, load_config, load_config_from_path};
use dtop::error::StartupFailure;
use dtop::event::{Event, EventHandler};
use dtop::{logging, ui};

#[derive(Parser)]
#[command(name = "dtop", about = "Terminal dashboard for a distributed compute cluster")]
struct Cli {
    /// Coordinator address: host:port or an http(s) URL
    #[arg(env = "DTOP_SCHEDULER")]
    scheduler: String,

    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Redraw interval in milliseconds
    #[arg(long)]
    tick_rate: Option<u64>,

    /// Ticks between telemetry fetches
    #[arg(long)]
    refresh_ticks: Option<u64>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init(&config.logging)?;

    let timeout = Duration::from_millis(config.general.fetch_timeout_ms);
    let source = HttpSource::new(&cli.scheduler, timeout)?;
    let endpoint = source.describe();
    tracing::info!(%endpoint, "starting dashboard");

    let mut aggregator = Aggregator::new(source);
    aggregator
        .refresh()
        .await
        .map_err(|source| StartupFailure { endpoint, source })?;

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, aggregator, &config).await;
    ratatui::restore();

    result
}

async fn run(
    terminal: &mut ratatui::DefaultTerminal,
    aggregator: Aggregator<HttpSource>,
    config: &Config,
) -> Result<()> {
    let tick_rate = Duration::from_millis(config.general.tick_rate_ms.max(1));
    let mut app = App::new(aggregator, config);
    let mut events = EventHandler::new(tick_rate);

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        let should_draw = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let action = app.map_key(key);
                app.dispatch(action);
                true
            }
            Event::Key(_) => false,
            Event::Tick => {
                if app.on_tick() {
                    spawn_fetch(app.aggregator.source().clone(), events.sender());
                }
                true
            }
            Event::Fetched(fetched) => {
                app.apply_fetch(fetched);
                true
            }
            Event::Resize => true,
        };
        if should_draw {
            terminal.draw(|frame| ui::draw(frame, &app))?;
        }
    }

    tracing::info!("dashboard closed");
    Ok(())
}

/// Runs one fetch off the render loop; the result comes back as `Event::Fetched`.
fn spawn_fetch<S: TelemetrySource>(source: S, tx: WeakUnboundedSender<Event>) {
    tokio::spawn(async move {
        let fetched = source.fetch().await;
        // No upgrade means the loop already exited.
        if let Some(tx) = tx.upgrade() {
            let _ = tx.send(Event::Fetched(fetched));
        }
    });
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.tick_rate {
        config.general.tick_rate_ms = rate;
    }
    if let Some(ticks) = cli.refresh_ticks {
        config.general.refresh_period_ticks = ticks;
    }
    if let Some(ref path) = cli.log_file {
        config.logging.file = Some(path.clone());
    }

    config
}
