use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pdash::controller::Controller;
use pdash::domain::{DashConfig, DashError};
use pdash::model::{Model, Status};
use pdash::provider::{DataProvider, FileProvider, SampleProvider};
use pdash::ui::TableUI;

/// A tui based policy impact dashboard.
#[derive(Parser, Debug)]
#[command(name = "pdash", version, about)]
struct Cli {
    /// Policy dataset to load (csv, parquet or arrow). The bundled
    /// sample policies are shown when omitted.
    file: Option<String>,

    /// Quiet window in ms before a search edit is applied.
    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,

    /// Event poll timeout in ms for the run loop.
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Where the CSV export is written.
    #[arg(long, default_value = "policy_data.csv")]
    export: PathBuf,

    /// Write logs to this file. The terminal belongs to the dashboard,
    /// so without this nothing is logged.
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(path: &PathBuf) -> Result<(), DashError> {
    let logfile = std::fs::File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(logfile)
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run() -> Result<(), DashError> {
    let cli = Cli::parse();
    if let Some(log) = &cli.log {
        init_tracing(log)?;
    }
    info!("Starting pdash!");

    let config = DashConfig::default()
        .event_poll_ms(cli.poll_ms)
        .debounce_ms(cli.debounce_ms)
        .export_path(cli.export);

    let provider: Box<dyn DataProvider> = match cli.file {
        Some(file) => {
            let path = shellexpand::full(&file)
                .map_err(|e| DashError::LoadingFailed(e.to_string()))?;
            Box::new(FileProvider::new(PathBuf::from(path.as_ref()))?)
        }
        None => Box::new(SampleProvider),
    };

    let mut model = Model::init(&config, provider)?;
    let controller = Controller::new(&config);
    let mut ui = TableUI::new();
    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current snapshot
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Map one input event to a Message and apply it
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    Ok(())
}
