use std::process::ExitCode;

use clap::Parser;
use parser_console::AppState;
use parser_console::config::Config;
use parser_console::error::AppResult;
use parser_console::shell::Shell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

/// Console for the marketplace seller parser backend
#[derive(Parser, Debug)]
#[command(name = "parser-console")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(base) = cli.api_base {
        config.api_base = base.trim().trim_end_matches('/').to_string();
    }

    // logs go to stderr so tables on stdout stay clean
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(config, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, command: commands::Commands) -> AppResult<()> {
    tracing::debug!("Using backend {}", config.api_base);
    let state = AppState::from_config(config)?;
    let shell = Shell::open(state).await;
    let outcome = commands::dispatch(&shell, command).await;
    shell.shutdown();
    outcome
}
