use clap::Subcommand;
use parser_console::catalog::CategoryPath;
use parser_console::error::AppResult;
use parser_console::shell::Shell;
use tokio_util::sync::CancellationToken;

mod auth;
mod history;
mod parse;
mod reference;
mod render;
mod search;
mod watch;

#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Session ===
    /// Log in and store the session
    Login(auth::LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the session and the account balance
    Status,

    // === Reference data ===
    /// Browse the category tree
    Categories {
        /// Index path to list the children of, e.g. `0,1`
        #[arg(long)]
        path: Option<CategoryPath>,
    },

    /// List region codes
    Regions,

    // === Collection ===
    /// Start a collection job and wait for its result
    #[command(subcommand)]
    Parse(parse::ParseCommand),

    /// Download the spreadsheet of a finished job
    Export(parse::ExportArgs),

    // === Seller database ===
    /// Search collected sellers
    Search(search::SearchArgs),

    /// Store name suggestions, one-shot or type-ahead from stdin
    Suggest(search::SuggestArgs),

    /// Past collection runs
    History {
        /// Show the parameters of one run
        #[arg(long)]
        expand: Option<i64>,
    },

    /// Keep the balance on screen and log out when the token expires
    Watch,
}

pub async fn dispatch(shell: &Shell, command: Commands) -> AppResult<()> {
    match command {
        Commands::Login(args) => auth::login(shell, args).await,
        Commands::Logout => auth::logout(shell).await,
        Commands::Status => auth::status(shell).await,
        Commands::Categories { path } => reference::categories(shell, path),
        Commands::Regions => reference::regions(shell),
        Commands::Parse(command) => parse::run(shell, command).await,
        Commands::Export(args) => parse::export(shell, args).await,
        Commands::Search(args) => search::run(shell, args).await,
        Commands::Suggest(args) => search::suggest(shell, args).await,
        Commands::History { expand } => history::run(shell, expand).await,
        Commands::Watch => watch::run(shell).await,
    }
}

/// Token cancelled by the first Ctrl-C.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("Interrupted");
            on_interrupt.cancel();
        }
    });
    cancel
}
