use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use parser_console::api::operations::{CategoryOperations, ExportOutcome};
use parser_console::catalog::CategoryPath;
use parser_console::error::{AppError, AppResult};
use parser_console::filters::{ParseFilters, ParseFlow};
use parser_console::jobs::{JobPhase, JobWorkflow};
use parser_console::shell::Shell;

use super::{interrupt_token, render};

#[derive(Subcommand, Debug)]
pub enum ParseCommand {
    /// Collect the sellers of one (sub)category
    Subcategory {
        /// Index path of the category, e.g. `0,1`
        #[arg(long)]
        path: CategoryPath,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Collect the sellers of every subcategory under a top-level category
    Catalog {
        /// Index of the top-level category
        #[arg(long)]
        root: usize,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Region codes, comma separated
    #[arg(short, long = "region", value_delimiter = ',')]
    regions: Vec<String>,

    /// Minimum sale count
    #[arg(long, default_value_t = 0)]
    min_sales: u64,

    /// Maximum sale count
    #[arg(long)]
    max_sales: Option<u64>,

    /// Registered on or after (YYYY-MM-DD)
    #[arg(long)]
    reg_date: Option<NaiveDate>,

    /// Registered on or before (YYYY-MM-DD)
    #[arg(long)]
    max_reg_date: Option<NaiveDate>,

    /// Result pages to read upstream (1-50)
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Row limit, 0 for none (clamped to 0-1000)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    limit: i64,

    /// Read the listing directly instead of through a background job
    #[arg(long)]
    direct: bool,

    /// Save the spreadsheet afterwards
    #[arg(long)]
    export: bool,

    /// Directory for the spreadsheet (defaults to EXPORT_DIR)
    #[arg(long)]
    dir: Option<PathBuf>,
}

impl FilterArgs {
    fn apply(&self, mut filters: ParseFilters) -> ParseFilters {
        filters.regions = self.regions.clone();
        filters.min_sales = self.min_sales;
        filters.max_sales = self.max_sales;
        filters.reg_date = self.reg_date;
        filters.max_reg_date = self.max_reg_date;
        filters.pages = self.pages;
        filters.set_limit(self.limit);
        filters
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FlowArg {
    Subcategory,
    Catalog,
}

impl From<FlowArg> for ParseFlow {
    fn from(flow: FlowArg) -> Self {
        match flow {
            FlowArg::Subcategory => ParseFlow::Subcategory,
            FlowArg::Catalog => ParseFlow::Catalog,
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Which parser the job was started from
    flow: FlowArg,

    /// Job id printed when the job was submitted
    job_id: String,

    /// Target directory (defaults to EXPORT_DIR)
    #[arg(long)]
    dir: Option<PathBuf>,
}

pub async fn run(shell: &Shell, command: ParseCommand) -> AppResult<()> {
    let token = shell.require_token()?;
    let state = shell.state();
    let (filters, args) = match command {
        ParseCommand::Subcategory { path, filters: args } => {
            (args.apply(ParseFilters::subcategory(path)), args)
        }
        ParseCommand::Catalog { root, filters: args } => {
            (args.apply(ParseFilters::catalog(root)), args)
        }
    };
    filters.validate(&state.catalog, &state.regions)?;
    let dir = args.dir.clone().unwrap_or_else(|| state.config.export_dir.clone());

    if let Some(key) = filters.lookup_key(&state.catalog) {
        match CategoryOperations::last_collected(&state.client, &token, &key).await {
            Some(at) => println!("Last collected with these filters: {}", render::timestamp(at)),
            None => println!("No earlier collection with these filters"),
        }
    }

    if args.direct {
        if filters.flow() != Some(ParseFlow::Subcategory) {
            return Err(AppError::Validation(
                "direct listing is only available for a single category".into(),
            ));
        }
        let query = filters.listing_query(&state.catalog)?;
        let sellers = CategoryOperations::list_sellers(&state.client, &token, &query).await?;
        render::sellers(&sellers);
        if args.export {
            let path = CategoryOperations::export(&state.client, &token, &query, &dir).await?;
            println!("Saved {}", path.display());
        }
        return Ok(());
    }

    let workflow = JobWorkflow::new(state, token);
    let mut phases = workflow.subscribe();
    let progress = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = phases.borrow_and_update().clone();
            render::phase(&phase);
            if phase.is_done() {
                break;
            }
        }
    });

    let cancel = interrupt_token();
    let outcome = workflow.run(&filters, &cancel).await;
    progress.abort();
    if let JobPhase::Cancelled {
        job_id: Some(job_id),
    } = workflow.phase()
    {
        eprintln!("Stopped waiting for job {}, export it later with its id", job_id);
    }
    let job = outcome?;

    render::sellers(&job.sellers);
    if args.export {
        report_export(workflow.export(job.flow, &job.job_id, &dir).await?, &job.job_id);
    }
    Ok(())
}

pub async fn export(shell: &Shell, args: ExportArgs) -> AppResult<()> {
    let token = shell.require_token()?;
    let dir = args
        .dir
        .unwrap_or_else(|| shell.state().config.export_dir.clone());
    let workflow = JobWorkflow::new(shell.state(), token);
    let outcome = workflow.export(args.flow.into(), &args.job_id, &dir).await?;
    report_export(outcome, &args.job_id);
    Ok(())
}

fn report_export(outcome: ExportOutcome, job_id: &str) {
    match outcome {
        ExportOutcome::Saved(path) => println!("Saved {}", path.display()),
        ExportOutcome::StillBuilding => println!(
            "The report for job {} is still being built, run `export` again shortly",
            job_id
        ),
    }
}
