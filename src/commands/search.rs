use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use parser_console::api::operations::SearchOperations;
use parser_console::error::AppResult;
use parser_console::search::{SearchFilters, SearchResults, SortOrder, SuggestionFeed};
use parser_console::shell::Shell;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{interrupt_token, render};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Store name, trademark or INN
    #[arg(default_value = "")]
    query: String,

    /// Region code
    #[arg(long)]
    region: Option<String>,

    #[arg(long)]
    sales_from: Option<u64>,

    #[arg(long)]
    sales_to: Option<u64>,

    /// Registered on or after (YYYY-MM-DD)
    #[arg(long)]
    date_from: Option<NaiveDate>,

    /// Registered on or before (YYYY-MM-DD)
    #[arg(long)]
    date_to: Option<NaiveDate>,

    /// Category name, see --list-categories
    #[arg(long)]
    category: Option<String>,

    /// Collected on or after (YYYY-MM-DD)
    #[arg(long)]
    created_from: Option<NaiveDate>,

    /// Collected on or before (YYYY-MM-DD)
    #[arg(long)]
    created_to: Option<NaiveDate>,

    /// Row order: from-a, from-z, many-sales, few-sales, new-first, old-first
    #[arg(long, default_value = "from-a")]
    sort: SortOrder,

    /// Re-read the sale count of these seller ids before showing results
    #[arg(long, value_delimiter = ',')]
    refresh: Vec<i64>,

    /// Print the known category names and exit
    #[arg(long)]
    list_categories: bool,

    /// Save the results as a spreadsheet
    #[arg(long)]
    export: bool,

    /// Directory for the spreadsheet (defaults to EXPORT_DIR)
    #[arg(long)]
    dir: Option<PathBuf>,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        let mut filters = SearchFilters::with_text(self.query.clone());
        filters.region = self.region.clone();
        filters.sales_from = self.sales_from;
        filters.sales_to = self.sales_to;
        filters.category = self.category.clone();
        filters
            .set_date_from(self.date_from)
            .set_date_to(self.date_to)
            .set_created_from(self.created_from)
            .set_created_to(self.created_to);
        filters
    }
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Text to complete; omit to read lines from stdin as you type
    text: Option<String>,

    /// Region code
    #[arg(long)]
    region: Option<String>,
}

pub async fn run(shell: &Shell, args: SearchArgs) -> AppResult<()> {
    let token = shell.require_token()?;
    let client = &shell.state().client;

    if args.list_categories {
        for name in SearchOperations::distinct_categories(client, &token).await {
            println!("{}", name);
        }
        return Ok(());
    }

    let filters = args.filters();
    let mut results = SearchResults::new(SearchOperations::results(client, &token, &filters).await?);
    for seller_id in &args.refresh {
        match SearchOperations::refresh_sale_count(client, &token, *seller_id).await {
            Ok(count) => {
                if !results.apply_sale_count(*seller_id, count) {
                    tracing::info!("Seller {} is not in the current results", seller_id);
                }
                println!("Seller {}: {} sales", seller_id, count);
            }
            Err(e) => eprintln!("Seller {}: {}", seller_id, e.user_message()),
        }
    }

    results.set_order(args.sort);
    render::sellers(&results.view());

    if args.export {
        let dir = args
            .dir
            .clone()
            .unwrap_or_else(|| shell.state().config.export_dir.clone());
        let path = SearchOperations::export(client, &token, &filters, &dir).await?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

pub async fn suggest(shell: &Shell, args: SuggestArgs) -> AppResult<()> {
    let token = shell.require_token()?;
    let state = shell.state();

    if let Some(text) = args.text {
        let mut filters = SearchFilters::with_text(text);
        filters.region = args.region;
        render::suggestions(&SearchOperations::suggest(&state.client, &token, &filters).await);
        return Ok(());
    }

    let feed = SuggestionFeed::new(
        state.client.clone(),
        token,
        state.config.suggest_debounce(),
    );
    let mut suggestions = feed.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let cancel = interrupt_token();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => match line? {
                Some(text) => {
                    let mut filters = SearchFilters::with_text(text);
                    filters.region = args.region.clone();
                    feed.input(filters);
                }
                None => break,
            },
            changed = suggestions.changed() => {
                if changed.is_err() {
                    break;
                }
                render::suggestions(&suggestions.borrow_and_update());
            }
        }
    }
    Ok(())
}
