// Terminal front end for the AI product discovery backend.

mod config;
mod console_ui;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use console::style;
use discovery_client::{DiscoveryClient, SearchParams, SearchRequest, SearchSubmission};
use reconciler::{run_deep_search, DeepSearchOutcome, Outcome, PollConfig, Reconciler, Ui};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::console_ui::ConsoleUi;

#[derive(Parser)]
#[command(name = "scout", about = "Discover newly launched AI products", version)]
struct Cli {
    /// Backend base URL (overrides SCOUT_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a discovery search and follow it to completion.
    Search(SearchArgs),
    /// List historical search records.
    Records {
        /// Filter by record status.
        #[arg(long)]
        status: Option<String>,
        /// Filter by keyword substring.
        #[arg(long)]
        keyword: Option<String>,
    },
    /// List the products of one search record.
    RecordProducts { record_id: i64 },
    /// Delete a search record and its products.
    DeleteRecord { record_id: i64 },
    /// Show one product with its related posts.
    Product { product_id: i64 },
    /// Run a deep search for a product's related posts.
    DeepSearch { product_id: i64 },
    /// Show category settings.
    Categories {
        /// Reset to backend defaults first.
        #[arg(long)]
        reset: bool,
    },
    /// Print the backend's default search prompt.
    Prompt,
}

#[derive(Args)]
struct SearchArgs {
    /// Search keyword; repeat for several. Defaults to "AI app".
    #[arg(long = "keyword", value_name = "KEYWORD")]
    keywords: Vec<String>,

    /// Start of the discovery date range (YYYY-MM-DD).
    #[arg(long, default_value = "2025-06-01")]
    start_date: String,

    /// End of the discovery date range (YYYY-MM-DD).
    #[arg(long, default_value = "2025-07-01")]
    end_date: String,

    /// Restrict to a category; repeat for several.
    #[arg(long = "category", value_name = "CATEGORY")]
    categories: Vec<String>,

    /// Use this prompt instead of the backend default.
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the prompt from a file.
    #[arg(long)]
    prompt_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,reconciler=info,discovery_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env(cli.api_url).context("Failed to load configuration")?;
    let client = Arc::new(DiscoveryClient::new(&config.api_url));

    match cli.command {
        Command::Search(args) => search(client, args).await,
        Command::Records { status, keyword } => {
            let records = client
                .search_records(status.as_deref(), keyword.as_deref())
                .await
                .context("Failed to load search records")?;
            render::print_records(&records);
            Ok(())
        }
        Command::RecordProducts { record_id } => {
            let products = client
                .record_products(record_id)
                .await
                .context("Failed to load record products")?;
            if products.is_empty() {
                println!("No products stored for record {record_id}");
            }
            for product in &products {
                println!(
                    "{:>5}  {}  {}",
                    style(product.id.unwrap_or_default()).bold(),
                    style(&product.category).dim(),
                    product.name
                );
            }
            Ok(())
        }
        Command::DeleteRecord { record_id } => {
            let message = client
                .delete_record(record_id)
                .await
                .context("Failed to delete search record")?;
            println!(
                "{}",
                message.unwrap_or_else(|| format!("Deleted search record {record_id}"))
            );
            Ok(())
        }
        Command::Product { product_id } => {
            let detail = client
                .product_detail(product_id)
                .await
                .context("Failed to load product detail")?;
            render::print_product_detail(&detail.product, &detail.posts);
            Ok(())
        }
        Command::DeepSearch { product_id } => deep_search(client, product_id).await,
        Command::Categories { reset } => {
            let settings = if reset {
                client
                    .reset_categories()
                    .await
                    .context("Failed to reset categories")?
            } else {
                client
                    .categories()
                    .await
                    .context("Failed to load categories")?
            };
            render::print_categories(&settings);
            Ok(())
        }
        Command::Prompt => {
            let prompt = client
                .default_prompt()
                .await
                .context("Failed to fetch default prompt")?;
            println!("{prompt}");
            Ok(())
        }
    }
}

async fn search(client: Arc<DiscoveryClient>, args: SearchArgs) -> Result<()> {
    let prompt = match (args.prompt, args.prompt_file) {
        (Some(prompt), _) => prompt,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?,
        (None, None) => client
            .default_prompt()
            .await
            .context("Failed to fetch default prompt")?,
    };

    let keywords = if args.keywords.is_empty() {
        vec!["AI app".to_string()]
    } else {
        args.keywords
    };
    let request = SearchRequest {
        prompt,
        search_params: SearchParams {
            keywords,
            start_date: args.start_date,
            end_date: args.end_date,
            categories: args.categories,
        },
    };

    match client.start_search(&request).await? {
        SearchSubmission::RedirectToResults { message } => {
            println!("{message}");
            println!("Results for an equivalent search already exist; see `scout records`.");
            Ok(())
        }
        SearchSubmission::Started { task_id, live_url } => {
            println!("Task ID: {}", style(&task_id).bold());
            let ui = Arc::new(ConsoleUi::new());
            if let Some(url) = live_url.as_deref() {
                ui.publish_live_url(url);
            }

            let reconciler = Reconciler::new(Arc::clone(&client), PollConfig::default());
            let outcome = reconciler.run(&task_id, ui).await;

            match outcome {
                Outcome::Products { .. } | Outcome::NoResults => Ok(()),
                Outcome::TimedOut => {
                    println!("Check `scout records` later for results of task {task_id}.");
                    Ok(())
                }
                Outcome::ExecutionError(error) => {
                    anyhow::bail!("task execution failed: {error}")
                }
                Outcome::Failed => anyhow::bail!("task failed"),
                Outcome::Interrupted => anyhow::bail!("task was interrupted"),
                Outcome::Superseded => Ok(()),
            }
        }
    }
}

async fn deep_search(client: Arc<DiscoveryClient>, product_id: i64) -> Result<()> {
    let ui = ConsoleUi::new();
    let outcome = run_deep_search(
        client.as_ref(),
        product_id,
        &PollConfig::deep_search(),
        &ui,
    )
    .await
    .context("Failed to run deep search")?;

    if let DeepSearchOutcome::Completed { .. } = outcome {
        // Refresh the detail view so the new posts are visible right away.
        let detail = client
            .product_detail(product_id)
            .await
            .context("Failed to reload product detail")?;
        render::print_product_detail(&detail.product, &detail.posts);
    }
    Ok(())
}
