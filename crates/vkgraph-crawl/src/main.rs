//! CLI entry point for vkgraph.
//!
//! `fetch` writes one user's raw data to a JSON file, `crawl` walks the
//! follower graph into Neo4j, and `query` runs a canned report against it.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use vkgraph_core::Settings;
use vkgraph_crawl::snapshot;
use vkgraph_crawl::traversal::{self, CrawlOptions};
use vkgraph_crawl::VkClient;
use vkgraph_graph::{CannedQuery, GraphClient, GraphConfig};

#[derive(Parser)]
#[command(name = "vkgraph")]
#[command(about = "Fetch VK profiles and crawl their follower graph into Neo4j")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: vkgraph).
    #[arg(short, long, default_value = "vkgraph", global = true)]
    config: String,

    /// Environment file to load instead of ./.env.
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Save a user's profile, followers, and subscriptions to a JSON file.
    Fetch {
        /// VK user id or screen name.
        #[arg(long, alias = "user_id")]
        user_id: String,

        /// File name inside the output directory (default: output_<id>.json).
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Crawl the follower/subscription graph into Neo4j.
    Crawl {
        /// VK user id or screen name to start from.
        #[arg(long, alias = "user_id")]
        user_id: String,

        /// Recursion depth (default: crawl.depth, 2).
        #[arg(short, long)]
        depth: Option<u32>,

        /// Expand each user at most once.
        #[arg(long)]
        dedupe: bool,
    },
    /// Run a canned report: total_users, total_groups, top_5_users,
    /// top_5_groups, mutual_followers.
    Query {
        name: CannedQuery,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config, cli.env_file.as_deref())?;
    init_tracing(cli.log_json);

    match cli.command {
        Command::Fetch { user_id, output } => run_fetch(&settings, &user_id, output).await,
        Command::Crawl {
            user_id,
            depth,
            dedupe,
        } => {
            let options = CrawlOptions {
                depth: depth.unwrap_or(settings.crawl.depth),
                dedupe: dedupe || settings.crawl.dedupe,
            };
            run_crawl(&settings, &user_id, &options).await
        }
        Command::Query { name } => run_query(&settings, name).await,
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn run_fetch(
    settings: &Settings,
    user_id: &str,
    output: Option<String>,
) -> anyhow::Result<()> {
    let token = settings.vk.token()?;
    let vk = VkClient::from_settings(token, &settings.vk)?;
    let file_name = output.unwrap_or_else(|| snapshot::default_file_name(user_id));

    tracing::info!(user_id, "Fetching user data");
    let path =
        snapshot::export_snapshot(&vk, user_id, Path::new(&settings.output.dir), &file_name)
            .await?;
    println!("{}", path.display());
    Ok(())
}

async fn run_crawl(
    settings: &Settings,
    user_id: &str,
    options: &CrawlOptions,
) -> anyhow::Result<()> {
    let token = settings.vk.token()?;
    let vk = VkClient::from_settings(token, &settings.vk)?;
    let graph = GraphClient::connect(&GraphConfig::from(&settings.neo4j)).await?;

    let result = traversal::crawl(&vk, &graph, user_id, options).await;
    if let Err(e) = &result {
        tracing::error!(user_id, error = %e, "Crawl aborted");
    }
    graph.close();

    result?;
    Ok(())
}

async fn run_query(settings: &Settings, canned: CannedQuery) -> anyhow::Result<()> {
    let graph = GraphClient::connect(&GraphConfig::from(&settings.neo4j)).await?;

    let result = graph.run_canned(canned).await;
    graph.close();

    let report = result?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
