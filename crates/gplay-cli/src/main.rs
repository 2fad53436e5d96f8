mod extract;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use gplay_scraper::ReviewSort;

#[derive(Debug, Parser)]
#[command(name = "gplay")]
#[command(about = "Extract Google Play listing metadata as JSON")]
struct Cli {
    /// Interface language sent as `hl` (overrides `GPLAY_LANG`)
    #[arg(long, global = true)]
    lang: Option<String>,
    /// Store country sent as `gl` (overrides `GPLAY_COUNTRY`)
    #[arg(long, global = true)]
    country: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Full listing of one app
    Details { app_id: String },
    /// Apps matching a query
    Search {
        query: String,
        /// Stop after this many results (0 = all)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// User reviews for one or more apps
    Reviews {
        #[arg(required = true)]
        app_ids: Vec<String>,
        /// Stop after this many reviews per app (0 = all)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value_t = SortArg::Newest)]
        sort: SortArg,
        /// Reviews requested per page (1-199)
        #[arg(long, default_value_t = gplay_scraper::ReviewsEndpoint::DEFAULT_PAGE_SIZE)]
        page_size: u16,
        /// Only reviews with this star rating (1-5)
        #[arg(long)]
        score: Option<u8>,
    },
    /// Declared permissions, grouped
    Permissions { app_id: String },
    /// Data safety section: shared and collected data, security practices
    DataSafety { app_id: String },
    /// Apps listed as similar on the details page
    Similar {
        app_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortArg {
    Newest,
    Relevant,
    Rating,
}

impl From<SortArg> for ReviewSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => ReviewSort::Newest,
            SortArg::Relevant => ReviewSort::MostRelevant,
            SortArg::Rating => ReviewSort::Rating,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let mut config = gplay_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(lang) = cli.lang {
        config.locale.language = lang;
    }
    if let Some(country) = cli.country {
        config.locale.country = country;
    }

    let client = gplay_scraper::PlayClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build Play client: {e}"))?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let output = match cli.command {
        Commands::Details { app_id } => extract::details(&client, &app_id, &cancel).await?,
        Commands::Search { query, limit } => {
            extract::search(&client, &query, limit, &cancel).await?
        }
        Commands::Reviews {
            app_ids,
            limit,
            sort,
            page_size,
            score,
        } => {
            let endpoints: Vec<_> = app_ids
                .into_iter()
                .map(|id| {
                    gplay_scraper::ReviewsEndpoint::new(id)
                        .sort(sort.into())
                        .page_size(page_size)
                        .filter_score(score)
                })
                .collect();
            extract::reviews(&client, &endpoints, limit, &cancel).await?
        }
        Commands::Permissions { app_id } => {
            extract::permissions(&client, &app_id, &cancel).await?
        }
        Commands::DataSafety { app_id } => {
            extract::data_safety(&client, &app_id, &cancel).await?
        }
        Commands::Similar { app_id, limit } => {
            extract::similar(&client, &app_id, limit, &cancel).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupt received; stopping after the current page");
        cancel.cancel();
    }
}
