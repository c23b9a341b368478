use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use puppy_elastic::{ClientConfig, CancellationToken, ElasticClient, EntityMapping, MappingResolver};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "puppy-elastic")]
#[command(about = "Probe and query an Elasticsearch cluster")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "puppy-elastic.toml")]
    config: PathBuf,

    /// Engine URL, overrides the config file
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Index and document type the command addresses
#[derive(Args, Debug, Clone)]
struct Target {
    /// Index name
    #[arg(short, long)]
    index: String,

    /// Document type
    #[arg(short = 't', long = "type")]
    doc_type: String,
}

/// Query selection shared by search and scroll
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// simple_query_string query text
    #[arg(short, long, conflicts_with = "term")]
    pub query: Option<String>,

    /// Exact term filter as `field=value`
    #[arg(long)]
    pub term: Option<String>,

    /// Fields searched by --query
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether an index (and optionally a type) exists
    IndexExists {
        #[command(flatten)]
        target: Target,

        /// Check the document type too
        #[arg(long)]
        with_type: bool,
    },

    /// Check whether an alias exists, optionally on the target index
    AliasExists {
        alias: String,

        /// Only match the alias on this index
        #[arg(short, long)]
        index: Option<String>,
    },

    /// Fetch one document by id
    Get {
        #[command(flatten)]
        target: Target,

        id: String,

        #[arg(long)]
        routing: Option<String>,
    },

    /// Run a search and print the hits
    Search {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        query: QueryArgs,

        #[arg(long)]
        from: Option<u64>,

        #[arg(long, default_value = "10")]
        size: u64,

        #[arg(long)]
        routing: Option<String>,

        /// Also print the number of matching documents
        #[arg(long)]
        count: bool,
    },

    /// Scroll through every matching document, one JSON line per hit
    Scroll {
        #[command(flatten)]
        target: Target,

        #[command(flatten)]
        query: QueryArgs,

        /// Page size, overrides the config file
        #[arg(long)]
        size: Option<u32>,

        /// Open with search_type=scan
        #[arg(long)]
        scan: bool,
    },
}

fn init_tracing(config: &ClientConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Client whose resolver maps untyped documents to the given target
fn client_for(config: &ClientConfig, target: &Target) -> Result<ElasticClient> {
    let resolver = Arc::new(MappingResolver::new());
    resolver.register::<serde_json::Value>(EntityMapping::new(&target.index, &target.doc_type));
    ElasticClient::with_resolver(config.clone(), resolver).context("Failed to build client")
}

/// Token cancelled on Ctrl-C
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });
    token
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(url) = cli.url {
        config.url = url;
        config.validate()?;
    }
    init_tracing(&config);
    tracing::debug!("Using engine at {}", config.base_url());

    let token = interrupt_token();

    match cli.command {
        Commands::IndexExists { target, with_type } => {
            let client = client_for(&config, &target)?;
            commands::index_exists(&client, with_type, &token).await?;
        }
        Commands::AliasExists { alias, index } => {
            let target = Target {
                index: index.clone().unwrap_or_default(),
                doc_type: String::new(),
            };
            let client = client_for(&config, &target)?;
            commands::alias_exists(&client, &alias, index.is_some(), &token).await?;
        }
        Commands::Get {
            target,
            id,
            routing,
        } => {
            let client = client_for(&config, &target)?;
            commands::get(&client, &id, routing.as_deref(), &token).await?;
        }
        Commands::Search {
            target,
            query,
            from,
            size,
            routing,
            count,
        } => {
            let client = client_for(&config, &target)?;
            let mut search = commands::build_search(&query)?.size(size);
            if let Some(from) = from {
                search = search.from(from);
            }
            commands::search(&client, &search, routing, count, &token).await?;
        }
        Commands::Scroll {
            target,
            query,
            size,
            scan,
        } => {
            let client = client_for(&config, &target)?;
            let mut scroll_config = puppy_elastic::ScrollConfig::from_settings(&config.scroll)?;
            if let Some(size) = size {
                scroll_config = puppy_elastic::ScrollConfig::new(scroll_config.lifetime(), size)
                    .scan(scroll_config.is_scan());
            }
            if scan {
                scroll_config = scroll_config.scan(true);
            }
            let search = commands::build_search(&query)?;
            commands::scroll(&client, search, scroll_config, token).await?;
        }
    }

    Ok(())
}
