//! CLI command implementations

use clap::Subcommand;
use flatrate_search::{HttpFetcher, MediaSearchError, MediaSearchService, SearchQuery, SourceConfig};
use flatrate_web::ServerConfig;
use flatrate_web::handlers::{LookupResponse, SearchResponse};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the JSON API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Search all sources for a title and print the merged result
    Search {
        /// Title to search for
        title: String,
        /// Only accept titles released in this year
        #[arg(short, long)]
        year: Option<u16>,
    },
    /// List flat-rate services for a title detail page link
    Lookup {
        /// Detail page URL on the directory site
        url: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands, config: SourceConfig) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config)?;
    let service = MediaSearchService::from_config(&config, fetcher);

    match command {
        Commands::Serve { host, port } => start_server(ServerConfig { host, port }, service).await,
        Commands::Search { title, year } => search_title(&service, SearchQuery::new(title, year)).await,
        Commands::Lookup { url } => lookup_link(&service, &url).await,
    }
}

/// Start the API server
///
/// # Errors
/// - Address could not be bound or the server stopped with an error
pub async fn start_server(config: ServerConfig, service: MediaSearchService) -> anyhow::Result<()> {
    tracing::info!(
        sources = ?service.title_source_names(),
        "Starting Flatrate API server"
    );

    flatrate_web::run_server(config, service)
        .await
        .map_err(|e| anyhow::anyhow!("Server failed: {e}"))
}

/// Search and print results as JSON
///
/// # Errors
/// - No source found the title
pub async fn search_title(service: &MediaSearchService, query: SearchQuery) -> anyhow::Result<()> {
    match service.search(&query).await {
        Ok(results) => {
            let response = SearchResponse {
                results: results.into_groups(),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(MediaSearchError::TitleNotFound { title }) => {
            anyhow::bail!("Title not found: {title}")
        }
    }
}

/// Look up a detail page and print services per source as JSON
///
/// # Errors
/// - Output could not be serialized
pub async fn lookup_link(service: &MediaSearchService, url: &str) -> anyhow::Result<()> {
    let response: LookupResponse = service
        .lookup_offers(url)
        .await
        .into_iter()
        .map(|lookup| (lookup.source, lookup.services.ok()))
        .collect();

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
