//! Resolver based source backed by a "known movies per service" feed.
//!
//! The companion service returns its whole catalog in one response; all
//! matching happens locally.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{Source, TitleSearch};
use crate::config::SourceConfig;
use crate::errors::SourceError;
use crate::http::HttpFetcher;
use crate::matching::is_title_match;
use crate::types::{GroupedResults, ResolvedCatalogEntry, SearchItem, SearchQuery};

/// Identifier of this source.
pub const SOURCE_NAME: &str = "plex";

/// Catalog response, either wrapped in `data` or as a bare list.
///
/// Entries are kept raw so that one malformed entry is dropped on its own.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        data: Vec<Value>,
    },
}

impl CatalogPayload {
    fn into_entries(self) -> Vec<ResolvedCatalogEntry> {
        let (Self::Bare(records) | Self::Wrapped { data: records }) = self;

        records
            .into_iter()
            .filter_map(|record| match ResolvedCatalogEntry::deserialize(&record) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(%record, error = %e, "Dropping malformed catalog entry");
                    None
                }
            })
            .collect()
    }
}

/// Source matching titles against the resolver's catalog.
///
/// Group keys are service names as reported by the resolver, prefixed with
/// [`SOURCE_NAME`] on merge.
#[derive(Debug, Clone)]
pub struct PlexResolver {
    fetcher: HttpFetcher,
    url: String,
}

impl PlexResolver {
    /// Creates the source for the catalog at `config.resolver_url`.
    pub fn new(config: &SourceConfig, fetcher: HttpFetcher) -> Self {
        Self {
            fetcher,
            url: config.resolver_url.clone(),
        }
    }

    /// Fetches the full catalog.
    ///
    /// # Errors
    /// - `SourceError::Transport` - Resolver unreachable or timed out
    /// - `SourceError::Status` - Resolver answered with an error status
    /// - `SourceError::Parse` - Body is not a catalog list or `data` object
    pub async fn fetch_catalog(&self) -> Result<Vec<ResolvedCatalogEntry>, SourceError> {
        let payload: CatalogPayload = self.fetcher.get_json(&self.url).await?;
        Ok(payload.into_entries())
    }
}

impl Source for PlexResolver {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn use_name_prefix(&self) -> bool {
        true
    }
}

#[async_trait]
impl TitleSearch for PlexResolver {
    async fn search_by_title(&self, query: &SearchQuery) -> Result<GroupedResults, SourceError> {
        let catalog = self.fetch_catalog().await?;
        Ok(match_catalog(query, &catalog))
    }
}

/// Matches `query` against every movie of every catalog entry.
///
/// A movie passes when its title fuzzy-matches and, for year-filtered
/// queries, its year is equal to the query's.
pub fn match_catalog(query: &SearchQuery, catalog: &[ResolvedCatalogEntry]) -> GroupedResults {
    let mut grouped = GroupedResults::new();

    for entry in catalog {
        if let Some(error) = &entry.error {
            tracing::warn!(
                service = %entry.service_name,
                error = %error,
                "Resolver reported an error"
            );
        }

        let matches = entry
            .movies
            .iter()
            .filter(|movie| is_title_match(&query.title, &movie.title))
            .filter(|movie| query.accepts_year(movie.year))
            .map(|movie| SearchItem {
                year: movie.year,
                ..SearchItem::titled(movie.title.clone())
            });

        grouped.extend(&entry.service_name, matches);
    }

    grouped
}
