//! Aggregated search across every registered source.

use std::sync::Arc;

use futures::future::join_all;

use crate::config::SourceConfig;
use crate::errors::{MediaSearchError, SourceError};
use crate::http::HttpFetcher;
use crate::providers::{OfferListing, PlexResolver, Source, TitleSearch, WerStreamtEs};
use crate::types::{GroupedResults, SearchQuery, StreamingService};

/// Offers reported by one source for a title page.
#[derive(Debug, Clone)]
pub struct OfferLookup {
    /// Name of the source that answered
    pub source: String,
    /// Deduplicated services, or the reason the lookup failed
    pub services: Result<Vec<StreamingService>, SourceError>,
}

/// Fans queries out to registered sources and merges their answers.
///
/// Sources are queried concurrently. Merging always follows registration
/// order, so the key order of a result does not depend on which source
/// answered first.
#[derive(Debug, Clone, Default)]
pub struct MediaSearchService {
    title_sources: Vec<Arc<dyn TitleSearch>>,
    offer_sources: Vec<Arc<dyn OfferListing>>,
}

impl MediaSearchService {
    /// Creates a service without any sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the production source set.
    ///
    /// The scraped site is registered first for both capabilities; the
    /// resolver follows for title search when enabled.
    pub fn from_config(config: &SourceConfig, fetcher: HttpFetcher) -> Self {
        let site = Arc::new(WerStreamtEs::new(config.clone(), fetcher.clone()));
        let mut service = Self::new()
            .with_title_source(site.clone())
            .with_offer_source(site);

        if config.resolver_enabled {
            service = service.with_title_source(Arc::new(PlexResolver::new(config, fetcher)));
        }

        service
    }

    /// Registers a title search source after the existing ones.
    pub fn with_title_source(mut self, source: Arc<dyn TitleSearch>) -> Self {
        self.title_sources.push(source);
        self
    }

    /// Registers an offer listing source after the existing ones.
    pub fn with_offer_source(mut self, source: Arc<dyn OfferListing>) -> Self {
        self.offer_sources.push(source);
        self
    }

    /// Names of the title search sources in registration order.
    pub fn title_source_names(&self) -> Vec<&str> {
        self.title_sources.iter().map(|source| source.name()).collect()
    }

    /// Searches all sources for `query` and merges the results.
    ///
    /// Failing sources contribute nothing. Group keys of prefixing sources
    /// become `"<source>-<group>"`; equal keys from different sources have
    /// their items concatenated in registration order.
    ///
    /// # Errors
    /// - `MediaSearchError::TitleNotFound` - No source produced any match
    pub async fn search(&self, query: &SearchQuery) -> Result<GroupedResults, MediaSearchError> {
        let outcomes = join_all(
            self.title_sources
                .iter()
                .map(|source| source.search_by_title(query)),
        )
        .await;

        let mut merged = GroupedResults::new();
        for (source, outcome) in self.title_sources.iter().zip(outcomes) {
            match outcome {
                Ok(groups) => {
                    tracing::debug!(
                        source = source.name(),
                        groups = groups.len(),
                        "Source answered"
                    );
                    for group in groups {
                        merged.extend(&source.display_key(&group.name), group.movies);
                    }
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "Source failed, skipping");
                }
            }
        }

        if merged.is_empty() {
            return Err(MediaSearchError::TitleNotFound {
                title: query.title.clone(),
            });
        }

        Ok(merged)
    }

    /// Asks every offer listing source for the services on `page_url`.
    ///
    /// Returns one entry per source in registration order; failures are kept
    /// per source rather than failing the lookup.
    pub async fn lookup_offers(&self, page_url: &str) -> Vec<OfferLookup> {
        let outcomes = join_all(
            self.offer_sources
                .iter()
                .map(|source| source.list_services(page_url)),
        )
        .await;

        self.offer_sources
            .iter()
            .zip(outcomes)
            .map(|(source, services)| OfferLookup {
                source: source.name().to_string(),
                services,
            })
            .collect()
    }
}
