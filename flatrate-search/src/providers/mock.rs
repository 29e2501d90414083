//! Mock provider implementation for testing.

use async_trait::async_trait;

use super::{OfferListing, Source, TitleSearch};
use crate::errors::SourceError;
use crate::types::{GroupedResults, SearchItem, SearchQuery, StreamingService};

/// Provider answering every call with canned outcomes.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    use_name_prefix: bool,
    search: Result<GroupedResults, SourceError>,
    offers: Result<Vec<StreamingService>, SourceError>,
}

impl StaticProvider {
    /// Creates a provider that finds nothing and lists no offers.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            use_name_prefix: false,
            search: Ok(GroupedResults::new()),
            offers: Ok(Vec::new()),
        }
    }

    /// Prefixes merged group keys with the provider name.
    pub fn prefixed(mut self) -> Self {
        self.use_name_prefix = true;
        self
    }

    /// Adds titles to `group` in the canned search result.
    pub fn with_group(mut self, group: &str, titles: &[&str]) -> Self {
        if let Ok(grouped) = &mut self.search {
            grouped.extend(group, titles.iter().map(|title| SearchItem::titled(*title)));
        }
        self
    }

    /// Lists `names` as offered services.
    pub fn with_offers(mut self, names: &[&str]) -> Self {
        self.offers = Ok(names
            .iter()
            .map(|name| StreamingService::new(None, *name))
            .collect());
        self
    }

    /// Makes every call fail with a transport error.
    pub fn failing(mut self) -> Self {
        let error = SourceError::Transport {
            target: format!("mock://{}", self.name),
            reason: "connection refused".to_string(),
        };
        self.search = Err(error.clone());
        self.offers = Err(error);
        self
    }
}

impl Source for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn use_name_prefix(&self) -> bool {
        self.use_name_prefix
    }
}

#[async_trait]
impl TitleSearch for StaticProvider {
    async fn search_by_title(&self, _query: &SearchQuery) -> Result<GroupedResults, SourceError> {
        self.search.clone()
    }
}

#[async_trait]
impl OfferListing for StaticProvider {
    async fn list_services(&self, _page_url: &str) -> Result<Vec<StreamingService>, SourceError> {
        self.offers.clone()
    }
}
