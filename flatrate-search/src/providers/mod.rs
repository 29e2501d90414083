//! Data sources for streaming availability.
//!
//! Sources implement [`TitleSearch`], [`OfferListing`] or both. The two
//! capabilities are independent; a source that cannot list offers for a
//! title page simply does not implement [`OfferListing`].

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::types::{GroupedResults, SearchQuery, StreamingService};

#[cfg(test)]
pub mod mock;
pub mod resolver;
pub mod werstreamtes;

#[cfg(test)]
pub use mock::StaticProvider;
pub use resolver::PlexResolver;
pub use werstreamtes::WerStreamtEs;

/// Identity shared by every source.
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Identifier of the source, used for link lookup keys and prefixes.
    fn name(&self) -> &str;

    /// Whether merged group keys are prefixed with [`Source::name`].
    fn use_name_prefix(&self) -> bool {
        false
    }

    /// Group key under which this source's `group` is merged.
    fn display_key(&self, group: &str) -> String {
        if self.use_name_prefix() {
            format!("{}-{group}", self.name())
        } else {
            group.to_string()
        }
    }
}

/// Sources that can search by free-text title.
#[async_trait]
pub trait TitleSearch: Source {
    /// Search for titles matching `query`, grouped by streaming service.
    ///
    /// An empty result is a successful search with no matches.
    ///
    /// # Errors
    /// - `SourceError::Transport` - Upstream unreachable or timed out
    /// - `SourceError::Status` - Upstream answered with an error status
    /// - `SourceError::Parse` - Upstream body could not be decoded
    async fn search_by_title(&self, query: &SearchQuery) -> Result<GroupedResults, SourceError>;
}

/// Sources that can list flat-rate services for a known title page.
#[async_trait]
pub trait OfferListing: Source {
    /// List deduplicated flat-rate services offered on `page_url`.
    ///
    /// # Errors
    /// - `SourceError::Transport` - Upstream unreachable or timed out
    /// - `SourceError::Status` - Upstream answered with an error status
    async fn list_services(&self, page_url: &str) -> Result<Vec<StreamingService>, SourceError>;
}
