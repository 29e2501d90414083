//! Flatrate Search - Streaming availability aggregation

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Finds which streaming services carry a title at flat rate by querying a
//! scraped directory site and a resolver companion service, fuzzy matching
//! their answers against the query and merging them into one keyed result.

pub mod config;
pub mod errors;
pub mod http;
pub mod matching;
pub mod providers;
pub mod service;
pub mod types;

// Re-export main types
pub use config::SourceConfig;
pub use errors::{MediaSearchError, SourceError};
pub use http::HttpFetcher;
pub use providers::{OfferListing, PlexResolver, Source, TitleSearch, WerStreamtEs};
pub use service::{MediaSearchService, OfferLookup};
pub use types::{
    GroupedResults, ResolvedCatalogEntry, ResolvedMovie, SearchItem, SearchQuery, ServiceGroup,
    StreamingService,
};

/// Convenience type alias for Results with MediaSearchError.
pub type Result<T> = std::result::Result<T, MediaSearchError>;
