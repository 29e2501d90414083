//! HTTP request handlers organized by functionality

pub mod api;

// Re-export handler functions
pub use api::{
    ApiError, LinkLookupRequest, LookupResponse, SearchResponse, TitleSearchRequest, api_health,
    api_lookup, api_search,
};
