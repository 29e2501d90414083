//! Configuration for the search sources.
//!
//! Sources receive a [`SourceConfig`] when constructed and never read the
//! environment themselves.

use std::time::Duration;

/// Endpoints and transport settings shared by all sources.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the scraped directory site
    pub base_url: String,
    /// Path of the title suggestion endpoint, ending where the term goes
    pub search_path: String,
    /// Path prefix of title detail pages, ending where the id goes
    pub details_path: String,
    /// Full URL of the resolver companion service's catalog
    pub resolver_url: String,
    /// Whether the resolver source is registered at all
    pub resolver_enabled: bool,
    /// Per request timeout for every upstream call
    pub request_timeout: Duration,
    /// User agent for outbound requests
    pub user_agent: String,
    /// Whether outbound requests honour `HTTP_PROXY` and friends
    pub use_system_proxy: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.werstreamt.es".to_string(),
            search_path: "/suche/suggestTitle?term=".to_string(),
            details_path: "/film/details/".to_string(),
            resolver_url: "http://plex-resolver/movies".to_string(),
            resolver_enabled: true,
            request_timeout: Duration::from_secs(15),
            user_agent: concat!("flatrate/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

impl SourceConfig {
    /// Creates configuration from defaults with environment overrides.
    ///
    /// Recognised variables: `FLATRATE_BASE_URL`, `FLATRATE_SEARCH_PATH`,
    /// `FLATRATE_DETAILS_PATH`, `FLATRATE_RESOLVER_URL`,
    /// `FLATRATE_RESOLVER_ENABLED` and `FLATRATE_REQUEST_TIMEOUT` (seconds).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup("FLATRATE_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(search_path) = lookup("FLATRATE_SEARCH_PATH") {
            config.search_path = search_path;
        }
        if let Some(details_path) = lookup("FLATRATE_DETAILS_PATH") {
            config.details_path = details_path;
        }
        if let Some(resolver_url) = lookup("FLATRATE_RESOLVER_URL") {
            config.resolver_url = resolver_url;
        }
        if let Some(enabled) = lookup("FLATRATE_RESOLVER_ENABLED") {
            match enabled.parse() {
                Ok(enabled) => config.resolver_enabled = enabled,
                Err(_) => tracing::warn!(
                    value = %enabled,
                    "Ignoring invalid FLATRATE_RESOLVER_ENABLED"
                ),
            }
        }
        if let Some(timeout) = lookup("FLATRATE_REQUEST_TIMEOUT") {
            match timeout.parse() {
                Ok(secs) => config.request_timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!(
                    value = %timeout,
                    "Ignoring invalid FLATRATE_REQUEST_TIMEOUT"
                ),
            }
        }

        config
    }

    /// URL of the suggestion endpoint for an already encoded term.
    pub fn search_url(&self, encoded_term: &str) -> String {
        format!("{}{}{}", self.base_url, self.search_path, encoded_term)
    }

    /// URL of the detail page for a title id.
    pub fn details_url(&self, id: &str) -> String {
        format!("{}{}{}", self.base_url, self.details_path, id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_urls() {
        let config = SourceConfig::default();
        assert_eq!(
            config.search_url("Inception"),
            "https://www.werstreamt.es/suche/suggestTitle?term=Inception"
        );
        assert_eq!(
            config.details_url("46517"),
            "https://www.werstreamt.es/film/details/46517"
        );
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_env_overrides() {
        let config = SourceConfig::from_lookup(lookup_from(&[
            ("FLATRATE_BASE_URL", "http://127.0.0.1:8080/"),
            ("FLATRATE_RESOLVER_ENABLED", "false"),
            ("FLATRATE_REQUEST_TIMEOUT", "3"),
        ]));

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert!(!config.resolver_enabled);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_overrides_keep_defaults() {
        let config = SourceConfig::from_lookup(lookup_from(&[
            ("FLATRATE_RESOLVER_ENABLED", "maybe"),
            ("FLATRATE_REQUEST_TIMEOUT", "soon"),
        ]));

        assert!(config.resolver_enabled);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
    }
}
