//! Scrape based source for the werstreamt.es directory site.
//!
//! Title search goes through the site's suggestion endpoint; streaming
//! offers are extracted from the HTML of a title's detail page.

use std::sync::LazyLock;

use async_trait::async_trait;
use futures::future::join_all;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::{OfferListing, Source, TitleSearch};
use crate::config::SourceConfig;
use crate::errors::SourceError;
use crate::http::HttpFetcher;
use crate::types::{GroupedResults, SearchItem, SearchQuery, ServiceSet, StreamingService};

/// Identifier of this source.
pub const SOURCE_NAME: &str = "werstreamt.es";

/// Prefix of suggestion keys that carry a title id.
const ID_KEY_PREFIX: &str = "id-";

static PROVIDER_ENTRY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".provider").expect("static selector"));
static PROVIDER_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.left").expect("static selector"));
static FLATRATE_MARKER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("i.fi-check").expect("static selector"));
static LABEL_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("static selector"));

/// Source scraping werstreamt.es.
#[derive(Debug, Clone)]
pub struct WerStreamtEs {
    fetcher: HttpFetcher,
    config: SourceConfig,
}

impl WerStreamtEs {
    /// Creates the source for the site at `config.base_url`.
    pub fn new(config: SourceConfig, fetcher: HttpFetcher) -> Self {
        Self { fetcher, config }
    }

    /// List flat-rate services for the title with site id `id`.
    ///
    /// # Errors
    /// - `SourceError::Transport` - Detail page unreachable or timed out
    /// - `SourceError::Status` - Detail page answered with an error status
    pub async fn list_services_by_id(
        &self,
        id: &str,
    ) -> Result<Vec<StreamingService>, SourceError> {
        self.list_services(&self.config.details_url(id)).await
    }
}

impl Source for WerStreamtEs {
    fn name(&self) -> &str {
        SOURCE_NAME
    }
}

#[async_trait]
impl OfferListing for WerStreamtEs {
    async fn list_services(&self, page_url: &str) -> Result<Vec<StreamingService>, SourceError> {
        let body = self.fetcher.get_text(page_url).await?;
        Ok(parse_offers(&body))
    }
}

#[async_trait]
impl TitleSearch for WerStreamtEs {
    async fn search_by_title(&self, query: &SearchQuery) -> Result<GroupedResults, SourceError> {
        let url = self.config.search_url(&urlencoding::encode(&query.title));
        let body: Value = self.fetcher.get_json(&url).await?;

        let items: Vec<SearchItem> = parse_suggestions(&url, &body)?
            .into_iter()
            .filter(|item| query.accepts_year(item.year))
            .collect();

        tracing::debug!(
            title = %query.title,
            candidates = items.len(),
            "Resolving streaming offers for suggestions"
        );

        // Detail pages are independent; one failing does not affect the others
        let lookups = items.into_iter().filter_map(|item| {
            let id = item.id.clone()?;
            Some(async move {
                let services = self.list_services_by_id(&id).await;
                (item, services)
            })
        });

        let mut grouped = GroupedResults::new();
        for (item, services) in join_all(lookups).await {
            match services {
                Ok(services) => {
                    for service in services {
                        grouped.push(&service.name, item.clone());
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        title = %item.title,
                        error = %e,
                        "Dropping suggestion without offers"
                    );
                }
            }
        }

        Ok(grouped)
    }
}

/// Extracts flat-rate services from a title detail page.
///
/// The site always renders a header entry as the first `.provider` element;
/// it is skipped by position. Entries without a name anchor, without the
/// flat-rate check marker or with unreadable `data-options` are dropped.
pub fn parse_offers(html: &str) -> Vec<StreamingService> {
    let document = Html::parse_document(html);

    document
        .select(&PROVIDER_ENTRY)
        .skip(1)
        .filter_map(parse_offer)
        .collect::<ServiceSet>()
        .into_vec()
}

fn parse_offer(element: ElementRef<'_>) -> Option<StreamingService> {
    let anchor = element.select(&PROVIDER_NAME).next()?;

    // Names may carry a technical code on a second line, e.g. "Sky Go\nsky"
    let text: String = anchor.text().collect();
    let name = text.trim().lines().next()?.trim();
    if name.is_empty() {
        return None;
    }

    if element.select(&FLATRATE_MARKER).next().is_none() {
        tracing::debug!(service = %name, "Skipping offer that is not flat rate");
        return None;
    }

    let options = element.value().attr("data-options").unwrap_or("{}");
    match provider_id(options) {
        Ok(id) => Some(StreamingService::new(id, name)),
        Err(e) => {
            tracing::warn!(
                service = %name,
                error = %e,
                "Skipping offer with malformed data-options"
            );
            None
        }
    }
}

/// Reads `StreamProviderID` from a `data-options` JSON document.
fn provider_id(options: &str) -> Result<Option<String>, serde_json::Error> {
    let options: Value = serde_json::from_str(options)?;
    Ok(match options.get("StreamProviderID") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(other) => Some(other.to_string()),
    })
}

/// Turns a suggestion endpoint response into search items.
///
/// Only `id-<identifier>` keys are considered; incomplete entries are
/// dropped. An empty JSON array is how the endpoint reports no suggestions.
///
/// # Errors
/// - `SourceError::Parse` - Body is neither an object nor an array
pub fn parse_suggestions(target: &str, body: &Value) -> Result<Vec<SearchItem>, SourceError> {
    let entries = match body {
        Value::Object(entries) => entries,
        Value::Array(_) => return Ok(Vec::new()),
        other => {
            return Err(SourceError::Parse {
                target: target.to_string(),
                reason: format!("unexpected suggestion payload: {other}"),
            });
        }
    };

    Ok(entries
        .iter()
        .filter_map(|(key, value)| {
            let item = parse_suggestion(key, value);
            if item.is_none() && key.starts_with(ID_KEY_PREFIX) {
                tracing::debug!(key = %key, "Dropping incomplete suggestion");
            }
            item
        })
        .collect())
}

fn parse_suggestion(key: &str, value: &Value) -> Option<SearchItem> {
    let id = key.strip_prefix(ID_KEY_PREFIX)?;
    let title = value.get("value")?.as_str()?;
    let label = value.get("label")?.as_str()?;
    let (category, year) = parse_label(label)?;

    Some(SearchItem {
        id: Some(id.to_string()),
        title: title.to_string(),
        year,
        category,
    })
}

/// Recovers category and year from a suggestion label.
///
/// The label is an HTML fragment whose first `span` holds either
/// `"<category>, <year>"` or just `"<category>"`. Returns `None` when the
/// span is missing or the year is not a number.
pub fn parse_label(label: &str) -> Option<(Option<String>, Option<u16>)> {
    let fragment = Html::parse_fragment(label);
    let span = fragment.select(&LABEL_SPAN).next()?;
    let text: String = span.text().collect();
    let parts: Vec<&str> = text.trim().split(", ").collect();

    let (category, year) = match parts.as_slice() {
        [category, year] => (*category, Some(year.trim().parse::<u16>().ok()?)),
        [category, ..] => (*category, None),
        [] => return None,
    };

    let category = category
        .split('\n')
        .next_back()
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string);

    Some((category, year))
}
