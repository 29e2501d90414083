//! Data types for streaming availability search.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Title query handed to every searchable source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Free-text title as entered by the user
    pub title: String,
    /// Release year every result must carry, if set
    pub year: Option<u16>,
}

impl SearchQuery {
    /// Creates a query for `title`, optionally restricted to `year`.
    pub fn new(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }

    /// Whether an item with `year` passes this query's year filter.
    ///
    /// Queries without a year accept everything. Items without a year never
    /// satisfy a year-filtered query.
    pub fn accepts_year(&self, year: Option<u16>) -> bool {
        match self.year {
            Some(wanted) => year == Some(wanted),
            None => true,
        }
    }
}

/// A matched title, as reported under a service group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchItem {
    /// Source specific identifier used to fetch the detail page
    pub id: Option<String>,
    /// Display title
    pub title: String,
    /// Release year, when the source knows it
    pub year: Option<u16>,
    /// Kind of title such as "Film" or "Serie"
    #[serde(rename = "type")]
    pub category: Option<String>,
}

impl SearchItem {
    /// Item carrying only a title, as produced by catalog based sources.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            year: None,
            category: None,
        }
    }
}

/// A streaming service offering a title at flat rate.
///
/// Identity is the case-insensitive name; `id` is informational.
#[derive(Debug, Clone, Serialize)]
pub struct StreamingService {
    /// Provider identifier used by the site, if any
    pub id: Option<String>,
    /// Display name of the service
    pub name: String,
}

impl StreamingService {
    /// Creates a service entry.
    pub fn new(id: Option<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    fn identity(&self) -> String {
        self.name.to_lowercase()
    }
}

impl PartialEq for StreamingService {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for StreamingService {}

impl Hash for StreamingService {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Services offering one title, deduplicated by case-insensitive name.
///
/// Keeps the first occurrence of every name, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ServiceSet {
    seen: HashSet<StreamingService>,
    ordered: Vec<StreamingService>,
}

impl ServiceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `service` unless an entry with the same name is present.
    ///
    /// Returns `true` when the service was added.
    pub fn insert(&mut self, service: StreamingService) -> bool {
        if self.seen.insert(service.clone()) {
            self.ordered.push(service);
            true
        } else {
            false
        }
    }

    /// Services in first-insertion order.
    pub fn into_vec(self) -> Vec<StreamingService> {
        self.ordered
    }
}

impl FromIterator<StreamingService> for ServiceSet {
    fn from_iter<I: IntoIterator<Item = StreamingService>>(iter: I) -> Self {
        let mut set = Self::new();
        for service in iter {
            set.insert(service);
        }
        set
    }
}

/// One movie known to the resolver companion service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedMovie {
    /// Title as stored in the media library
    pub title: String,
    /// Release year; libraries do not always know it
    #[serde(default)]
    pub year: Option<u16>,
}

/// One streaming service's listing as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedCatalogEntry {
    /// Service the listing belongs to
    #[serde(rename = "name")]
    pub service_name: String,
    /// Movies available on the service; malformed records are dropped
    #[serde(default, deserialize_with = "lenient_movies")]
    pub movies: Vec<ResolvedMovie>,
    /// Problem the resolver had while listing this service
    #[serde(default)]
    pub error: Option<String>,
}

/// Decodes a movie list record by record, dropping records that do not
/// describe a movie.
fn lenient_movies<'de, D>(deserializer: D) -> Result<Vec<ResolvedMovie>, D::Error>
where
    D: Deserializer<'de>,
{
    let records = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(records
        .into_iter()
        .filter_map(|record| match ResolvedMovie::deserialize(&record) {
            Ok(movie) => Some(movie),
            Err(e) => {
                tracing::debug!(%record, error = %e, "Dropping malformed resolver movie");
                None
            }
        })
        .collect())
}

/// Matched items collected under one group key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceGroup {
    /// Group key, usually a streaming service name
    pub name: String,
    /// Items in source order
    pub movies: Vec<SearchItem>,
}

/// Search items grouped by key, keeping first-insertion order of keys.
///
/// A key is only ever present with at least one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedResults {
    groups: Vec<ServiceGroup>,
    index: HashMap<String, usize>,
}

impl GroupedResults {
    /// Creates empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` to the group named `name`, creating it if needed.
    pub fn push(&mut self, name: &str, item: SearchItem) {
        self.extend(name, std::iter::once(item));
    }

    /// Appends `items` to the group named `name`.
    ///
    /// An empty `items` leaves the results untouched so that no key exists
    /// without items.
    pub fn extend<I>(&mut self, name: &str, items: I)
    where
        I: IntoIterator<Item = SearchItem>,
    {
        let mut items = items.into_iter().peekable();
        if items.peek().is_none() {
            return;
        }

        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                self.groups.push(ServiceGroup {
                    name: name.to_string(),
                    movies: Vec::new(),
                });
                self.index.insert(name.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[position].movies.extend(items);
    }

    /// Group keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.name.as_str())
    }

    /// Groups in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceGroup> {
        self.groups.iter()
    }

    /// Number of group keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no group is present.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consumes the results into their groups, in insertion order.
    pub fn into_groups(self) -> Vec<ServiceGroup> {
        self.groups
    }
}

// Lookups by key are only needed by tests
#[cfg(test)]
impl GroupedResults {
    pub(crate) fn get(&self, name: &str) -> Option<&[SearchItem]> {
        self.index
            .get(name)
            .map(|&position| self.groups[position].movies.as_slice())
    }

    pub(crate) fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

impl IntoIterator for GroupedResults {
    type Item = ServiceGroup;
    type IntoIter = std::vec::IntoIter<ServiceGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl Serialize for GroupedResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.groups.serialize(serializer)
    }
}
