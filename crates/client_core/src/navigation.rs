//! Navigation state: query strings, route data, the latest-of-both combinator
//! and an in-memory history that feeds list views.

use std::sync::Mutex;

use tokio::sync::watch;
use tracing::debug;
use url::form_urlencoded;

pub const PAGE_PARAM: &str = "page";
pub const SORT_PARAM: &str = "sort";

/// Ordered query parameters of a navigation entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts a bare query string with or without the leading `?`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_start_matches('?');
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        }
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    /// Replaces every value for `key` with a single one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.pairs.retain(|(candidate, _)| *candidate != key);
        self.pairs.push((key, value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Static data attached to a list route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteData {
    /// `field,direction` used when the query carries no sort.
    pub default_sort: String,
}

impl RouteData {
    pub fn new(default_sort: impl Into<String>) -> Self {
        Self {
            default_sort: default_sort.into(),
        }
    }
}

/// The two observed navigation sources, merged into one stream of events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    RouteData(RouteData),
    QueryParams(QueryParams),
}

impl From<RouteData> for NavigationEvent {
    fn from(route: RouteData) -> Self {
        Self::RouteData(route)
    }
}

impl From<QueryParams> for NavigationEvent {
    fn from(params: QueryParams) -> Self {
        Self::QueryParams(params)
    }
}

/// Remembers the latest value of two sources and yields the pair once both
/// have been seen, then again on every update of either side.
#[derive(Debug, Clone)]
pub struct LatestOfBoth<A, B> {
    left: Option<A>,
    right: Option<B>,
}

impl<A, B> Default for LatestOfBoth<A, B> {
    fn default() -> Self {
        Self {
            left: None,
            right: None,
        }
    }
}

impl<A: Clone, B: Clone> LatestOfBoth<A, B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_left(&mut self, value: A) -> Option<(A, B)> {
        self.left = Some(value);
        self.current()
    }

    pub fn push_right(&mut self, value: B) -> Option<(A, B)> {
        self.right = Some(value);
        self.current()
    }

    pub fn current(&self) -> Option<(A, B)> {
        Some((self.left.clone()?, self.right.clone()?))
    }
}

/// Outbound navigation used by list views and editors.
pub trait Navigator: Send + Sync {
    /// Pushes a new entry for the current route carrying `params`.
    fn navigate(&self, params: QueryParams);
    /// Returns to the previous entry.
    fn back(&self);
}

/// In-memory browsing history. Every push or pop publishes the query
/// parameters of the now current entry on a `watch` channel.
pub struct History {
    entries: Mutex<Vec<QueryParams>>,
    current: watch::Sender<QueryParams>,
}

impl History {
    pub fn new(initial: QueryParams) -> Self {
        let (current, _) = watch::channel(initial.clone());
        Self {
            entries: Mutex::new(vec![initial]),
            current,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryParams> {
        self.current.subscribe()
    }

    pub fn current(&self) -> QueryParams {
        self.current.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Navigator for History {
    fn navigate(&self, params: QueryParams) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(params.clone());
        }
        debug!(query = %params.encode(), "history push");
        self.current.send_replace(params);
    }

    fn back(&self) {
        let previous = match self.entries.lock() {
            Ok(mut entries) if entries.len() > 1 => {
                entries.pop();
                entries.last().cloned()
            }
            _ => None,
        };
        if let Some(previous) = previous {
            debug!(query = %previous.encode(), "history back");
            self.current.send_replace(previous);
        }
    }
}

#[cfg(test)]
#[path = "tests/navigation_tests.rs"]
mod tests;
