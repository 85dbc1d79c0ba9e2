use serde::{Deserialize, Serialize};

/// Response header carrying the total number of rows across all pages.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

pub const SORT_ASC: &str = "asc";
pub const SORT_DESC: &str = "desc";
pub const ID_PREDICATE: &str = "id";

pub const MULTIPART_LOGO: &str = "logo";
pub const MULTIPART_NAME: &str = "name";
pub const MULTIPART_COUNTRY: &str = "country";
pub const MULTIPART_ID: &str = "id";

pub const CITIES_PATH: &str = "api/cities";
pub const COUNTRIES_PATH: &str = "api/countries";

/// A zero-based page query as understood by the remote collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<String>,
}

impl PageRequest {
    /// Query pairs in wire order; `sort` is repeated once per key.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("size", self.size.to_string())];
        pairs.extend(self.sort.iter().map(|key| ("sort", key.clone())));
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Authoritative total taken from [`TOTAL_COUNT_HEADER`], independent of `items.len()`.
    pub total_count: u64,
}

/// Missing or garbled counts read as zero.
pub fn parse_total_count(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Serialize)]
pub struct NameSearchQuery<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryNameSearchQuery<'a> {
    pub country_name: &'a str,
}
