use shared::protocol::{PageRequest, ID_PREDICATE, SORT_ASC, SORT_DESC};

use crate::navigation::{QueryParams, RouteData, PAGE_PARAM, SORT_PARAM};

/// Page and ordering of a paginated list view. `page` is one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub page: u32,
    pub predicate: String,
    pub ascending: bool,
}

impl ListState {
    /// Derives the list state from the current navigation entry. Malformed
    /// values fall back to page 1 and the route's default sort.
    pub fn from_navigation(route: &RouteData, params: &QueryParams) -> Self {
        let page = params
            .get(PAGE_PARAM)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);

        let sort = params
            .get(SORT_PARAM)
            .unwrap_or(route.default_sort.as_str());
        let mut parts = sort.splitn(2, ',');
        let predicate = parts.next().unwrap_or_default().to_string();
        let ascending = parts.next() == Some(SORT_ASC);

        Self {
            page,
            predicate,
            ascending,
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.ascending {
            SORT_ASC
        } else {
            SORT_DESC
        }
    }

    /// Sort keys sent to the remote side. A non-identity predicate is always
    /// followed by the identity in the same direction so ties stay stable.
    pub fn sort_keys(&self) -> Vec<String> {
        let direction = self.direction();
        let mut keys = vec![format!("{},{direction}", self.predicate)];
        if self.predicate != ID_PREDICATE {
            keys.push(format!("{ID_PREDICATE},{direction}"));
        }
        keys
    }

    pub fn page_offset(&self) -> u32 {
        self.page.saturating_sub(1)
    }

    pub fn page_request(&self, size: u32) -> PageRequest {
        PageRequest {
            page: self.page_offset(),
            size,
            sort: self.sort_keys(),
        }
    }

    pub fn to_query_params(&self) -> QueryParams {
        QueryParams::new()
            .with(PAGE_PARAM, self.page.to_string())
            .with(
                SORT_PARAM,
                format!("{},{}", self.predicate, self.direction()),
            )
    }

    /// Column header behaviour: the active column flips direction, any other
    /// column becomes active in ascending order.
    pub fn sort_by(&mut self, predicate: &str) {
        if self.predicate == predicate {
            self.ascending = !self.ascending;
        } else {
            self.predicate = predicate.to_string();
            self.ascending = true;
        }
    }

    /// Number of pages needed for `total` rows, at least one.
    pub fn page_count(total: u64, size: u32) -> u64 {
        if size == 0 {
            return 1;
        }
        total.div_ceil(u64::from(size)).max(1)
    }
}

#[cfg(test)]
#[path = "tests/list_state_tests.rs"]
mod tests;
