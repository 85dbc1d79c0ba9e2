//! Keeps a paginated city list in sync with navigation state.
//!
//! Navigation (route data and query parameters) is the single source of
//! truth: every change is parsed into a [`ListState`] and triggers a load, and
//! every page or sort change made by the user is pushed back as a new
//! navigation entry through [`ListSynchronizer::transition`].
//!
//! Loads are sequence stamped. With [`LoadOrdering::Sequenced`] only the
//! response to the most recently issued load may touch rows and totals, so a
//! slow older response can no longer overwrite a newer one.

use std::sync::Arc;

use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use shared::{
    domain::{City, CityId},
    protocol::{Page, PageRequest},
};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    error::ClientResult,
    list_state::ListState,
    navigation::{LatestOfBoth, NavigationEvent, Navigator, QueryParams, RouteData},
    transport::CityApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOrdering {
    /// Responses to superseded loads are discarded.
    #[default]
    Sequenced,
    /// Every response is applied in arrival order.
    Unsequenced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    Stale,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    pub state: Option<ListState>,
    pub rows: Option<Vec<City>>,
    pub total_items: u64,
    pub is_loading: bool,
}

pub struct ListSynchronizer {
    api: Arc<dyn CityApi>,
    navigator: Arc<dyn Navigator>,
    items_per_page: u32,
    ordering: LoadOrdering,
    navigation: LatestOfBoth<RouteData, QueryParams>,
    state: Option<ListState>,
    rows: Option<Vec<City>>,
    total_items: u64,
    is_loading: bool,
    last_issued: u64,
}

impl ListSynchronizer {
    pub fn new(api: Arc<dyn CityApi>, navigator: Arc<dyn Navigator>, items_per_page: u32) -> Self {
        Self {
            api,
            navigator,
            items_per_page,
            ordering: LoadOrdering::default(),
            navigation: LatestOfBoth::new(),
            state: None,
            rows: None,
            total_items: 0,
            is_loading: false,
            last_issued: 0,
        }
    }

    pub fn with_ordering(mut self, ordering: LoadOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn state(&self) -> Option<&ListState> {
        self.state.as_ref()
    }

    pub fn rows(&self) -> Option<&[City]> {
        self.rows.as_deref()
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            state: self.state.clone(),
            rows: self.rows.clone(),
            total_items: self.total_items,
            is_loading: self.is_loading,
        }
    }

    /// Stable per-row key.
    pub fn track_identity(city: &City) -> CityId {
        city.id
    }

    /// Feeds one navigation source. Once both sources were observed the list
    /// state is recomputed and a load is issued.
    pub fn on_navigation(&mut self, event: NavigationEvent) -> Option<LoadTicket> {
        let (route, params) = match event {
            NavigationEvent::RouteData(data) => self.navigation.push_left(data),
            NavigationEvent::QueryParams(params) => self.navigation.push_right(params),
        }?;
        let state = ListState::from_navigation(&route, &params);
        debug!(
            page = state.page,
            predicate = %state.predicate,
            ascending = state.ascending,
            "list state derived from navigation"
        );
        self.state = Some(state);
        self.begin_load()
    }

    /// Marks the list as loading and stamps a new load. `None` until the list
    /// state is known.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        let request = self.state.as_ref()?.page_request(self.items_per_page);
        self.last_issued += 1;
        self.is_loading = true;
        info!(
            seq = self.last_issued,
            page = request.page,
            size = request.size,
            sort = ?request.sort,
            "loading cities"
        );
        Some(LoadTicket {
            seq: self.last_issued,
            request,
        })
    }

    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: ClientResult<Page<City>>,
    ) -> LoadOutcome {
        if self.ordering == LoadOrdering::Sequenced && ticket.seq != self.last_issued {
            debug!(
                seq = ticket.seq,
                latest = self.last_issued,
                "dropping superseded list response"
            );
            return LoadOutcome::Stale;
        }

        self.is_loading = false;
        match result {
            Ok(page) => {
                debug!(
                    seq = ticket.seq,
                    rows = page.items.len(),
                    total = page.total_count,
                    "cities loaded"
                );
                self.total_items = page.total_count;
                self.rows = Some(page.items);
                LoadOutcome::Applied
            }
            Err(err) => {
                warn!(seq = ticket.seq, "failed to load cities: {err}");
                LoadOutcome::Failed
            }
        }
    }

    /// Issues a load for the current state and waits for it.
    pub async fn load(&mut self) -> Option<LoadOutcome> {
        let ticket = self.begin_load()?;
        let result = self.api.query(ticket.request.clone()).await;
        Some(self.complete_load(ticket, result))
    }

    /// [`Self::on_navigation`] followed by the load it triggers.
    pub async fn handle_navigation(&mut self, event: NavigationEvent) -> Option<LoadOutcome> {
        let ticket = self.on_navigation(event)?;
        let result = self.api.query(ticket.request.clone()).await;
        Some(self.complete_load(ticket, result))
    }

    /// Pushes the current page and sort as a new navigation entry.
    pub fn transition(&self) {
        if let Some(state) = &self.state {
            let params = state.to_query_params();
            debug!(query = %params.encode(), "list transition");
            self.navigator.navigate(params);
        }
    }

    pub fn go_to_page(&mut self, page: u32) {
        if let Some(state) = &mut self.state {
            state.page = page.max(1);
        }
        self.transition();
    }

    pub fn sort_by(&mut self, predicate: &str) {
        if let Some(state) = &mut self.state {
            state.sort_by(predicate);
        }
        self.transition();
    }

    /// Deletes a city and reloads the current page.
    pub async fn delete(&mut self, id: CityId) -> ClientResult<Option<LoadOutcome>> {
        self.api.delete(id).await?;
        info!(id = id.0, "city deleted");
        Ok(self.load().await)
    }
}

type InFlightLoad = BoxFuture<'static, (LoadTicket, ClientResult<Page<City>>)>;

fn issue(api: &Arc<dyn CityApi>, ticket: LoadTicket) -> InFlightLoad {
    let api = Arc::clone(api);
    async move {
        let result = api.query(ticket.request.clone()).await;
        (ticket, result)
    }
    .boxed()
}

/// Runs a synchronizer against two observed navigation sources. Loads are
/// kept in flight concurrently; their completions go through the ticket rules
/// of the synchronizer. A snapshot is published after every step. Returns once
/// both sources are closed and no load is pending.
pub async fn drive(
    mut sync: ListSynchronizer,
    mut route_rx: watch::Receiver<RouteData>,
    mut query_rx: watch::Receiver<QueryParams>,
    snapshots: watch::Sender<ListSnapshot>,
) -> ListSynchronizer {
    let api = Arc::clone(&sync.api);
    let mut in_flight: FuturesUnordered<InFlightLoad> = FuturesUnordered::new();

    let initial = [
        NavigationEvent::RouteData(route_rx.borrow_and_update().clone()),
        NavigationEvent::QueryParams(query_rx.borrow_and_update().clone()),
    ];
    for event in initial {
        if let Some(ticket) = sync.on_navigation(event) {
            in_flight.push(issue(&api, ticket));
        }
    }
    snapshots.send_replace(sync.snapshot());

    let mut route_open = true;
    let mut query_open = true;
    loop {
        let event = tokio::select! {
            changed = route_rx.changed(), if route_open => match changed {
                Ok(()) => Some(NavigationEvent::RouteData(route_rx.borrow_and_update().clone())),
                Err(_) => {
                    route_open = false;
                    None
                }
            },
            changed = query_rx.changed(), if query_open => match changed {
                Ok(()) => Some(NavigationEvent::QueryParams(query_rx.borrow_and_update().clone())),
                Err(_) => {
                    query_open = false;
                    None
                }
            },
            Some((ticket, result)) = in_flight.next(), if !in_flight.is_empty() => {
                sync.complete_load(ticket, result);
                None
            }
            else => break,
        };

        if let Some(ticket) = event.and_then(|event| sync.on_navigation(event)) {
            in_flight.push(issue(&api, ticket));
        }
        snapshots.send_replace(sync.snapshot());
    }

    sync
}

#[cfg(test)]
#[path = "tests/list_sync_tests.rs"]
mod tests;
