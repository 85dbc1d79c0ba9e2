//! In-memory collaborators shared by the unit tests.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{City, CityId, CountryId, CountrySummary, NewCity},
    error::ProblemDetails,
    protocol::{Page, PageRequest},
};
use tokio::sync::{Mutex, Notify};

use crate::{
    error::{CityClientError, ClientResult},
    navigation::{Navigator, QueryParams},
    submission::LogoFile,
    transport::CityApi,
};

pub fn city(id: i64, name: &str) -> City {
    City {
        id: CityId(id),
        name: name.to_string(),
        logo: None,
        country: None,
    }
}

pub fn country(id: i64, name: &str) -> CountrySummary {
    CountrySummary {
        id: CountryId(id),
        name: Some(name.to_string()),
    }
}

pub fn server_error() -> CityClientError {
    CityClientError::status(500, ProblemDetails::default())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create { city: NewCity, logo: LogoFile },
    UpdateWithFile { city: City, logo: LogoFile },
    Update { city: City },
    Delete { id: CityId },
}

#[derive(Default)]
pub struct FakeCityApi {
    pub pages: Mutex<HashMap<u32, Page<City>>>,
    pub page_delays: Mutex<HashMap<u32, Duration>>,
    pub fail_queries: Mutex<bool>,
    pub queries: Mutex<Vec<PageRequest>>,
    pub countries: Mutex<Option<Vec<CountrySummary>>>,
    pub stored: Mutex<HashMap<CityId, City>>,
    pub calls: Mutex<Vec<ApiCall>>,
    pub fail_saves: Mutex<bool>,
    /// When set, saves wait for a notification before answering.
    pub save_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeCityApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn set_page(&self, offset: u32, items: Vec<City>, total_count: u64) {
        self.pages
            .lock()
            .await
            .insert(offset, Page { items, total_count });
    }

    pub async fn set_delay(&self, offset: u32, delay: Duration) {
        self.page_delays.lock().await.insert(offset, delay);
    }

    pub async fn set_countries(&self, countries: Vec<CountrySummary>) {
        *self.countries.lock().await = Some(countries);
    }

    async fn finish_save(&self, call: ApiCall, city: City) -> ClientResult<City> {
        let gate = self.save_gate.lock().await.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.calls.lock().await.push(call);
        if *self.fail_saves.lock().await {
            return Err(CityClientError::status(400, ProblemDetails::default()));
        }
        self.stored.lock().await.insert(city.id, city.clone());
        Ok(city)
    }
}

#[async_trait]
impl CityApi for FakeCityApi {
    async fn query(&self, request: PageRequest) -> ClientResult<Page<City>> {
        self.queries.lock().await.push(request.clone());
        let delay = self.page_delays.lock().await.get(&request.page).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_queries.lock().await {
            return Err(server_error());
        }
        Ok(self
            .pages
            .lock()
            .await
            .get(&request.page)
            .cloned()
            .unwrap_or(Page {
                items: Vec::new(),
                total_count: 0,
            }))
    }

    async fn find(&self, id: CityId) -> ClientResult<Option<City>> {
        Ok(self.stored.lock().await.get(&id).cloned())
    }

    async fn query_countries(&self) -> ClientResult<Vec<CountrySummary>> {
        self.countries.lock().await.clone().ok_or_else(server_error)
    }

    async fn create(&self, city: NewCity, logo: LogoFile) -> ClientResult<City> {
        let id = CityId(100 + self.stored.lock().await.len() as i64);
        let created = city.clone().into_persisted(id);
        self.finish_save(ApiCall::Create { city, logo }, created).await
    }

    async fn update_with_file(&self, city: City, logo: LogoFile) -> ClientResult<City> {
        self.finish_save(
            ApiCall::UpdateWithFile {
                city: city.clone(),
                logo,
            },
            city,
        )
        .await
    }

    async fn update(&self, mut city: City) -> ClientResult<City> {
        city.logo = None;
        self.finish_save(ApiCall::Update { city: city.clone() }, city)
            .await
    }

    async fn delete(&self, id: CityId) -> ClientResult<()> {
        self.calls.lock().await.push(ApiCall::Delete { id });
        self.stored.lock().await.remove(&id);
        Ok(())
    }

    async fn search_by_name(&self, name: &str) -> ClientResult<Vec<City>> {
        let needle = name.to_lowercase();
        Ok(self
            .stored
            .lock()
            .await
            .values()
            .filter(|city| city.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_by_country_name(&self, country_name: &str) -> ClientResult<Vec<City>> {
        let needle = country_name.to_lowercase();
        Ok(self
            .stored
            .lock()
            .await
            .values()
            .filter(|city| {
                city.country
                    .as_ref()
                    .and_then(|country| country.name.as_deref())
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

/// Records navigation instead of performing it.
#[derive(Default)]
pub struct RecordingNavigator {
    pub pushed: std::sync::Mutex<Vec<QueryParams>>,
    pub backs: std::sync::Mutex<u32>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pushed(&self) -> Vec<QueryParams> {
        self.pushed.lock().expect("navigator lock").clone()
    }

    pub fn backs(&self) -> u32 {
        *self.backs.lock().expect("navigator lock")
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, params: QueryParams) {
        self.pushed.lock().expect("navigator lock").push(params);
    }

    fn back(&self) {
        *self.backs.lock().expect("navigator lock") += 1;
    }
}
