//! Remote city collection: the transport seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use shared::{
    domain::{City, CityId, CountrySummary, NewCity},
    error::ProblemDetails,
    protocol::{
        parse_total_count, CountryNameSearchQuery, NameSearchQuery, Page, PageRequest,
        CITIES_PATH, COUNTRIES_PATH, MULTIPART_COUNTRY, MULTIPART_ID, MULTIPART_LOGO,
        MULTIPART_NAME, TOTAL_COUNT_HEADER,
    },
};
use tracing::debug;

use crate::{
    config::Settings,
    error::{CityClientError, ClientResult},
    submission::{LogoFile, SaveRequest},
};

#[async_trait]
pub trait CityApi: Send + Sync {
    async fn query(&self, request: PageRequest) -> ClientResult<Page<City>>;
    /// `Ok(None)` when the city does not exist.
    async fn find(&self, id: CityId) -> ClientResult<Option<City>>;
    async fn query_countries(&self) -> ClientResult<Vec<CountrySummary>>;
    async fn create(&self, city: NewCity, logo: LogoFile) -> ClientResult<City>;
    async fn update_with_file(&self, city: City, logo: LogoFile) -> ClientResult<City>;
    /// Full replace; the logo is always sent cleared.
    async fn update(&self, city: City) -> ClientResult<City>;
    async fn delete(&self, id: CityId) -> ClientResult<()>;
    async fn search_by_name(&self, name: &str) -> ClientResult<Vec<City>>;
    async fn search_by_country_name(&self, country_name: &str) -> ClientResult<Vec<City>>;

    async fn submit(&self, request: SaveRequest) -> ClientResult<City> {
        match request {
            SaveRequest::Create { fields, logo } => {
                self.create(SaveRequest::new_city(&fields), logo).await
            }
            SaveRequest::PartialUpdate { id, fields, logo } => {
                let city = SaveRequest::new_city(&fields).into_persisted(id);
                self.update_with_file(city, logo).await
            }
            SaveRequest::FullReplace { city } => self.update(city).await,
        }
    }
}

pub struct HttpCityApi {
    http: Client,
    server_url: String,
    auth_token: Option<String>,
}

impl HttpCityApi {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            server_url: settings.server_url.trim_end_matches('/').to_string(),
            auth_token: settings.auth_token.clone(),
        })
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn cities_url(&self) -> String {
        format!("{}/{CITIES_PATH}", self.server_url)
    }

    fn city_url(&self, id: CityId) -> String {
        format!("{}/{CITIES_PATH}/{id}", self.server_url)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        debug!(%method, %url, "city api request");
        let builder = self.http.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn multipart_form(
    id: Option<CityId>,
    name: &str,
    country: Option<&CountrySummary>,
    logo: LogoFile,
) -> ClientResult<Form> {
    let part = Part::bytes(logo.bytes)
        .file_name(logo.file_name)
        .mime_str(&logo.mime_type)?;
    let mut form = Form::new()
        .part(MULTIPART_LOGO, part)
        .text(MULTIPART_NAME, name.to_string());
    if let Some(country) = country {
        form = form.text(MULTIPART_COUNTRY, country.id.to_string());
    }
    if let Some(id) = id {
        form = form.text(MULTIPART_ID, id.to_string());
    }
    Ok(form)
}

async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let problem = serde_json::from_str::<ProblemDetails>(&body).unwrap_or_else(|_| ProblemDetails {
        detail: (!body.is_empty()).then_some(body),
        ..ProblemDetails::default()
    });
    Err(CityClientError::status(status.as_u16(), problem))
}

#[async_trait]
impl CityApi for HttpCityApi {
    async fn query(&self, request: PageRequest) -> ClientResult<Page<City>> {
        let response = self
            .request(Method::GET, self.cities_url())
            .query(&request.query_pairs())
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let total_count = parse_total_count(
            response
                .headers()
                .get(TOTAL_COUNT_HEADER)
                .and_then(|value| value.to_str().ok()),
        );
        let items: Vec<City> = response.json().await?;
        Ok(Page { items, total_count })
    }

    async fn find(&self, id: CityId) -> ClientResult<Option<City>> {
        let response = self.request(Method::GET, self.city_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let city = ensure_success(response).await?.json().await?;
        Ok(Some(city))
    }

    async fn query_countries(&self) -> ClientResult<Vec<CountrySummary>> {
        let url = format!("{}/{COUNTRIES_PATH}", self.server_url);
        let response = self.request(Method::GET, url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn create(&self, city: NewCity, logo: LogoFile) -> ClientResult<City> {
        let form = multipart_form(None, &city.name, city.country.as_ref(), logo)?;
        let response = self
            .request(Method::POST, self.cities_url())
            .multipart(form)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn update_with_file(&self, city: City, logo: LogoFile) -> ClientResult<City> {
        let form = multipart_form(Some(city.id), &city.name, city.country.as_ref(), logo)?;
        let response = self
            .request(Method::PATCH, self.city_url(city.id))
            .multipart(form)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn update(&self, mut city: City) -> ClientResult<City> {
        city.logo = None;
        let response = self
            .request(Method::PUT, self.city_url(city.id))
            .json(&city)
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn delete(&self, id: CityId) -> ClientResult<()> {
        let response = self.request(Method::DELETE, self.city_url(id)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn search_by_name(&self, name: &str) -> ClientResult<Vec<City>> {
        let url = format!("{}/searchByName", self.cities_url());
        let response = self
            .request(Method::GET, url)
            .query(&NameSearchQuery { name })
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn search_by_country_name(&self, country_name: &str) -> ClientResult<Vec<City>> {
        let url = format!("{}/searchByCountryName", self.cities_url());
        let response = self
            .request(Method::GET, url)
            .query(&CountryNameSearchQuery { country_name })
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
