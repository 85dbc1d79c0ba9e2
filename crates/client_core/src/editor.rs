//! One create/edit session for a city.

use std::sync::Arc;

use shared::domain::{City, CityValue, CountrySummary};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    form::CityForm,
    navigation::Navigator,
    reconcile::{add_to_collection_if_missing, compare_country},
    submission::{LogoFile, SaveRequest, SubmissionCoordinator},
    transport::CityApi,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(City),
    /// The editor stays open with its edits; the message is for display only.
    Failed(String),
    /// The editor was closed before the remote side answered.
    Cancelled,
}

/// Handle that ends an editor session from the outside. Closing cancels the
/// save in flight, if any.
#[derive(Clone)]
pub struct EditorLifetime {
    closed: Arc<watch::Sender<bool>>,
}

impl EditorLifetime {
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }
}

pub struct EditorSession {
    form: CityForm,
    city: Option<City>,
    countries: Vec<CountrySummary>,
    logo_file: LogoFile,
    coordinator: SubmissionCoordinator,
    navigator: Arc<dyn Navigator>,
    lifetime: EditorLifetime,
}

impl EditorSession {
    /// Opens an editor for `loaded`, or for a new city when `None`. Selectable
    /// countries are fetched once; the city's current country is always among
    /// them.
    pub async fn open(
        api: Arc<dyn CityApi>,
        navigator: Arc<dyn Navigator>,
        loaded: Option<City>,
    ) -> Self {
        let (closed, _) = watch::channel(false);
        let mut session = Self {
            form: CityForm::build(None),
            city: None,
            countries: Vec::new(),
            logo_file: LogoFile::placeholder(),
            coordinator: SubmissionCoordinator::new(Arc::clone(&api)),
            navigator,
            lifetime: EditorLifetime {
                closed: Arc::new(closed),
            },
        };
        if let Some(city) = loaded {
            session.load(city);
        }

        let fetched = match api.query_countries().await {
            Ok(countries) => countries,
            Err(err) => {
                warn!("failed to load countries for the editor: {err}");
                Vec::new()
            }
        };
        let current = session.city.as_ref().and_then(|city| city.country.clone());
        session.countries = add_to_collection_if_missing(&fetched, [current]);
        debug!(countries = session.countries.len(), "editor opened");
        session
    }

    /// Shows a freshly loaded city in the already built form. Its country
    /// joins the selectable ones if missing.
    pub fn load(&mut self, city: City) {
        self.form.reset(city.clone().into());
        self.countries = add_to_collection_if_missing(&self.countries, [city.country.clone()]);
        self.city = Some(city);
    }

    pub fn form(&self) -> &CityForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CityForm {
        &mut self.form
    }

    pub fn city(&self) -> Option<&City> {
        self.city.as_ref()
    }

    pub fn countries(&self) -> &[CountrySummary] {
        &self.countries
    }

    pub fn logo_file(&self) -> &LogoFile {
        &self.logo_file
    }

    pub fn is_saving(&self) -> bool {
        self.coordinator.is_saving()
    }

    pub fn lifetime(&self) -> EditorLifetime {
        self.lifetime.clone()
    }

    pub fn compare_country(
        &self,
        left: Option<&CountrySummary>,
        right: Option<&CountrySummary>,
    ) -> bool {
        compare_country(left, right)
    }

    /// Keeps the picked file until the next save. Nothing picked keeps the
    /// previous one.
    pub fn select_logo(&mut self, file: Option<LogoFile>) {
        if let Some(file) = file {
            debug!(file = %file.file_name, bytes = file.bytes.len(), "logo selected");
            self.logo_file = file;
        }
    }

    /// Creates or partially updates the city depending on whether it already
    /// has an identity. Leaves the editor on success.
    pub async fn save(&mut self) -> SaveOutcome {
        let request = SaveRequest::for_value(self.form.extract(), self.logo_file.clone());
        self.run(request).await
    }

    /// Replaces the persisted city with its logo removed.
    pub async fn clear_logo(&mut self) -> SaveOutcome {
        match self.form.extract() {
            CityValue::Persisted(city) => self.run(SaveRequest::clearing_logo(city)).await,
            CityValue::New(_) => SaveOutcome::Failed("a new city has no stored logo".to_string()),
        }
    }

    async fn run(&self, request: SaveRequest) -> SaveOutcome {
        let mut closed = self.lifetime.closed.subscribe();
        if *closed.borrow_and_update() {
            return SaveOutcome::Cancelled;
        }

        tokio::select! {
            result = self.coordinator.submit(request) => match result {
                Ok(city) => {
                    self.navigator.back();
                    SaveOutcome::Saved(city)
                }
                Err(err) => SaveOutcome::Failed(err.to_string()),
            },
            _ = closed.wait_for(|closed| *closed) => {
                info!("editor closed while saving; submission abandoned");
                SaveOutcome::Cancelled
            }
        }
    }

    pub fn close(self) {
        self.lifetime.close();
    }
}

#[cfg(test)]
#[path = "tests/editor_tests.rs"]
mod tests;
