//! Editable working copy of a city.

use shared::domain::{City, CityId, CityValue, CountrySummary, NewCity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl<T> {
    pub value: T,
    pub disabled: bool,
}

impl<T> FormControl<T> {
    fn enabled(value: T) -> Self {
        Self {
            value,
            disabled: false,
        }
    }

    fn disabled(value: T) -> Self {
        Self {
            value,
            disabled: true,
        }
    }
}

/// What a form can be seeded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityFormInput {
    Persisted(City),
    New(NewCity),
}

impl From<City> for CityFormInput {
    fn from(city: City) -> Self {
        Self::Persisted(city)
    }
}

impl From<NewCity> for CityFormInput {
    fn from(city: NewCity) -> Self {
        Self::New(city)
    }
}

/// Input overlaid onto the form defaults. Only the identity has a default.
struct RawCity {
    id: Option<CityId>,
    name: String,
    logo: Option<String>,
    country: Option<CountrySummary>,
}

impl RawCity {
    fn defaults() -> Self {
        Self {
            id: None,
            name: String::new(),
            logo: None,
            country: None,
        }
    }

    fn overlay(input: Option<CityFormInput>) -> Self {
        match input {
            None => Self::defaults(),
            Some(CityFormInput::Persisted(city)) => Self {
                id: Some(city.id),
                name: city.name,
                logo: city.logo,
                country: city.country,
            },
            Some(CityFormInput::New(city)) => Self {
                name: city.name,
                logo: city.logo,
                country: city.country,
                ..Self::defaults()
            },
        }
    }
}

/// The identity control is disabled in every state: identities are only ever
/// handed out by the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityForm {
    id: FormControl<Option<CityId>>,
    name: FormControl<String>,
    logo: FormControl<Option<String>>,
    country: FormControl<Option<CountrySummary>>,
}

impl Default for CityForm {
    fn default() -> Self {
        Self::build(None)
    }
}

impl CityForm {
    pub fn build(input: Option<CityFormInput>) -> Self {
        let raw = RawCity::overlay(input);
        Self {
            id: FormControl::disabled(raw.id),
            name: FormControl::enabled(raw.name),
            logo: FormControl::enabled(raw.logo),
            country: FormControl::enabled(raw.country),
        }
    }

    /// Re-seeds this form in place.
    pub fn reset(&mut self, input: CityFormInput) {
        let raw = RawCity::overlay(Some(input));
        self.id = FormControl::disabled(raw.id);
        self.name.value = raw.name;
        self.logo.value = raw.logo;
        self.country.value = raw.country;
    }

    /// Raw value including disabled controls.
    pub fn extract(&self) -> CityValue {
        match self.id.value {
            Some(id) => CityValue::Persisted(City {
                id,
                name: self.name.value.clone(),
                logo: self.logo.value.clone(),
                country: self.country.value.clone(),
            }),
            None => {
                let mut city = NewCity::new(self.name.value.clone());
                city.logo = self.logo.value.clone();
                city.country = self.country.value.clone();
                CityValue::New(city)
            }
        }
    }

    pub fn id_control(&self) -> &FormControl<Option<CityId>> {
        &self.id
    }

    pub fn name_control(&self) -> &FormControl<String> {
        &self.name
    }

    pub fn country_control(&self) -> &FormControl<Option<CountrySummary>> {
        &self.country
    }

    pub fn logo_control(&self) -> &FormControl<Option<String>> {
        &self.logo
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if !self.name.disabled {
            self.name.value = name.into();
        }
    }

    pub fn set_country(&mut self, country: Option<CountrySummary>) {
        if !self.country.disabled {
            self.country.value = country;
        }
    }

    pub fn set_logo(&mut self, logo: Option<String>) {
        if !self.logo.disabled {
            self.logo.value = logo;
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
