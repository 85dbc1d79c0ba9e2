use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(CityId);
id_newtype!(CountryId);

/// Anything that exposes a stable identity used as its sole equality key.
pub trait Identified {
    type Id: Copy + Eq;

    fn identity(&self) -> Self::Id;
}

/// Shallow (id, name) projection of a country. Used both as the list item of
/// the country selector and as the reference embedded in a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub id: CountryId,
    #[serde(default)]
    pub name: Option<String>,
}

impl Identified for CountrySummary {
    type Id = CountryId;

    fn identity(&self) -> CountryId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    #[serde(default)]
    pub name: String,
    /// Base64 encoded image bytes as stored remotely.
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub country: Option<CountrySummary>,
}

impl Identified for City {
    type Id = CityId;

    fn identity(&self) -> CityId {
        self.id
    }
}

/// A city that has not been assigned an identity yet. Serializes with an
/// explicit `"id": null` so the remote side can tell it apart from an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCity {
    #[serde(default, skip_deserializing, serialize_with = "serialize_absent_id")]
    id: (),
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub country: Option<CountrySummary>,
}

fn serialize_absent_id<S: serde::Serializer>(_: &(), serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_none()
}

impl NewCity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_country(mut self, country: CountrySummary) -> Self {
        self.country = Some(country);
        self
    }

    /// Attaches the identity handed out by the remote side.
    pub fn into_persisted(self, id: CityId) -> City {
        City {
            id,
            name: self.name,
            logo: self.logo,
            country: self.country,
        }
    }
}

/// Raw value of a city as held by an editor: either already persisted or
/// still waiting for its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityValue {
    Persisted(City),
    New(NewCity),
}

impl CityValue {
    pub fn id(&self) -> Option<CityId> {
        match self {
            Self::Persisted(city) => Some(city.id),
            Self::New(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Persisted(city) => &city.name,
            Self::New(city) => &city.name,
        }
    }

    pub fn country(&self) -> Option<&CountrySummary> {
        match self {
            Self::Persisted(city) => city.country.as_ref(),
            Self::New(city) => city.country.as_ref(),
        }
    }

    pub fn logo(&self) -> Option<&str> {
        match self {
            Self::Persisted(city) => city.logo.as_deref(),
            Self::New(city) => city.logo.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_city_serializes_null_id() {
        let value = serde_json::to_value(NewCity::new("Lyon")).expect("serialize");
        assert_eq!(value["id"], serde_json::Value::Null);
        assert_eq!(value["name"], "Lyon");
    }

    #[test]
    fn city_deserializes_country_projection() {
        let city: City = serde_json::from_str(
            r#"{"id":4,"name":"Porto","logo":null,"country":{"id":2,"name":"Portugal"}}"#,
        )
        .expect("deserialize");
        assert_eq!(city.id, CityId(4));
        assert_eq!(city.country.map(|c| c.id), Some(CountryId(2)));
    }

    #[test]
    fn value_reports_identity_only_when_persisted() {
        let persisted = CityValue::Persisted(NewCity::new("Oslo").into_persisted(CityId(9)));
        assert_eq!(persisted.id(), Some(CityId(9)));
        assert_eq!(CityValue::New(NewCity::new("Oslo")).id(), None);
    }
}
