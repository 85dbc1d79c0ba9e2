//! Save protocol selection and the saving state around it.

use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use shared::domain::{City, CityId, CityValue, CountryId, CountrySummary, NewCity};
use tracing::{info, warn};

use crate::{
    error::{CityClientError, ClientResult},
    transport::CityApi,
};

const PLACEHOLDER_FILE_NAME: &str = "Mock.zip";
const PLACEHOLDER_MIME: &str = "application/zip";

/// Raw logo file picked by the user, held until the next save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl LogoFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Zero-length file sent when no logo was picked. The remote side keeps
    /// the stored logo when it receives an empty one.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_FILE_NAME, PLACEHOLDER_MIME, Vec::new())
    }

    pub fn is_placeholder(&self) -> bool {
        self.bytes.is_empty()
    }

    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| CityClientError::Io {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "logo".to_string());
        Ok(Self::new(file_name, mime_for_path(path), bytes))
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Scalar fields transmitted next to the logo file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityFields {
    pub name: String,
    pub country: Option<CountryId>,
}

impl CityFields {
    pub fn from_value(value: &CityValue) -> Self {
        Self {
            name: value.name().to_string(),
            country: value.country().map(|country| country.id),
        }
    }
}

/// One save invocation, decided once and handed to the transport as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    /// Multipart `POST`; the remote side assigns the identity.
    Create { fields: CityFields, logo: LogoFile },
    /// Multipart `PATCH` addressed by the existing identity.
    PartialUpdate {
        id: CityId,
        fields: CityFields,
        logo: LogoFile,
    },
    /// Structured `PUT` of the complete city with the logo cleared.
    FullReplace { city: City },
}

impl SaveRequest {
    /// Values without identity are created, persisted ones partially updated.
    pub fn for_value(value: CityValue, logo: LogoFile) -> Self {
        let fields = CityFields::from_value(&value);
        match value.id() {
            None => Self::Create { fields, logo },
            Some(id) => Self::PartialUpdate { id, fields, logo },
        }
    }

    pub fn clearing_logo(mut city: City) -> Self {
        city.logo = None;
        Self::FullReplace { city }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::PartialUpdate { .. } => "partial_update",
            Self::FullReplace { .. } => "full_replace",
        }
    }

    pub fn target(&self) -> Option<CityId> {
        match self {
            Self::Create { .. } => None,
            Self::PartialUpdate { id, .. } => Some(*id),
            Self::FullReplace { city } => Some(city.id),
        }
    }

    pub(crate) fn new_city(fields: &CityFields) -> NewCity {
        let mut city = NewCity::new(fields.name.clone());
        city.country = fields.country.map(|id| CountrySummary { id, name: None });
        city
    }
}

/// Clears the flag it was created for when dropped, whatever way the
/// submission ended.
struct SavingGuard(Arc<AtomicBool>);

impl SavingGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SubmissionCoordinator {
    api: Arc<dyn CityApi>,
    saving: Arc<AtomicBool>,
}

impl SubmissionCoordinator {
    pub fn new(api: Arc<dyn CityApi>) -> Self {
        Self {
            api,
            saving: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Shared handle on the saving flag for views that render a busy state.
    pub fn saving_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.saving)
    }

    pub async fn submit(&self, request: SaveRequest) -> ClientResult<City> {
        let _guard = SavingGuard::engage(&self.saving);
        let kind = request.kind();
        let target = request.target();
        info!(kind, ?target, "submitting city");

        let result = self.api.submit(request).await;
        match &result {
            Ok(city) => info!(kind, id = city.id.0, "city saved"),
            Err(err) => warn!(kind, ?target, "city save failed: {err}"),
        }
        result
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
