use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{CityClientError, ClientResult};

/// Image source for a stored logo payload.
pub fn logo_data_uri(payload: &str) -> String {
    format!("data:image/jpeg;base64,{payload}")
}

/// First `max_chars` characters of the data URI, for one-line listings.
pub fn logo_preview(payload: &str, max_chars: usize) -> String {
    logo_data_uri(payload).chars().take(max_chars).collect()
}

pub fn decode_logo(payload: &str) -> ClientResult<Vec<u8>> {
    STANDARD
        .decode(payload.trim())
        .map_err(|e| CityClientError::InvalidLogo(e.to_string()))
}
