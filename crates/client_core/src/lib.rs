//! Client-side core for managing cities and the countries they belong to.
//!
//! The list view is driven by navigation state ([`list_sync`]), editing goes
//! through a typed form ([`form`]) and a single-flight save path
//! ([`submission`], [`editor`]), and every remote call crosses the
//! [`transport::CityApi`] seam.

pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod list_state;
pub mod list_sync;
pub mod logo;
pub mod navigation;
pub mod reconcile;
pub mod submission;
pub mod transport;

pub use config::{load_settings, load_settings_from, Settings};
pub use editor::{EditorLifetime, EditorSession, SaveOutcome};
pub use error::{CityClientError, ClientResult};
pub use form::{CityForm, CityFormInput, FormControl};
pub use list_state::ListState;
pub use list_sync::{drive, ListSnapshot, ListSynchronizer, LoadOrdering, LoadOutcome};
pub use navigation::{History, Navigator, QueryParams, RouteData};
pub use submission::{LogoFile, SaveRequest, SubmissionCoordinator};
pub use transport::{CityApi, HttpCityApi};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
