//! Typed REST client for the Spy Cat Agency backend.
//!
//! [`AgencyApi`] is the seam the query layer depends on;
//! [`HttpAgencyApi`] is its `reqwest` implementation against
//! `/api/cats`, `/api/missions` and `/api/targets`.

pub mod api;
pub mod config;
pub mod error;
pub mod http;

pub use api::AgencyApi;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::HttpAgencyApi;
