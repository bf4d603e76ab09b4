//! Domain types and input validation for the Spy Cat Agency client.
//!
//! Everything in this crate is pure: no I/O, no async. The API client
//! (`sca-client`) and the query cache (`sca-query`) build on these types.

pub mod error;
pub mod models;
pub mod types;
pub mod validation;
