//! Terminal rendering of the agency overview.

pub mod report;
