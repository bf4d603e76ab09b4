//! Client-side representations of backend records plus request DTOs.

pub mod breed;
pub mod mission;
pub mod spy_cat;
pub mod target;

pub use breed::{fallback_breeds, Breed};
pub use mission::{AssignCat, Mission, MissionCreate};
pub use spy_cat::{Availability, SearchResults, SpyCat, SpyCatCreate, SpyCatFilters, SpyCatStats, SpyCatUpdate};
pub use target::{Target, TargetCreate, TargetUpdate};
