//! Spy cat (agent) entity model and DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{timestamp, DbId, Timestamp};

/// An agent as returned by `/api/cats/`.
///
/// Mission counters and `success_rate` are computed by the server and are
/// read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpyCat {
    pub id: DbId,
    pub name: String,
    pub years_of_experience: i32,
    pub breed: String,
    pub salary: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub active_missions_count: i64,
    #[serde(default)]
    pub total_missions_count: i64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// DTO for recruiting a new agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SpyCatCreate {
    #[validate(custom(function = "crate::validation::rules::check_agent_name"))]
    pub name: String,
    #[validate(custom(function = "crate::validation::rules::check_experience"))]
    pub years_of_experience: i32,
    #[validate(custom(function = "crate::validation::rules::check_breed"))]
    pub breed: String,
    #[validate(custom(function = "crate::validation::rules::check_salary"))]
    pub salary: f64,
}

/// DTO for updating an agent. Salary is the only mutable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SpyCatUpdate {
    #[validate(custom(function = "crate::validation::rules::check_salary"))]
    pub salary: f64,
}

/// Response body of `/api/cats/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub cats: Vec<SpyCat>,
    pub query: String,
    pub total_results: i64,
}

/// Aggregate agency statistics from `/api/cats/statistics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpyCatStats {
    pub total_cats: i64,
    pub cats_with_active_missions: i64,
    pub available_cats: i64,
    pub average_experience: f64,
    pub average_salary: f64,
    #[serde(default)]
    pub most_common_breed: Option<String>,
    #[serde(default)]
    pub success_rate: Option<f64>,
}

/// Availability filter for agent listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Busy,
    All,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::All => "all",
        }
    }
}

/// Optional filters for `GET /api/cats/`. Unset fields are omitted from
/// the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SpyCatFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Experience cannot be negative"))]
    pub experience_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 30, message = "Maximum experience is 30 years"))]
    pub experience_max: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
}

impl SpyCatFilters {
    /// The filters as `(name, value)` query pairs, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        if let Some(breed) = &self.breed {
            pairs.push(("breed", breed.clone()));
        }
        if let Some(v) = self.experience_min {
            pairs.push(("experience_min", v.to_string()));
        }
        if let Some(v) = self.experience_max {
            pairs.push(("experience_max", v.to_string()));
        }
        if let Some(v) = self.salary_min {
            pairs.push(("salary_min", v.to_string()));
        }
        if let Some(v) = self.salary_max {
            pairs.push(("salary_max", v.to_string()));
        }
        if let Some(v) = self.availability {
            pairs.push(("availability", v.as_str().to_string()));
        }
        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}
