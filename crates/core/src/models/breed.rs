use serde::{Deserialize, Serialize};

/// A cat breed offered in the recruitment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breed {
    pub id: String,
    pub name: String,
}

/// The backend has no breeds endpoint; this list is the source of truth.
pub const FALLBACK_BREEDS: &[(&str, &str)] = &[
    ("1", "Persian"),
    ("2", "Siamese"),
    ("3", "Maine Coon"),
    ("4", "British Shorthair"),
    ("5", "Ragdoll"),
    ("6", "Russian Blue"),
    ("7", "Scottish Fold"),
    ("8", "Bengal"),
    ("9", "Abyssinian"),
    ("10", "Sphynx"),
];

/// [`FALLBACK_BREEDS`] as owned [`Breed`] values.
pub fn fallback_breeds() -> Vec<Breed> {
    FALLBACK_BREEDS
        .iter()
        .map(|(id, name)| Breed {
            id: (*id).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}
