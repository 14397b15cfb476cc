//! Movie - MediaService output
//!
//! Domain record streamed by the movies operations.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Movie record
///
/// Optional attributes stay `None` when the catalog does not know them;
/// they are never replaced by a default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Unique identifier
    pub id: String,

    /// Display title
    pub title: String,

    #[serde(default)]
    pub studio: String,

    /// Rating label (e.g., "PG-13")
    #[serde(default)]
    pub content_rating: String,

    /// Comma separated genres
    #[serde(default)]
    pub genres: String,

    #[serde(default)]
    pub tagline: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub directors: String,

    /// Comma separated cast
    #[serde(default)]
    pub roles: String,

    #[serde(default)]
    pub critics_rating: Option<f64>,

    #[serde(default)]
    pub audience_rating: Option<f64>,

    #[serde(default)]
    pub year: Option<i32>,

    #[serde(default)]
    pub release_date: Option<NaiveDate>,

    /// Running time, stored in config as whole seconds
    #[serde(rename = "duration_secs", with = "duration_secs", default)]
    pub duration: Duration,
}

impl Movie {
    /// Create a movie with only the mandatory fields set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            studio: String::new(),
            content_rating: String::new(),
            genres: String::new(),
            tagline: String::new(),
            summary: String::new(),
            directors: String::new(),
            roles: String::new(),
            critics_rating: None,
            audience_rating: None,
            year: None,
            release_date: None,
            duration: Duration::ZERO,
        }
    }

    /// Case-insensitive match against title, tagline and summary.
    ///
    /// `needle` must already be lowercase. An empty needle matches everything.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || [&self.title, &self.tagline, &self.summary]
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Whole seconds; sub-second durations are rejected rather than truncated
mod duration_secs {
    use std::time::Duration;

    use serde::{ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if value.subsec_nanos() != 0 {
            return Err(ser::Error::custom(format!(
                "duration {value:?} is not a whole number of seconds"
            )));
        }
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
