use crate::types::location::{LatLon, Located};
use serde::{Deserialize, Serialize};

/// A city from the cities reference table.
///
/// Names are kept in both English and Russian since the table carries both and the
/// search matches on either.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct City {
    /// Row index in the cities table. The loader rejects tables where this does not hold.
    pub id: usize,
    /// ISO country code (e.g., "RU").
    pub country_code: String,
    pub country_en: String,
    pub country_ru: String,
    pub name_en: String,
    pub name_ru: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    /// Whether either name starts with `prefix`, ignoring case.
    ///
    /// `prefix` is expected to be lowercased already so that a search over many cities
    /// only lowercases it once.
    pub(crate) fn name_starts_with(&self, lowercase_prefix: &str) -> bool {
        [&self.name_ru, &self.name_en]
            .iter()
            .any(|name| name.to_lowercase().starts_with(lowercase_prefix))
    }
}

impl Located for City {
    fn location(&self) -> LatLon {
        LatLon(self.latitude, self.longitude)
    }
}
