// ── Brewery domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Brewery classification, as published by Open Brewery DB.
///
/// Parsed from the wire id case-insensitively; unknown ids resolve to
/// `None` through [`BreweryType::from_id`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BreweryType {
    Micro,
    Nano,
    Regional,
    Brewpub,
    Large,
    Planning,
    Bar,
    Contract,
    Proprietor,
    Closed,
    Taproom,
    Cidery,
    Location,
}

impl BreweryType {
    /// Look up a type from its wire id. Never fails: unknown or blank ids
    /// yield `None`.
    pub fn from_id(id: &str) -> Option<Self> {
        id.trim().parse().ok()
    }

    /// The wire id (`"micro"`, `"brewpub"`, ...).
    pub fn id(self) -> &'static str {
        self.into()
    }

    /// Human-friendly label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Micro => "Microbrewery",
            Self::Nano => "Nanobrewery",
            Self::Regional => "Regional brewery",
            Self::Brewpub => "Brewpub",
            Self::Large => "Large brewery",
            Self::Planning => "In planning",
            Self::Bar => "Bar",
            Self::Contract => "Contract brewery",
            Self::Proprietor => "Alternating proprietor",
            Self::Closed => "Closed",
            Self::Taproom => "Taproom",
            Self::Cidery => "Cidery",
            Self::Location => "Location",
        }
    }
}

/// A brewery as the rest of the app sees it.
///
/// Built once by the repository from a transport record and never mutated.
/// `id` and `name` are empty strings when the source omitted them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Brewery {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub brewery_type: Option<BreweryType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub website_url: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl Brewery {
    /// "City, State Postal, Country" with absent parts skipped.
    pub fn location_line(&self) -> Option<String> {
        let region = match (self.state_province.as_deref(), self.postal_code.as_deref()) {
            (Some(s), Some(p)) => Some(format!("{s} {p}")),
            (Some(s), None) => Some(s.to_owned()),
            (None, Some(p)) => Some(p.to_owned()),
            (None, None) => None,
        };

        let parts: Vec<String> = [self.city.clone(), region, self.country.clone()]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Latitude/longitude pair, only when both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}
