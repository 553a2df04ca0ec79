// ── Screen state for the breweries list ──

use serde::Serialize;

use crate::model::{Brewery, BreweryType};

const PLACEHOLDER_PREFIX: &str = "placeholder:";

/// One row of the breweries list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BreweryUiData {
    pub key: String,
    pub name: String,
}

impl BreweryUiData {
    /// A loading row. Its name is blank and its key cannot be a brewery id.
    pub fn placeholder(index: usize) -> Self {
        Self {
            key: format!("{PLACEHOLDER_PREFIX}{index}"),
            name: String::new(),
        }
    }

    /// Rows without a name render as placeholders.
    pub fn is_placeholder(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl From<&Brewery> for BreweryUiData {
    fn from(brewery: &Brewery) -> Self {
        Self {
            key: brewery.id.clone(),
            name: brewery.name.clone(),
        }
    }
}

/// Everything the list screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BreweriesScreenState {
    pub breweries: Vec<BreweryUiData>,
}

impl BreweriesScreenState {
    pub fn last_key(&self) -> Option<&str> {
        self.breweries.last().map(|b| b.key.as_str())
    }

    pub fn real_rows(&self) -> usize {
        self.breweries.iter().filter(|b| !b.is_placeholder()).count()
    }
}

/// What the details screen shows for one brewery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreweryDetailsUiData {
    pub key: String,
    pub name: String,
    pub address: Option<String>,
    pub brewery_type: Option<BreweryType>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<(f64, f64)>,
}

impl BreweryDetailsUiData {
    pub fn type_label(&self) -> &'static str {
        self.brewery_type.map_or("Unknown", BreweryType::label)
    }
}

impl From<&Brewery> for BreweryDetailsUiData {
    fn from(brewery: &Brewery) -> Self {
        Self {
            key: brewery.id.clone(),
            name: brewery.name.clone(),
            address: brewery.address.clone(),
            brewery_type: brewery.brewery_type,
            website: brewery.website_url.clone(),
            phone: brewery.phone.clone(),
            location: brewery.location_line(),
            coordinates: brewery.coordinates(),
        }
    }
}

// ── Folding helpers ─────────────────────────────────────────────────

pub(crate) fn with_placeholders(count: usize) -> Vec<BreweryUiData> {
    (0..count).map(BreweryUiData::placeholder).collect()
}

/// Purge blank rows, then append `incoming` in order. Blank-named
/// breweries and keys already on screen are skipped.
///
/// Returns the positions in `incoming` that were appended.
pub(crate) fn fold_rows(rows: &mut Vec<BreweryUiData>, incoming: &[Brewery]) -> Vec<usize> {
    purge_placeholders(rows);

    let mut appended = Vec::new();
    for (i, brewery) in incoming.iter().enumerate() {
        if brewery.name.trim().is_empty() || rows.iter().any(|r| r.key == brewery.id) {
            continue;
        }
        rows.push(BreweryUiData::from(brewery));
        appended.push(i);
    }
    appended
}

pub(crate) fn purge_placeholders(rows: &mut Vec<BreweryUiData>) {
    rows.retain(|r| !r.is_placeholder());
}
