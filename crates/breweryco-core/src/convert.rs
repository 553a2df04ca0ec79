// ── API-to-domain type conversions ──
//
// Bridges raw `breweryco_api` records into `breweryco_core::model` types.
// Absent identity fields become empty strings; everything else stays
// optional. Nothing here can fail.

use std::collections::HashSet;

use breweryco_api::BreweryDto;

use crate::model::{Brewery, BreweryType};

impl From<BreweryDto> for Brewery {
    fn from(dto: BreweryDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            address: dto.address1,
            brewery_type: dto.brewery_type.as_deref().and_then(BreweryType::from_id),
            latitude: dto.latitude,
            longitude: dto.longitude,
            phone: dto.phone,
            website_url: dto.website_url,
            city: dto.city,
            state_province: dto.state_province,
            postal_code: dto.postal_code,
            country: dto.country,
        }
    }
}

/// Drop records whose id was already seen, keeping the first occurrence
/// and the original order. Records without an id share the empty-string
/// id, so only the first of them survives.
pub(crate) fn dedupe_by_id(records: Vec<BreweryDto>) -> Vec<BreweryDto> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone().unwrap_or_default()))
        .collect()
}

/// Dedupe then map a page of transport records.
pub(crate) fn breweries_from_page(records: Vec<BreweryDto>) -> Vec<Brewery> {
    dedupe_by_id(records).into_iter().map(Brewery::from).collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn dto(id: &str, name: &str) -> BreweryDto {
        BreweryDto {
            id: Some(id.into()),
            name: Some(name.into()),
            ..BreweryDto::default()
        }
    }

    #[test]
    fn empty_dto_maps_to_empty_identity() {
        let b = Brewery::from(BreweryDto::default());
        assert_eq!(b.id, "");
        assert_eq!(b.name, "");
        assert!(b.address.is_none());
        assert!(b.brewery_type.is_none());
        assert!(b.latitude.is_none());
        assert!(b.longitude.is_none());
        assert!(b.phone.is_none());
        assert!(b.website_url.is_none());
    }

    #[test]
    fn maps_all_fields() {
        let b = Brewery::from(BreweryDto {
            id: Some("1".into()),
            name: Some("Test Brewery".into()),
            brewery_type: Some("brewpub".into()),
            address1: Some("123 Test St".into()),
            latitude: Some(40.7128),
            longitude: Some(-74.006),
            phone: Some("555-0123".into()),
            website_url: Some("https://testbrewery1.com".into()),
            city: Some("New York".into()),
            ..BreweryDto::default()
        });
        assert_eq!(b.brewery_type, Some(BreweryType::Brewpub));
        assert_eq!(b.address.as_deref(), Some("123 Test St"));
        assert_eq!(b.website_url.as_deref(), Some("https://testbrewery1.com"));
        assert_eq!(b.coordinates(), Some((40.7128, -74.006)));
        assert_eq!(b.city.as_deref(), Some("New York"));
    }

    #[test]
    fn unknown_type_maps_to_none() {
        let b = Brewery::from(BreweryDto {
            brewery_type: Some("warp-drive".into()),
            ..BreweryDto::default()
        });
        assert!(b.brewery_type.is_none());
    }

    #[test]
    fn dedupe_keeps_first_occurrence_in_order() {
        let page = vec![dto("1", "first"), dto("2", "two"), dto("1", "second"), dto("3", "three")];
        let out = breweries_from_page(page);
        let ids: Vec<&str> = out.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(out[0].name, "first");
    }
}
