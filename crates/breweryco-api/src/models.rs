// Open Brewery DB response types
//
// Every field is optional: the API omits or nulls fields freely, and the
// domain mapping in `breweryco-core` decides what an absent value means.

use serde::{Deserialize, Deserializer, Serialize};

/// A brewery record exactly as served by `GET /v1/breweries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreweryDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Wire id of the brewery type (`"micro"`, `"brewpub"`, ...).
    #[serde(default)]
    pub brewery_type: Option<String>,
    #[serde(default, rename = "address_1")]
    pub address1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state_province: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
}

/// Coordinates have been served both as JSON numbers and as numeric
/// strings. Accept either; anything unparseable becomes `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(f64),
        Str(String),
    }

    Ok(
        match Option::<NumOrString>::deserialize(deserializer)? {
            Some(NumOrString::Num(n)) => Some(n),
            Some(NumOrString::Str(s)) => s.trim().parse().ok(),
            None => None,
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_record() {
        let dto: BreweryDto = serde_json::from_value(json!({
            "id": "5128df48-79fc-4f0f-8b52-d06be54d0cec",
            "name": "(405) Brewing Co",
            "brewery_type": "micro",
            "address_1": "1716 Topeka St",
            "city": "Norman",
            "state_province": "Oklahoma",
            "postal_code": "73069-8224",
            "country": "United States",
            "longitude": -97.46818222,
            "latitude": 35.25738891,
            "phone": "4058160490",
            "website_url": "http://www.405brewing.com"
        }))
        .unwrap();

        assert_eq!(dto.name.as_deref(), Some("(405) Brewing Co"));
        assert_eq!(dto.address1.as_deref(), Some("1716 Topeka St"));
        assert_eq!(dto.brewery_type.as_deref(), Some("micro"));
        assert_eq!(dto.latitude, Some(35.257_388_91));
        assert_eq!(dto.website_url.as_deref(), Some("http://www.405brewing.com"));
    }

    #[test]
    fn coordinates_accept_strings() {
        let dto: BreweryDto = serde_json::from_value(json!({
            "id": "x",
            "latitude": "35.5",
            "longitude": "not a number"
        }))
        .unwrap();

        assert_eq!(dto.latitude, Some(35.5));
        assert_eq!(dto.longitude, None);
    }

    #[test]
    fn empty_object_is_all_none() {
        let dto: BreweryDto = serde_json::from_value(json!({})).unwrap();
        assert_eq!(dto, BreweryDto::default());
    }

    #[test]
    fn explicit_nulls_are_none() {
        let dto: BreweryDto = serde_json::from_value(json!({
            "id": null,
            "latitude": null,
            "phone": null
        }))
        .unwrap();
        assert!(dto.id.is_none());
        assert!(dto.latitude.is_none());
        assert!(dto.phone.is_none());
    }
}
