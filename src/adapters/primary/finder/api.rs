use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::convert::TryFrom;

use crate::adapters::secondary::google::PROVIDER;
use crate::domain::model::{
    church::{normalize_whatsapp, RankedChurch},
    coord::Coord,
    error::Error as ModelError,
    query::{Location, LocationQuery, NearestChurches},
};

/// Body of `POST /api/v1/nearest`.
///
/// Fields are kept as raw JSON values: clients send numbers as strings, or
/// strings as numbers, and we accept both. A body that is not a JSON object
/// is treated as an empty one.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct NearestRequestBody {
    pub lat: Option<JsonValue>,
    pub lon: Option<JsonValue>,
    pub address: Option<JsonValue>,
    pub cep: Option<JsonValue>,
    pub limit: Option<JsonValue>,
    pub max_distance_km: Option<JsonValue>,
}

fn is_present(value: &Option<JsonValue>) -> bool {
    !matches!(value, None | Some(JsonValue::Null))
}

fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_text(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

fn as_limit(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

impl TryFrom<NearestRequestBody> for LocationQuery {
    type Error = ModelError;

    fn try_from(body: NearestRequestBody) -> Result<Self, Self::Error> {
        let location = match (&body.lat, &body.lon) {
            (Some(lat), Some(lon)) if is_present(&body.lat) && is_present(&body.lon) => {
                match (as_number(lat), as_number(lon)) {
                    (Some(lat), Some(lon)) => Location::Coordinates(Coord::new(lat, lon)),
                    _ => {
                        return Err(ModelError::InvalidCoordinates {
                            details: String::from("'lat' and 'lon' must be numbers"),
                        })
                    }
                }
            }
            _ => {
                let text = body
                    .address
                    .as_ref()
                    .and_then(as_text)
                    .or_else(|| body.cep.as_ref().and_then(as_text))
                    .ok_or(ModelError::MissingInput)?;
                Location::Text(text)
            }
        };

        // missing or non numeric limits get the default.
        let limit = body.limit.as_ref().and_then(as_limit);
        let max_distance_km = body
            .max_distance_km
            .as_ref()
            .and_then(as_number)
            .filter(|d| d.is_finite());

        Ok(LocationQuery::new(location, limit, max_distance_km))
    }
}

/// Echo of the resolved user location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEcho {
    pub input_address: String,
    pub lat: f64,
    pub lon: f64,
    pub place_id: Option<String>,
    pub maps_url: String,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurchItem {
    pub id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub cep: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub contact: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub maps_url: String,
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
}

impl From<RankedChurch> for ChurchItem {
    fn from(ranked: RankedChurch) -> Self {
        let RankedChurch {
            church,
            distance_km,
        } = ranked;
        let address = church.record.display_address().map(String::from);
        let whatsapp = church
            .record
            .contact
            .as_deref()
            .map(normalize_whatsapp)
            .filter(|number| !number.is_empty());
        let record = church.record;
        ChurchItem {
            id: record.id,
            name: record.name,
            address,
            cep: record.cep,
            day: record.day,
            time: record.time,
            contact: record.contact,
            lat: church.coord.lat(),
            lon: church.coord.lon(),
            maps_url: church.maps_url,
            distance_km,
            whatsapp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestResponseBody {
    pub query: QueryEcho,
    pub nearest_churches: Vec<ChurchItem>,
}

impl From<NearestChurches> for NearestResponseBody {
    fn from(nearest: NearestChurches) -> Self {
        let NearestChurches { location, churches } = nearest;
        NearestResponseBody {
            query: QueryEcho {
                input_address: location.display_address,
                lat: location.coord.lat(),
                lon: location.coord.lon(),
                place_id: location.place_id,
                maps_url: location.maps_url,
                provider: PROVIDER.to_string(),
            },
            nearest_churches: churches.into_iter().map(ChurchItem::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderStatus {
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionStatus {
    pub city: String,
    pub state: String,
    pub country: String,
    pub bbox: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponseBody {
    pub finder: FinderStatus,
    pub region: RegionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(body: JsonValue) -> Result<LocationQuery, ModelError> {
        let body: NearestRequestBody = serde_json::from_value(body).unwrap();
        LocationQuery::try_from(body)
    }

    #[test]
    fn should_prefer_coordinates_over_address() {
        let q = query(json!({"lat": -23.55, "lon": "-46.63", "address": "Rua X"})).unwrap();
        assert_eq!(q.location, Location::Coordinates(Coord::new(-23.55, -46.63)));
    }

    #[test]
    fn should_reject_non_numeric_coordinates() {
        let res = query(json!({"lat": "north", "lon": -46.63}));
        assert!(matches!(res, Err(ModelError::InvalidCoordinates { .. })));
    }

    #[test]
    fn should_fall_back_to_cep_when_address_is_blank() {
        let q = query(json!({"lat": -23.55, "address": "   ", "cep": " 01310-100 "})).unwrap();
        assert_eq!(q.location, Location::Text(String::from("01310-100")));
    }

    #[test]
    fn should_require_some_input() {
        assert!(matches!(query(json!({})), Err(ModelError::MissingInput)));
        assert!(matches!(
            query(json!({"lat": null, "lon": null, "address": ""})),
            Err(ModelError::MissingInput)
        ));
    }

    #[test]
    fn should_coerce_limit_leniently() {
        assert_eq!(query(json!({"cep": "01310100", "limit": "7"})).unwrap().limit(), 7);
        assert_eq!(query(json!({"cep": "01310100", "limit": 4.9})).unwrap().limit(), 4);
        assert_eq!(query(json!({"cep": "01310100", "limit": "many"})).unwrap().limit(), 3);
        assert_eq!(query(json!({"cep": "01310100", "limit": 500})).unwrap().limit(), 20);
    }

    #[test]
    fn should_ignore_non_numeric_radius() {
        let q = query(json!({"address": "Rua X", "max_distance_km": "far"})).unwrap();
        assert_eq!(q.max_distance_km, None);
        let q = query(json!({"address": "Rua X", "max_distance_km": "2.5"})).unwrap();
        assert_eq!(q.max_distance_km, Some(2.5));
    }

    #[test]
    fn should_omit_missing_whatsapp() {
        let item = ChurchItem {
            id: String::from("a"),
            name: None,
            address: None,
            cep: None,
            day: None,
            time: None,
            contact: None,
            lat: 0.0,
            lon: 0.0,
            maps_url: String::new(),
            distance_km: 0.0,
            whatsapp: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("whatsapp").is_none());
        assert!(value.get("contact").unwrap().is_null());
    }
}
