use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;

use crate::domain::model::church::ChurchRecord;

/// Body of a `documents:runQuery` call selecting `active == true` documents.
pub fn active_documents_query(collection: &str) -> JsonValue {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "active" },
                    "op": "EQUAL",
                    "value": { "booleanValue": true }
                }
            }
        }
    })
}

/// One element of the streamed `runQuery` response. Progress-only elements
/// carry no document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    pub document: Option<Document>,
    pub read_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Document {
    /// Full resource name, the id is its last segment.
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, JsonValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub token_type: Option<String>,
}

// Firestore wraps every value in an object keyed by its type,
// eg {"doubleValue": -23.5} or {"integerValue": "12"}.
fn string_value(value: &JsonValue) -> Option<String> {
    if let Some(s) = value.get("stringValue").and_then(JsonValue::as_str) {
        return Some(s.to_string());
    }
    if let Some(i) = value.get("integerValue").and_then(JsonValue::as_str) {
        return Some(i.to_string());
    }
    value
        .get("doubleValue")
        .and_then(JsonValue::as_f64)
        .map(|d| d.to_string())
}

fn number_value(value: &JsonValue) -> Option<f64> {
    let number = if let Some(d) = value.get("doubleValue") {
        d.as_f64()
    } else if let Some(i) = value.get("integerValue") {
        // int64 are encoded as strings, but accept plain numbers too.
        i.as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| i.as_f64())
    } else {
        value
            .get("stringValue")
            .and_then(JsonValue::as_str)
            .and_then(|s| s.trim().replace(',', ".").parse::<f64>().ok())
    };
    number.filter(|n| n.is_finite())
}

fn bool_value(value: &JsonValue) -> Option<bool> {
    value.get("booleanValue").and_then(JsonValue::as_bool)
}

fn geo_point_value(value: &JsonValue) -> Option<(f64, f64)> {
    let point = value.get("geoPointValue")?;
    // a zero coordinate is omitted from the encoded point.
    let lat = point.get("latitude").and_then(JsonValue::as_f64).unwrap_or(0.0);
    let lon = point.get("longitude").and_then(JsonValue::as_f64).unwrap_or(0.0);
    Some((lat, lon))
}

impl Document {
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn string(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(string_value)
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(number_value)
    }
}

impl From<Document> for ChurchRecord {
    fn from(doc: Document) -> Self {
        let location = doc.fields.get("location").and_then(geo_point_value);
        let lat = doc.number("lat").or(location.map(|(lat, _)| lat));
        let lon = doc.number("lon").or(location.map(|(_, lon)| lon));
        ChurchRecord {
            id: doc.id().to_string(),
            name: doc.string("name"),
            address: doc.string("address"),
            formatted_address: doc.string("formatted_address"),
            cep: doc.string("cep"),
            day: doc.string("day"),
            time: doc.string("time"),
            contact: doc.string("contact"),
            lat,
            lon,
            active: doc.fields.get("active").and_then(bool_value).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(fields: JsonValue) -> Document {
        serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/churches/igreja-se",
            "fields": fields,
        }))
        .unwrap()
    }

    #[test]
    fn should_decode_typed_fields() {
        let record = ChurchRecord::from(document(json!({
            "name": {"stringValue": "Igreja da Sé"},
            "address": {"stringValue": "Praça da Sé, s/n"},
            "cep": {"integerValue": "1001000"},
            "day": {"stringValue": "Domingo"},
            "time": {"stringValue": "19:30"},
            "contact": {"stringValue": "(11) 3107-6832"},
            "lat": {"doubleValue": -23.5503},
            "lon": {"integerValue": "-46"},
            "active": {"booleanValue": true}
        })));
        assert_eq!(record.id, "igreja-se");
        assert_eq!(record.name.as_deref(), Some("Igreja da Sé"));
        assert_eq!(record.cep.as_deref(), Some("1001000"));
        assert_eq!(record.lat, Some(-23.5503));
        assert_eq!(record.lon, Some(-46.0));
        assert!(record.active);
        assert_eq!(record.formatted_address, None);
    }

    #[test]
    fn should_treat_null_coordinates_as_missing() {
        let record = ChurchRecord::from(document(json!({
            "lat": {"nullValue": null},
            "active": {"booleanValue": true}
        })));
        assert_eq!(record.lat, None);
        assert_eq!(record.lon, None);
    }

    #[test]
    fn should_fall_back_to_geo_point() {
        let record = ChurchRecord::from(document(json!({
            "location": {"geoPointValue": {"latitude": -23.5, "longitude": -46.6}},
            "active": {"booleanValue": true}
        })));
        assert_eq!(record.lat, Some(-23.5));
        assert_eq!(record.lon, Some(-46.6));
    }

    #[test]
    fn should_parse_stream_without_documents() {
        let rows: Vec<RunQueryResponse> =
            serde_json::from_str(r#"[{"readTime": "2024-01-01T00:00:00Z"}]"#).unwrap();
        assert!(rows[0].document.is_none());
    }

    #[test]
    fn should_build_active_filter() {
        let query = active_documents_query("churches");
        assert_eq!(
            query["structuredQuery"]["from"][0]["collectionId"],
            "churches"
        );
        assert_eq!(
            query["structuredQuery"]["where"]["fieldFilter"]["value"]["booleanValue"],
            true
        );
    }
}
