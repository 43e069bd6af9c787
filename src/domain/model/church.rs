use serde::{Deserialize, Serialize};
use url::Url;

use super::coord::Coord;

pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";

/// A church as stored in the document store. Read only from our side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChurchRecord {
    pub id: String,
    pub name: Option<String>,
    pub address: Option<String>,
    pub formatted_address: Option<String>,
    pub cep: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub contact: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub active: bool,
}

impl ChurchRecord {
    /// Only active records with both coordinates can be ranked.
    pub fn coord(&self) -> Option<Coord> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if self.active => Some(Coord::new(lat, lon)),
            _ => None,
        }
    }

    /// The address shown to users, preferring the provider formatted one.
    pub fn display_address(&self) -> Option<&str> {
        [&self.formatted_address, &self.address]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|addr| !addr.trim().is_empty())
    }
}

/// An eligible church, with its map link already built.
#[derive(Debug, Clone, PartialEq)]
pub struct Church {
    pub record: ChurchRecord,
    pub coord: Coord,
    pub maps_url: String,
}

impl Church {
    /// Returns None for inactive records or records missing a coordinate.
    pub fn from_record(record: ChurchRecord) -> Option<Church> {
        let coord = record.coord()?;
        let maps_url = match record.display_address() {
            Some(addr) => maps_search_url(addr),
            None => maps_search_url(&coord.to_string()),
        };
        Some(Church {
            record,
            coord,
            maps_url,
        })
    }
}

/// A church with its distance to the user, in kilometers, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedChurch {
    pub church: Church,
    pub distance_km: f64,
}

pub fn maps_search_url(query: &str) -> String {
    // MAPS_SEARCH_URL is a valid constant, only the query part varies.
    match Url::parse_with_params(MAPS_SEARCH_URL, &[("api", "1"), ("query", query)]) {
        Ok(url) => url.to_string(),
        Err(_) => String::from(MAPS_SEARCH_URL),
    }
}

/// Keeps only digits and prefixes the brazilian country code when missing.
pub fn normalize_whatsapp(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 | 11 => format!("55{}", digits),
        _ if digits.starts_with("55") => digits,
        n if n > 11 => format!("55{}", &digits[n - 11..]),
        _ => digits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ChurchRecord {
        ChurchRecord {
            id: String::from("abc"),
            name: Some(String::from("Igreja Central")),
            address: Some(String::from("Rua Augusta, 100")),
            lat: Some(-23.55),
            lon: Some(-46.65),
            active: true,
            ..Default::default()
        }
    }

    #[test]
    fn should_skip_inactive_records() {
        let inactive = ChurchRecord {
            active: false,
            ..record()
        };
        assert!(Church::from_record(inactive).is_none());
    }

    #[test]
    fn should_skip_records_without_coordinates() {
        let no_lat = ChurchRecord {
            lat: None,
            ..record()
        };
        let no_lon = ChurchRecord {
            lon: None,
            ..record()
        };
        assert!(Church::from_record(no_lat).is_none());
        assert!(Church::from_record(no_lon).is_none());
    }

    #[test]
    fn should_build_maps_url_from_address() {
        let church = Church::from_record(record()).unwrap();
        assert_eq!(
            church.maps_url,
            "https://www.google.com/maps/search/?api=1&query=Rua+Augusta%2C+100"
        );
    }

    #[test]
    fn should_prefer_formatted_address() {
        let church = Church::from_record(ChurchRecord {
            formatted_address: Some(String::from("R. Augusta, 100 - Consolação")),
            ..record()
        })
        .unwrap();
        assert_eq!(
            church.record.display_address(),
            Some("R. Augusta, 100 - Consolação")
        );
    }

    #[test]
    fn should_build_maps_url_from_coordinates_without_address() {
        let church = Church::from_record(ChurchRecord {
            address: None,
            ..record()
        })
        .unwrap();
        assert_eq!(
            church.maps_url,
            "https://www.google.com/maps/search/?api=1&query=-23.55%2C-46.65"
        );
    }

    #[test]
    fn should_normalize_whatsapp_numbers() {
        assert_eq!(normalize_whatsapp("(11) 98765-4321"), "5511987654321");
        assert_eq!(normalize_whatsapp("11 3456-7890"), "551134567890");
        assert_eq!(normalize_whatsapp("+55 11 98765-4321"), "5511987654321");
        assert_eq!(normalize_whatsapp("+1 212 555 0100 9999"), "5555501009999");
        assert_eq!(normalize_whatsapp(""), "");
        assert_eq!(normalize_whatsapp("1234"), "1234");
    }
}
