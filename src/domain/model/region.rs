use geo_types::Rect;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use snafu::Snafu;
use std::{fmt, str::FromStr};

use super::coord::Coord;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Invalid bounding box '{}': {}", input, details))]
    InvalidBoundingBox { input: String, details: String },

    #[snafu(display("Invalid region settings: {}", source))]
    InvalidRegionSettings { source: toml::de::Error },
}

/// Rectangular lat/lon area used to bias geocoding toward the region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox(pub Rect<f64>);

impl BoundingBox {
    pub fn new(south_west: Coord, north_east: Coord) -> Self {
        BoundingBox(Rect::new(south_west.0, north_east.0))
    }

    pub fn south_west(&self) -> Coord {
        Coord(self.0.min())
    }

    pub fn north_east(&self) -> Coord {
        Coord(self.0.max())
    }

    /// Boundaries are considered inside.
    pub fn contains(&self, coord: &Coord) -> bool {
        let (min, max) = (self.0.min(), self.0.max());
        (min.y..=max.y).contains(&coord.lat()) && (min.x..=max.x).contains(&coord.lon())
    }
}

fn parse_numbers(input: &str, part: &str, expected: usize) -> Result<Vec<f64>, Error> {
    let numbers = part
        .split(',')
        .map(|n| n.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| Error::InvalidBoundingBox {
            input: input.to_string(),
            details: err.to_string(),
        })?;
    if numbers.len() != expected {
        return Err(Error::InvalidBoundingBox {
            input: input.to_string(),
            details: format!("expected {} numbers, got {}", expected, numbers.len()),
        });
    }
    Ok(numbers)
}

impl FromStr for BoundingBox {
    type Err = Error;

    /// Accepts either `south,west,north,east` or two `lat,lon` corners
    /// separated by `;` or `|`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let corners: Vec<&str> = s.split(|c| c == ';' || c == '|').collect();
        let bbox = match corners.as_slice() {
            [one, other] => {
                let one = parse_numbers(s, one, 2)?;
                let other = parse_numbers(s, other, 2)?;
                BoundingBox::new(Coord::new(one[0], one[1]), Coord::new(other[0], other[1]))
            }
            [flat] => {
                let n = parse_numbers(s, flat, 4)?;
                BoundingBox::new(Coord::new(n[0], n[1]), Coord::new(n[2], n[3]))
            }
            _ => {
                return Err(Error::InvalidBoundingBox {
                    input: s.to_string(),
                    details: String::from("too many corners"),
                })
            }
        };
        if !bbox.south_west().is_valid() || !bbox.north_east().is_valid() {
            return Err(Error::InvalidBoundingBox {
                input: s.to_string(),
                details: String::from("coordinates out of range"),
            });
        }
        Ok(bbox)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sw, ne) = (self.south_west(), self.north_east());
        write!(f, "{},{},{},{}", sw.lat(), sw.lon(), ne.lat(), ne.lon())
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// The metropolitan area user queries are biased toward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub bbox: BoundingBox,
    pub center: Coord,
    pub city: String,
    /// Administrative area component, eg 'SP'.
    pub state: String,
    /// ISO country component, eg 'BR'.
    pub country: String,
    pub country_name: String,
    /// ccTLD region bias sent to the provider, eg 'br'.
    pub region_code: String,
    #[serde(default)]
    pub known_places: Vec<String>,
    #[serde(default)]
    pub tokens: Vec<String>,
}

/// Weights of the geocoding candidate score. Lower scores win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringSettings {
    pub type_weight: f64,
    pub bbox_bonus: f64,
    pub distance_penalty_per_km: f64,
    pub max_distance_penalty: f64,
}

// The configuration file keeps both sections at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSettings {
    pub region: Region,
    pub scoring: ScoringSettings,
}

impl RegionSettings {
    pub fn new(settings: &str) -> Result<RegionSettings, Error> {
        toml::from_str(settings).map_err(|source| Error::InvalidRegionSettings { source })
    }
}

impl Default for RegionSettings {
    fn default() -> Self {
        let settings = include_str!("../../../config/region/default.toml");
        RegionSettings::new(settings)
            .expect("could not create default region settings. Check config/region/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_flat_bounding_box() {
        let bbox: BoundingBox = "-24.01,-46.83,-23.36,-46.36".parse().unwrap();
        assert_eq!(bbox.south_west(), Coord::new(-24.01, -46.83));
        assert_eq!(bbox.north_east(), Coord::new(-23.36, -46.36));
    }

    #[test]
    fn should_parse_corner_pairs_in_any_order() {
        let bbox: BoundingBox = "-23.36, -46.36 ; -24.01, -46.83".parse().unwrap();
        assert_eq!(bbox.south_west(), Coord::new(-24.01, -46.83));
        assert_eq!(bbox.north_east(), Coord::new(-23.36, -46.36));

        let piped: BoundingBox = "-24.01,-46.83|-23.36,-46.36".parse().unwrap();
        assert_eq!(piped, bbox);
    }

    #[test]
    fn should_reject_malformed_bounding_box() {
        assert!("-24.01,-46.83,-23.36".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert!("1,2;3,4;5,6".parse::<BoundingBox>().is_err());
        assert!("-95,0,10,10".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn should_contain_boundaries() {
        let bbox: BoundingBox = "0,0,1,1".parse().unwrap();
        assert!(bbox.contains(&Coord::new(0.5, 0.5)));
        assert!(bbox.contains(&Coord::new(0.0, 1.0)));
        assert!(!bbox.contains(&Coord::new(1.5, 0.5)));
    }

    #[test]
    fn should_get_default_region_settings() {
        let settings = RegionSettings::default();
        assert_eq!(settings.region.country, "BR");
        assert!(settings.region.bbox.contains(&settings.region.center));
        assert!(!settings.region.known_places.is_empty());
    }
}
