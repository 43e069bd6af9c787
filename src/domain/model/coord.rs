use serde::{ser::SerializeStruct, Deserialize, Deserializer};
use std::fmt;

/// Mean earth radius used for every distance computation, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// Same trick as the place coordinates: wrap the geo_types coordinate so that
// we control the (lat, lon) serialization and keep x = lon, y = lat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord(pub geo_types::Coord<f64>);

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Coord {
        Coord(geo_types::Coord { x: lon, y: lat })
    }

    pub fn lat(&self) -> f64 {
        self.0.y
    }

    pub fn lon(&self) -> f64 {
        self.0.x
    }

    pub fn is_valid(&self) -> bool {
        self.lat().is_finite()
            && self.lon().is_finite()
            && (-90.0..=90.0).contains(&self.lat())
            && (-180.0..=180.0).contains(&self.lon())
    }

    /// Great-circle distance in kilometers, using the haversine formula.
    pub fn haversine_km(&self, other: &Coord) -> f64 {
        let lat1 = self.lat().to_radians();
        let lat2 = other.lat().to_radians();
        let dlat = (other.lat() - self.lat()).to_radians();
        let dlon = (other.lon() - self.lon()).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // rounding can push `a` a hair above 1 for antipodal points.
        let a = a.clamp(0.0, 1.0);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat(), self.lon())
    }
}

impl serde::Serialize for Coord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut ser = serializer.serialize_struct("Coord", 2)?;
        ser.serialize_field("lat", &self.lat())?;
        ser.serialize_field("lon", &self.lon())?;
        ser.end()
    }
}

impl<'de> Deserialize<'de> for Coord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct LatLon {
            lat: f64,
            lon: f64,
        }
        let LatLon { lat, lon } = LatLon::deserialize(deserializer)?;
        Ok(Coord::new(lat, lon))
    }
}

/// Rounds a distance to two decimal places, as exposed in responses.
pub fn round_km(distance: f64) -> f64 {
    (distance * 100.0).round() / 100.0
}
