use super::{church::RankedChurch, coord::Coord};

pub const DEFAULT_LIMIT: i64 = 3;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 20;

/// Displayed when coordinates come straight from the device and reverse
/// geocoding found nothing better.
pub const DEVICE_LOCATION: &str = "device location";

/// Where the user is, as they told us.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Coordinates(Coord),
    /// Free text address or postal code, already trimmed and non empty.
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationQuery {
    pub location: Location,
    limit: usize,
    pub max_distance_km: Option<f64>,
}

impl LocationQuery {
    pub fn new(location: Location, limit: Option<i64>, max_distance_km: Option<f64>) -> Self {
        LocationQuery {
            location,
            limit: clamp_limit(limit.unwrap_or(DEFAULT_LIMIT)),
            max_distance_km,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

pub fn clamp_limit(limit: i64) -> usize {
    // the clamped value is in [1, 20], so the cast is lossless.
    limit.clamp(MIN_LIMIT, MAX_LIMIT) as usize
}

/// The user location once resolved, with what we show back to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coord: Coord,
    pub display_address: String,
    pub place_id: Option<String>,
    pub maps_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestChurches {
    pub location: ResolvedLocation,
    pub churches: Vec<RankedChurch>,
}
