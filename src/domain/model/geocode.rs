use serde::{Deserialize, Serialize};

use super::{coord::Coord, region::BoundingBox};

/// A component restriction, eg `country:BR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Country(String),
    AdministrativeArea(String),
    Locality(String),
}

impl Component {
    pub fn as_param(&self) -> String {
        match self {
            Component::Country(c) => format!("country:{}", c),
            Component::AdministrativeArea(a) => format!("administrative_area:{}", a),
            Component::Locality(l) => format!("locality:{}", l),
        }
    }
}

/// One forward geocoding call, as issued by a step of the waterfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
    pub components: Vec<Component>,
    pub bounds: Option<BoundingBox>,
    pub region: Option<String>,
}

/// A result returned by the provider, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub coord: Coord,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// The location a request resolved to. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub coord: Coord,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
}

impl From<Candidate> for GeocodeResult {
    fn from(candidate: Candidate) -> Self {
        GeocodeResult {
            coord: candidate.coord,
            formatted_address: candidate.formatted_address,
            place_id: candidate.place_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_components() {
        assert_eq!(Component::Country("BR".into()).as_param(), "country:BR");
        assert_eq!(
            Component::AdministrativeArea("SP".into()).as_param(),
            "administrative_area:SP"
        );
        assert_eq!(
            Component::Locality("São Paulo".into()).as_param(),
            "locality:São Paulo"
        );
    }
}
