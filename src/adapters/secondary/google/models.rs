use serde::Deserialize;

use crate::domain::model::{coord::Coord, geocode::Candidate};
use crate::domain::ports::secondary::geocoder::Error as GeocoderError;

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Body of a Geocoding API response, forward or reverse.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResultModel>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResultModel {
    pub geometry: Geometry,
    #[serde(default)]
    pub types: Vec<String>,
    pub formatted_address: Option<String>,
    pub place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeocodeResultModel> for Candidate {
    fn from(model: GeocodeResultModel) -> Self {
        Candidate {
            coord: Coord::new(model.geometry.location.lat, model.geometry.location.lng),
            formatted_address: model.formatted_address,
            place_id: model.place_id,
            types: model.types,
        }
    }
}

impl GeocodeResponse {
    /// `ZERO_RESULTS` is an empty answer, any other non `OK` status is an error.
    pub fn into_candidates(self) -> Result<Vec<Candidate>, GeocoderError> {
        match self.status.as_str() {
            STATUS_OK => Ok(self.results.into_iter().map(Candidate::from).collect()),
            STATUS_ZERO_RESULTS => Ok(Vec::new()),
            _ => Err(GeocoderError::ProviderStatus {
                status: self.status,
                message: self.error_message.unwrap_or_default(),
            }),
        }
    }
}
