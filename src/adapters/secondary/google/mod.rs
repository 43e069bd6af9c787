use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::domain::model::{
    coord::Coord,
    geocode::{Candidate, GeocodeRequest},
};
use crate::domain::ports::secondary::geocoder::{Error as GeocoderError, Geocoder};
use crate::utils::deserialize::{deserialize_duration, serialize_duration, serialize_redacted};
use crate::utils::endpoint::join_endpoint;

pub mod models;

use models::GeocodeResponse;

pub const PROVIDER: &str = "googlemaps";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Could not build the HTTP client: {}", source))]
    ClientBuild { source: reqwest::Error },

    #[snafu(display("Invalid URL: {}, {}", details, source))]
    InvalidUrl {
        details: String,
        source: url::ParseError,
    },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GoogleGeocoderConfig {
    /// Base of the Maps web services, eg 'https://maps.googleapis.com/maps/api/'.
    pub url: Url,
    #[serde(serialize_with = "serialize_redacted")]
    pub api_key: String,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout: Duration,
    pub language: Option<String>,
    /// Result types kept when reverse geocoding device coordinates.
    #[serde(default)]
    pub reverse_result_types: Vec<String>,
}

/// Client for the Google Geocoding API.
#[derive(Clone, Debug)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    endpoint: Url,
    config: GoogleGeocoderConfig,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleGeocoderConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context(ClientBuildSnafu)?;
        let endpoint = join_endpoint(&config.url, "geocode/json").context(InvalidUrlSnafu {
            details: String::from("could not build the geocoding endpoint"),
        })?;
        Ok(GoogleGeocoder {
            client,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn forward_params(&self, request: &GeocodeRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("address", request.address.clone()),
            ("key", self.config.api_key.clone()),
        ];
        if let Some(region) = &request.region {
            params.push(("region", region.clone()));
        }
        if !request.components.is_empty() {
            let components: Vec<String> = request.components.iter().map(|c| c.as_param()).collect();
            params.push(("components", components.join("|")));
        }
        if let Some(bounds) = &request.bounds {
            let (sw, ne) = (bounds.south_west(), bounds.north_east());
            params.push(("bounds", format!("{}|{}", sw, ne)));
        }
        if let Some(language) = &self.config.language {
            params.push(("language", language.clone()));
        }
        params
    }

    pub fn reverse_params(&self, coord: &Coord) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latlng", coord.to_string()),
            ("key", self.config.api_key.clone()),
        ];
        if !self.config.reverse_result_types.is_empty() {
            params.push(("result_type", self.config.reverse_result_types.join("|")));
        }
        if let Some(language) = &self.config.language {
            params.push(("language", language.clone()));
        }
        params
    }

    async fn call(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<Vec<Candidate>, GeocoderError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(params)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| GeocoderError::Transport {
                details: err.to_string(),
            })?;

        let body: GeocodeResponse =
            response
                .json()
                .await
                .map_err(|err| GeocoderError::InvalidResponse {
                    details: err.to_string(),
                })?;

        debug!(status = %body.status, results = body.results.len(), "geocoding response");
        body.into_candidates()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, request: GeocodeRequest) -> Result<Vec<Candidate>, GeocoderError> {
        self.call(&self.forward_params(&request)).await
    }

    #[instrument(skip(self))]
    async fn reverse_geocode(&self, coord: Coord) -> Result<Vec<Candidate>, GeocoderError> {
        self.call(&self.reverse_params(&coord)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{geocode::Component, region::BoundingBox};

    fn geocoder() -> GoogleGeocoder {
        GoogleGeocoder::new(GoogleGeocoderConfig {
            url: Url::parse("https://maps.googleapis.com/maps/api/").unwrap(),
            api_key: String::from("secret"),
            timeout: Duration::from_secs(12),
            language: None,
            reverse_result_types: vec![String::from("street_address"), String::from("route")],
        })
        .unwrap()
    }

    fn get<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn should_build_endpoint() {
        assert_eq!(
            geocoder().endpoint().as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json"
        );
    }

    #[test]
    fn should_build_endpoint_below_url_without_trailing_slash() {
        let mut config = geocoder().config;
        config.url = Url::parse("https://maps.googleapis.com/maps/api").unwrap();
        let geocoder = GoogleGeocoder::new(config).unwrap();
        assert_eq!(
            geocoder.endpoint().as_str(),
            "https://maps.googleapis.com/maps/api/geocode/json"
        );
    }

    #[test]
    fn should_build_forward_params() {
        let request = GeocodeRequest {
            address: String::from("Rua X, 123"),
            components: vec![
                Component::Country(String::from("BR")),
                Component::AdministrativeArea(String::from("SP")),
            ],
            bounds: Some("-24.01,-46.83,-23.36,-46.36".parse::<BoundingBox>().unwrap()),
            region: Some(String::from("br")),
        };
        let params = geocoder().forward_params(&request);
        assert_eq!(get(&params, "address"), Some("Rua X, 123"));
        assert_eq!(get(&params, "key"), Some("secret"));
        assert_eq!(get(&params, "region"), Some("br"));
        assert_eq!(
            get(&params, "components"),
            Some("country:BR|administrative_area:SP")
        );
        assert_eq!(get(&params, "bounds"), Some("-24.01,-46.83|-23.36,-46.36"));
        assert_eq!(get(&params, "language"), None);
    }

    #[test]
    fn should_omit_missing_bias() {
        let request = GeocodeRequest {
            address: String::from("01310-100"),
            components: vec![],
            bounds: None,
            region: None,
        };
        let params = geocoder().forward_params(&request);
        assert_eq!(get(&params, "components"), None);
        assert_eq!(get(&params, "bounds"), None);
        assert_eq!(get(&params, "region"), None);
    }

    #[test]
    fn should_build_reverse_params() {
        let params = geocoder().reverse_params(&Coord::new(-23.55, -46.63));
        assert_eq!(get(&params, "latlng"), Some("-23.55,-46.63"));
        assert_eq!(get(&params, "result_type"), Some("street_address|route"));
    }

    #[test]
    fn should_not_display_api_key() {
        let config = geocoder().config;
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["api_key"], "********");
        assert_eq!(json["timeout"], 12000);
    }
}
