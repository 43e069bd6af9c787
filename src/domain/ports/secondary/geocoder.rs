use async_trait::async_trait;
use snafu::Snafu;

use crate::domain::model::{
    coord::Coord,
    geocode::{Candidate, GeocodeRequest},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Geocoding Transport Error: {}", details))]
    Transport { details: String },

    #[snafu(display("Geocoding Provider Status {}: {}", status, message))]
    ProviderStatus { status: String, message: String },

    #[snafu(display("Geocoding Response Error: {}", details))]
    InvalidResponse { details: String },
}

/// Forward and reverse geocoding against an external provider.
///
/// An empty vector means the provider found nothing, which is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, request: GeocodeRequest) -> Result<Vec<Candidate>, Error>;

    async fn reverse_geocode(&self, coord: Coord) -> Result<Vec<Candidate>, Error>;
}
