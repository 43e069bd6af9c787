use tracing::{instrument, warn};

use crate::domain::model::{
    church::maps_search_url,
    coord::Coord,
    error::Error as ModelError,
    query::{Location, ResolvedLocation, DEVICE_LOCATION},
    region::RegionSettings,
};
use crate::domain::ports::secondary::geocoder::Geocoder;

use super::geocode_address::{geocode_address, AmbiguityRule};

/// Turns what the user gave us into a coordinate and a displayable address.
#[instrument(skip(geocoder, settings, rule))]
pub async fn resolve_location<G>(
    geocoder: &G,
    settings: &RegionSettings,
    rule: &dyn AmbiguityRule,
    location: &Location,
) -> Result<ResolvedLocation, ModelError>
where
    G: Geocoder + ?Sized,
{
    match location {
        Location::Coordinates(coord) => {
            if !coord.is_valid() {
                return Err(ModelError::InvalidCoordinates {
                    details: format!("({}) is out of range", coord),
                });
            }
            Ok(resolve_coordinates(geocoder, *coord).await)
        }
        Location::Text(text) => {
            let result = geocode_address(geocoder, settings, rule, text)
                .await
                .ok_or_else(|| ModelError::NotFound {
                    query: text.clone(),
                })?;
            let display_address = result
                .formatted_address
                .filter(|addr| !addr.is_empty())
                .unwrap_or_else(|| text.clone());
            Ok(ResolvedLocation {
                coord: result.coord,
                maps_url: maps_search_url(&display_address),
                display_address,
                place_id: result.place_id,
            })
        }
    }
}

// Reverse geocoding is only cosmetic: any failure falls back to the placeholder.
async fn resolve_coordinates<G>(geocoder: &G, coord: Coord) -> ResolvedLocation
where
    G: Geocoder + ?Sized,
{
    let best = match geocoder.reverse_geocode(coord).await {
        Ok(candidates) => candidates
            .into_iter()
            .find(|c| c.formatted_address.as_deref().map_or(false, |a| !a.is_empty())),
        Err(err) => {
            warn!(error = %err, "reverse geocoding failed");
            None
        }
    };

    match best {
        Some(candidate) => {
            let display_address = candidate.formatted_address.unwrap_or_default();
            ResolvedLocation {
                coord,
                maps_url: maps_search_url(&display_address),
                display_address,
                place_id: candidate.place_id,
            }
        }
        None => ResolvedLocation {
            coord,
            maps_url: maps_search_url(&coord.to_string()),
            display_address: String::from(DEVICE_LOCATION),
            place_id: None,
        },
    }
}
