use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::model::{
    error::Error as ModelError,
    query::{LocationQuery, NearestChurches},
    region::RegionSettings,
};
use crate::domain::ports::{
    primary::find_nearest::FindNearestChurches,
    secondary::{geocoder::Geocoder, records::ListChurches},
};

use super::{
    geocode_address::{AmbiguityRule, KnownPlaces},
    load_churches::load_churches,
    rank_churches::rank_churches,
    resolve_location::resolve_location,
};

/// The whole pipeline: resolve the user location, read the churches, rank
/// them. Holds no mutable state, every request reads everything again.
#[derive(Clone)]
pub struct FindNearest<G, S> {
    pub geocoder: G,
    pub store: S,
    pub settings: RegionSettings,
    pub rule: Arc<dyn AmbiguityRule>,
}

impl<G, S> FindNearest<G, S> {
    /// Uses the region's known places to detect ambiguous queries.
    pub fn new(geocoder: G, store: S, settings: RegionSettings) -> Self {
        let rule = Arc::new(KnownPlaces::from(&settings.region));
        FindNearest {
            geocoder,
            store,
            settings,
            rule,
        }
    }

    pub fn with_rule(mut self, rule: Arc<dyn AmbiguityRule>) -> Self {
        self.rule = rule;
        self
    }
}

#[async_trait]
impl<G, S> FindNearestChurches for FindNearest<G, S>
where
    G: Geocoder,
    S: ListChurches,
{
    #[instrument(skip(self))]
    async fn find_nearest_churches(
        &self,
        query: LocationQuery,
    ) -> Result<NearestChurches, ModelError> {
        let location = resolve_location(
            &self.geocoder,
            &self.settings,
            self.rule.as_ref(),
            &query.location,
        )
        .await?;

        let churches = load_churches(&self.store).await?;
        let ranked = rank_churches(
            &location.coord,
            churches,
            query.limit(),
            query.max_distance_km,
        );
        info!(
            lat = location.coord.lat(),
            lon = location.coord.lon(),
            found = ranked.len(),
            "nearest churches"
        );

        Ok(NearestChurches {
            location,
            churches: ranked,
        })
    }
}
