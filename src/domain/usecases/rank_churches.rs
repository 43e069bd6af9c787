use crate::domain::model::{
    church::{Church, RankedChurch},
    coord::{round_km, Coord},
};

/// Sorts churches by great-circle distance from `origin`, drops the ones
/// beyond `max_distance_km`, and keeps the `limit` closest.
pub fn rank_churches(
    origin: &Coord,
    churches: Vec<Church>,
    limit: usize,
    max_distance_km: Option<f64>,
) -> Vec<RankedChurch> {
    // the radius applies to the reported, rounded distance.
    let mut scored: Vec<(f64, Church)> = churches
        .into_iter()
        .map(|church| (round_km(origin.haversine_km(&church.coord)), church))
        .filter(|(distance, _)| distance.is_finite())
        .filter(|(distance, _)| max_distance_km.map_or(true, |max| *distance <= max))
        .collect();

    // stable, so equidistant churches keep the store order.
    scored.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    scored
        .into_iter()
        .take(limit)
        .map(|(distance, church)| RankedChurch {
            church,
            distance_km: distance,
        })
        .collect()
}
