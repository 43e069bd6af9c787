use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

use crate::domain::model::{
    geocode::{Candidate, Component, GeocodeRequest, GeocodeResult},
    region::{Region, RegionSettings, ScoringSettings},
};
use crate::domain::ports::secondary::geocoder::Geocoder;

lazy_static! {
    static ref POSTAL_CODE: Regex = Regex::new(r"^\d{5}-?\d{3}$").unwrap();
    static ref CONTAINS_POSTAL_CODE: Regex = Regex::new(r"\b\d{5}-?\d{3}\b").unwrap();
}

/// Place types, from the most to the least precise.
/// Anything not listed ranks like `political`.
pub const TYPE_PRIORITY: &[&str] = &[
    "street_address",
    "premise",
    "subpremise",
    "intersection",
    "route",
    "postal_code",
    "neighborhood",
    "sublocality_level_1",
    "sublocality",
    "locality",
    "administrative_area_level_2",
    "administrative_area_level_1",
    "political",
];

pub fn is_postal_code(query: &str) -> bool {
    POSTAL_CODE.is_match(query.trim())
}

/// Decides whether a free text query needs the region appended before
/// being sent to the provider.
pub trait AmbiguityRule: Debug + Send + Sync {
    fn is_ambiguous(&self, query: &str) -> bool;
}

/// Ambiguous unless the query names a postal code, one of the region's
/// places, or a state / country token.
#[derive(Debug, Clone)]
pub struct KnownPlaces {
    places: Vec<String>,
    tokens: Vec<String>,
}

impl KnownPlaces {
    pub fn new<P, T>(places: P, tokens: T) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        KnownPlaces {
            places: normalize_all(places),
            tokens: normalize_all(tokens),
        }
    }
}

fn normalize_all<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| normalize(item.as_ref()))
        .filter(|item| !item.is_empty())
        .collect()
}

impl From<&Region> for KnownPlaces {
    fn from(region: &Region) -> Self {
        let mut places = region.known_places.clone();
        places.push(region.city.clone());
        let mut tokens = region.tokens.clone();
        tokens.push(region.state.clone());
        tokens.push(region.country_name.clone());
        KnownPlaces::new(places, tokens)
    }
}

impl AmbiguityRule for KnownPlaces {
    fn is_ambiguous(&self, query: &str) -> bool {
        if CONTAINS_POSTAL_CODE.is_match(query) {
            return false;
        }
        // padded so that a phrase only matches on word boundaries.
        let padded = format!(" {} ", normalize(query));
        let mentions = |phrase: &String| padded.contains(&format!(" {} ", phrase));
        !(self.places.iter().any(mentions) || self.tokens.iter().any(mentions))
    }
}

fn fold(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        c => c,
    }
}

/// Lowercase, strip diacritics, and collapse punctuation into single spaces.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(fold)
        .collect::<String>()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One step of the geocoding waterfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Postal code, restricted to the country.
    PostalCode,
    /// Region appended to the text, biased on locality, state and country.
    CityAppended,
    /// Restricted to country and state, biased on the bounding box.
    BoundedState,
    /// Restricted to country and state.
    State,
    /// Restricted to country.
    Country,
}

impl Step {
    pub fn request(&self, query: &str, region: &Region) -> GeocodeRequest {
        let country = Component::Country(region.country.clone());
        let state = Component::AdministrativeArea(region.state.clone());
        let (address, components, bounds) = match self {
            Step::PostalCode => (query.to_string(), vec![country], None),
            Step::CityAppended => (
                format!(
                    "{}, {} - {}, {}",
                    query, region.city, region.state, region.country_name
                ),
                vec![Component::Locality(region.city.clone()), state, country],
                None,
            ),
            Step::BoundedState => (query.to_string(), vec![country, state], Some(region.bbox)),
            Step::State => (query.to_string(), vec![country, state], None),
            Step::Country => (query.to_string(), vec![country], None),
        };
        GeocodeRequest {
            address,
            components,
            bounds,
            region: Some(region.region_code.clone()),
        }
    }
}

/// The ordered steps attempted for a query. The first one with a result wins.
pub fn plan(query: &str, rule: &dyn AmbiguityRule) -> Vec<Step> {
    let mut steps = Vec::with_capacity(5);
    if is_postal_code(query) {
        steps.push(Step::PostalCode);
    } else if rule.is_ambiguous(query) {
        steps.push(Step::CityAppended);
    }
    steps.extend([Step::BoundedState, Step::State, Step::Country]);
    steps
}

pub fn type_rank(types: &[String]) -> usize {
    types
        .iter()
        .filter_map(|t| TYPE_PRIORITY.iter().position(|p| *p == t.as_str()))
        .min()
        .unwrap_or(TYPE_PRIORITY.len() - 1)
}

/// Lower is better.
pub fn score(candidate: &Candidate, region: &Region, scoring: &ScoringSettings) -> f64 {
    let mut score = type_rank(&candidate.types) as f64 * scoring.type_weight;
    if region.bbox.contains(&candidate.coord) {
        score -= scoring.bbox_bonus;
    }
    let distance = region.center.haversine_km(&candidate.coord);
    score + (distance * scoring.distance_penalty_per_km).min(scoring.max_distance_penalty)
}

/// Picks the lowest scoring candidate, the provider's order breaking ties.
pub fn best_candidate(candidates: Vec<Candidate>, settings: &RegionSettings) -> Option<Candidate> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.coord.is_valid())
        .map(|candidate| {
            let score = score(&candidate, &settings.region, &settings.scoring);
            (score, candidate)
        })
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, candidate)| candidate)
}

/// Runs the waterfall. Provider failures only skip to the next step, so the
/// worst outcome is `None`.
#[instrument(skip(geocoder, settings, rule))]
pub async fn geocode_address<G>(
    geocoder: &G,
    settings: &RegionSettings,
    rule: &dyn AmbiguityRule,
    query: &str,
) -> Option<GeocodeResult>
where
    G: Geocoder + ?Sized,
{
    for step in plan(query, rule) {
        let request = step.request(query, &settings.region);
        debug!(step = ?step, address = %request.address, "geocoding step");
        match geocoder.geocode(request).await {
            Ok(candidates) => {
                let count = candidates.len();
                if let Some(best) = best_candidate(candidates, settings) {
                    debug!(step = ?step, candidates = count, "geocoding step succeeded");
                    return Some(best.into());
                }
            }
            Err(err) => {
                warn!(step = ?step, error = %err, "geocoding step failed");
            }
        }
    }
    None
}
