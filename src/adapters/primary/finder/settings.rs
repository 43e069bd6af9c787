use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::adapters::secondary::{firestore::FirestoreConfig, google::GoogleGeocoderConfig};
use crate::domain::model::region::{Region, RegionSettings, ScoringSettings};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Logging {
    /// Directory (daily rolling file) or file receiving the logs. Stdout when missing.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Host on which we expose the finder. Example: 'localhost', '0.0.0.0'
    pub host: String,
    /// Port on which we expose the finder.
    pub port: u16,
    /// Upper limit on the size of POST bodies (in bytes)
    pub content_length_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub mode: Option<String>,
    #[serde(default)]
    pub logging: Logging,
    pub service: Service,
    pub nb_threads: Option<usize>,
    pub google: GoogleGeocoderConfig,
    pub firestore: FirestoreConfig,
    pub region: Region,
    pub scoring: ScoringSettings,
}

impl Settings {
    pub fn region_settings(&self) -> RegionSettings {
        RegionSettings {
            region: self.region.clone(),
            scoring: self.scoring.clone(),
        }
    }
}
