use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt, Snafu};
use std::{convert::TryFrom, fmt, str::FromStr, time::Duration};
use tracing::{debug, instrument};
use url::Url;

use crate::domain::model::church::ChurchRecord;
use crate::domain::ports::secondary::records::{Error as RecordsError, ListChurches};
use crate::utils::deserialize::{deserialize_duration, serialize_duration, serialize_redacted};
use crate::utils::endpoint::join_endpoint;

pub mod models;

use models::{active_documents_query, AccessToken, RunQueryResponse};

pub const DEFAULT_DATABASE: &str = "(default)";

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

    #[snafu(display("Missing Google Cloud project"))]
    MissingProject,

    #[snafu(display("Unknown token source '{}', expected none, static or metadata", value))]
    UnknownTokenSource { value: String },
}

/// Where the bearer token sent to Firestore comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TokenSource {
    /// No authentication, for the emulator.
    None,
    /// The configured `access_token`.
    Static,
    /// The compute metadata server, when running on Google Cloud.
    Metadata,
}

impl FromStr for TokenSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(TokenSource::None),
            "static" => Ok(TokenSource::Static),
            "metadata" => Ok(TokenSource::Metadata),
            _ => Err(Error::UnknownTokenSource {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TokenSource {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenSource::None => "none",
            TokenSource::Static => "static",
            TokenSource::Metadata => "metadata",
        };
        f.write_str(s)
    }
}

impl From<TokenSource> for String {
    fn from(source: TokenSource) -> Self {
        source.to_string()
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FirestoreConfig {
    /// Base of the REST API, eg 'https://firestore.googleapis.com/v1/'.
    pub url: Url,
    pub project: String,
    pub database: Option<String>,
    pub collection: String,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub timeout: Duration,
    pub token_source: TokenSource,
    #[serde(default, serialize_with = "serialize_redacted")]
    pub access_token: String,
    pub metadata_url: Url,
}

/// Reads church documents through the Firestore REST API.
#[derive(Clone, Debug)]
pub struct FirestoreStore {
    client: reqwest::Client,
    endpoint: Url,
    config: FirestoreConfig,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, Error> {
        ensure!(!config.project.trim().is_empty(), MissingProjectSnafu);
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context(ClientBuildSnafu)?;
        let database = config
            .database
            .as_deref()
            .filter(|db| !db.is_empty())
            .unwrap_or(DEFAULT_DATABASE);
        let path = format!(
            "projects/{}/databases/{}/documents:runQuery",
            config.project, database
        );
        let endpoint = join_endpoint(&config.url, &path).context(InvalidUrlSnafu {
            details: String::from("could not build the runQuery endpoint"),
        })?;
        Ok(FirestoreStore {
            client,
            endpoint,
            config,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn bearer_token(&self) -> Result<Option<String>, RecordsError> {
        match self.config.token_source {
            TokenSource::None => Ok(None),
            TokenSource::Static => Ok(Some(self.config.access_token.clone())),
            TokenSource::Metadata => {
                let token: AccessToken = self
                    .client
                    .get(self.config.metadata_url.clone())
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .and_then(|response| response.error_for_status())
                    .map_err(|err| RecordsError::Authentication {
                        details: err.to_string(),
                    })?
                    .json()
                    .await
                    .map_err(|err| RecordsError::Authentication {
                        details: err.to_string(),
                    })?;
                Ok(Some(token.access_token))
            }
        }
    }
}

#[async_trait]
impl ListChurches for FirestoreStore {
    #[instrument(skip(self), fields(collection = %self.config.collection))]
    async fn list_active_churches(&self) -> Result<Vec<ChurchRecord>, RecordsError> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&active_documents_query(&self.config.collection));
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let rows: Vec<RunQueryResponse> = request
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| RecordsError::Transport {
                details: err.to_string(),
            })?
            .json()
            .await
            .map_err(|err| RecordsError::InvalidResponse {
                details: err.to_string(),
            })?;

        let records: Vec<ChurchRecord> = rows
            .into_iter()
            .filter_map(|row| row.document)
            .map(ChurchRecord::from)
            .collect();
        debug!(count = records.len(), "read active churches");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(database: Option<&str>) -> FirestoreConfig {
        FirestoreConfig {
            url: Url::parse("https://firestore.googleapis.com/v1/").unwrap(),
            project: String::from("igrejas"),
            database: database.map(String::from),
            collection: String::from("churches"),
            timeout: Duration::from_secs(12),
            token_source: TokenSource::None,
            access_token: String::new(),
            metadata_url: Url::parse(
                "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token",
            )
            .unwrap(),
        }
    }

    #[test]
    fn should_target_default_database() {
        let store = FirestoreStore::new(config(None)).unwrap();
        assert_eq!(
            store.endpoint().as_str(),
            "https://firestore.googleapis.com/v1/projects/igrejas/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn should_keep_version_segment_without_trailing_slash() {
        let mut config = config(None);
        config.url = Url::parse("http://localhost:8681/v1").unwrap();
        let store = FirestoreStore::new(config).unwrap();
        assert_eq!(
            store.endpoint().as_str(),
            "http://localhost:8681/v1/projects/igrejas/databases/(default)/documents:runQuery"
        );
    }

    #[test]
    fn should_target_named_database() {
        let store = FirestoreStore::new(config(Some("prod"))).unwrap();
        assert!(store
            .endpoint()
            .as_str()
            .ends_with("/databases/prod/documents:runQuery"));
    }

    #[test]
    fn should_require_a_project() {
        let config = FirestoreConfig {
            project: String::from(" "),
            ..config(None)
        };
        assert!(matches!(FirestoreStore::new(config), Err(Error::MissingProject)));
    }

    #[test]
    fn should_parse_token_sources() {
        assert_eq!("metadata".parse::<TokenSource>().unwrap(), TokenSource::Metadata);
        assert_eq!(" Static ".parse::<TokenSource>().unwrap(), TokenSource::Static);
        assert_eq!("none".parse::<TokenSource>().unwrap(), TokenSource::None);
        assert!("oauth".parse::<TokenSource>().is_err());
    }

    #[tokio::test]
    async fn should_not_authenticate_against_emulator() {
        let store = FirestoreStore::new(config(None)).unwrap();
        assert_eq!(store.bearer_token().await.unwrap(), None);
    }
}
