use async_trait::async_trait;
use snafu::Snafu;

use crate::domain::model::church::ChurchRecord;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Record Store Transport Error: {}", details))]
    Transport { details: String },

    #[snafu(display("Record Store Authentication Error: {}", details))]
    Authentication { details: String },

    #[snafu(display("Record Store Response Error: {}", details))]
    InvalidResponse { details: String },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListChurches: Send + Sync {
    /// Records flagged `active == true`. Coordinates may still be missing.
    async fn list_active_churches(&self) -> Result<Vec<ChurchRecord>, Error>;
}
