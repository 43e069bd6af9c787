use async_trait::async_trait;

use crate::domain::model::{
    error::Error as ModelError,
    query::{LocationQuery, NearestChurches},
};

#[async_trait]
pub trait FindNearestChurches: Send + Sync {
    async fn find_nearest_churches(
        &self,
        query: LocationQuery,
    ) -> Result<NearestChurches, ModelError>;
}
