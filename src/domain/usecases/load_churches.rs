use tracing::{debug, instrument};

use crate::domain::model::{church::Church, error::Error as ModelError};
use crate::domain::ports::secondary::records::ListChurches;

/// Reads the active churches and keeps those that can be ranked.
/// Records without coordinates are skipped silently.
#[instrument(skip(store))]
pub async fn load_churches<S>(store: &S) -> Result<Vec<Church>, ModelError>
where
    S: ListChurches + ?Sized,
{
    let records = store
        .list_active_churches()
        .await
        .map_err(|err| ModelError::ChurchRetrieval { source: err.into() })?;

    let total = records.len();
    let churches: Vec<Church> = records.into_iter().filter_map(Church::from_record).collect();
    debug!(total, eligible = churches.len(), "loaded churches");
    Ok(churches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::church::ChurchRecord;
    use crate::domain::ports::secondary::records::{Error as RecordsError, MockListChurches};

    fn record(id: &str, active: bool, lat: Option<f64>, lon: Option<f64>) -> ChurchRecord {
        ChurchRecord {
            id: id.to_string(),
            active,
            lat,
            lon,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn should_keep_only_active_records_with_coordinates() {
        let mut store = MockListChurches::new();
        store.expect_list_active_churches().times(1).returning(|| {
            Ok(vec![
                record("ok", true, Some(-23.5), Some(-46.6)),
                record("inactive", false, Some(-23.5), Some(-46.6)),
                record("no-lat", true, None, Some(-46.6)),
                record("no-lon", true, Some(-23.5), None),
            ])
        });

        let churches = load_churches(&store).await.unwrap();
        let ids: Vec<_> = churches.iter().map(|c| c.record.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert!(churches[0].maps_url.starts_with("https://www.google.com/maps/search/"));
    }

    #[tokio::test]
    async fn should_report_store_failures() {
        let mut store = MockListChurches::new();
        store.expect_list_active_churches().returning(|| {
            Err(RecordsError::Transport {
                details: String::from("connection refused"),
            })
        });

        let res = load_churches(&store).await;
        assert!(matches!(res, Err(ModelError::ChurchRetrieval { .. })));
    }
}
