use std::sync::Arc;

use tracing::debug;

use crate::error::DomainResult;
use crate::event::{EventKind, Spatem};
use crate::filter::SpatemFilter;
use crate::store::{EventStore, NewEventRow, NewSpatemRow, StoredEvent, StoredEventProducer};

/// Pipeline stage for spatial events. Only the primary feature is
/// stored, and only when a point geometry can be extracted from it;
/// anything else is dropped without error.
pub struct SpatemService {
    filter: Arc<dyn SpatemFilter>,
    store: Arc<dyn EventStore>,
    producer: Arc<dyn StoredEventProducer>,
}

impl SpatemService {
    pub fn new(
        filter: Arc<dyn SpatemFilter>,
        store: Arc<dyn EventStore>,
        producer: Arc<dyn StoredEventProducer>,
    ) -> Self {
        Self {
            filter,
            store,
            producer,
        }
    }

    /// Stores one spatem and publishes the confirmation.
    pub async fn store_spatem(&self, spatem: Spatem) -> DomainResult<()> {
        if !self.filter.is_passing(&spatem) {
            debug!(signature = %spatem.signature(), "spatem rejected by filter");
            return Ok(());
        }

        let Some(geometry_wkt) = spatem.point_wkt() else {
            debug!(
                signature = %spatem.signature(),
                "spatem has no extractable point geometry, dropping"
            );
            return Ok(());
        };

        let record = spatem.to_record()?;
        let store_id = self
            .store
            .insert_spatem(NewSpatemRow {
                row: NewEventRow {
                    signature: spatem.signature(),
                    occurred_at: spatem.occurred_at()?,
                    record: record.clone(),
                },
                geometry_wkt,
            })
            .await?;

        debug!(signature = %spatem.signature(), store_id, "stored spatem");

        self.producer
            .publish(&StoredEvent {
                kind: EventKind::Spatem,
                store_id,
                record,
            })
            .await
    }
}
