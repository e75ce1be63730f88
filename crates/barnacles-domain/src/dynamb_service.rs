use std::sync::Arc;

use tracing::debug;

use crate::error::DomainResult;
use crate::event::{Dynamb, EventKind};
use crate::filter::DynambFilter;
use crate::store::{EventStore, NewEventRow, StoredEvent, StoredEventProducer};

/// Pipeline stage for dynamic-ambient events. The raw time-series
/// property is stripped from every stored record, whether or not the
/// filter gate looked at it.
pub struct DynambService {
    filter: Arc<dyn DynambFilter>,
    store: Arc<dyn EventStore>,
    producer: Arc<dyn StoredEventProducer>,
}

impl DynambService {
    pub fn new(
        filter: Arc<dyn DynambFilter>,
        store: Arc<dyn EventStore>,
        producer: Arc<dyn StoredEventProducer>,
    ) -> Self {
        Self {
            filter,
            store,
            producer,
        }
    }

    /// Stores one dynamb and publishes the confirmation.
    pub async fn store_dynamb(&self, dynamb: Dynamb) -> DomainResult<()> {
        if !self.filter.is_passing(&dynamb) {
            debug!(signature = %dynamb.signature(), "dynamb rejected by filter");
            return Ok(());
        }

        let record = dynamb.to_record()?;
        let store_id = self
            .store
            .insert_dynamb(NewEventRow {
                signature: dynamb.signature(),
                occurred_at: dynamb.occurred_at()?,
                record: record.clone(),
            })
            .await?;

        debug!(signature = %dynamb.signature(), store_id, "stored dynamb");

        self.producer
            .publish(&StoredEvent {
                kind: EventKind::Dynamb,
                store_id,
                record,
            })
            .await
    }
}
