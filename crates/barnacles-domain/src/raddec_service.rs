use std::sync::Arc;

use tracing::debug;

use crate::error::DomainResult;
use crate::event::{EventKind, Raddec};
use crate::filter::RaddecFilter;
use crate::store::{EventStore, NewEventRow, StoredEvent, StoredEventProducer};

/// Pipeline stage for location events: filter gate, flatten, insert,
/// confirm.
pub struct RaddecService {
    filter: Arc<dyn RaddecFilter>,
    include_packets: bool,
    store: Arc<dyn EventStore>,
    producer: Arc<dyn StoredEventProducer>,
}

impl RaddecService {
    pub fn new(
        filter: Arc<dyn RaddecFilter>,
        include_packets: bool,
        store: Arc<dyn EventStore>,
        producer: Arc<dyn StoredEventProducer>,
    ) -> Self {
        Self {
            filter,
            include_packets,
            store,
            producer,
        }
    }

    /// Stores one raddec and publishes the confirmation. A rejected
    /// raddec is dropped before any transform work.
    pub async fn store_raddec(&self, raddec: Raddec) -> DomainResult<()> {
        if !self.filter.is_passing(&raddec) {
            debug!(signature = %raddec.signature(), "raddec rejected by filter");
            return Ok(());
        }

        let record = raddec.to_record(self.include_packets)?;
        let store_id = self
            .store
            .insert_raddec(NewEventRow {
                signature: raddec.signature(),
                occurred_at: raddec.occurred_at()?,
                record: record.clone(),
            })
            .await?;

        debug!(signature = %raddec.signature(), store_id, "stored raddec");

        self.producer
            .publish(&StoredEvent {
                kind: EventKind::Raddec,
                store_id,
                record,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::event::RssiObservation;
    use crate::filter::MockRaddecFilter;
    use crate::store::{MockEventStore, MockStoredEventProducer};
    use chrono::DateTime;

    fn sample_raddec() -> Raddec {
        Raddec {
            transmitter_id: "aabbccddeeff".to_string(),
            transmitter_id_type: 2,
            rssi_signature: vec![RssiObservation {
                receiver_id: "001bc50940810000".to_string(),
                receiver_id_type: 1,
                rssi: -72,
                number_of_decodings: Some(3),
            }],
            initial_time: 1_700_000_000_000,
            packets: Some(vec!["061b554433221100".to_string()]),
        }
    }

    fn passing_filter() -> MockRaddecFilter {
        let mut filter = MockRaddecFilter::new();
        filter.expect_is_passing().return_const(true);
        filter
    }

    #[tokio::test]
    async fn test_accepted_raddec_inserts_once_and_publishes_once() {
        let mut store = MockEventStore::new();
        store
            .expect_insert_raddec()
            .withf(|row: &NewEventRow| {
                row.signature == "aabbccddeeff/2"
                    && row.occurred_at
                        == DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
                    && row.record.get("packets").is_none()
            })
            .times(1)
            .return_once(|_| Ok(41));

        let mut producer = MockStoredEventProducer::new();
        producer
            .expect_publish()
            .withf(|event: &StoredEvent| {
                event.kind == EventKind::Raddec
                    && event.store_id == 41
                    && event.record["transmitterId"] == "aabbccddeeff"
            })
            .times(1)
            .return_once(|_| Ok(()));

        let service = RaddecService::new(
            Arc::new(passing_filter()),
            false,
            Arc::new(store),
            Arc::new(producer),
        );

        assert!(service.store_raddec(sample_raddec()).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_raddec_is_dropped_silently() {
        let mut filter = MockRaddecFilter::new();
        filter.expect_is_passing().times(1).return_const(false);

        let mut store = MockEventStore::new();
        store.expect_insert_raddec().times(0);
        let mut producer = MockStoredEventProducer::new();
        producer.expect_publish().times(0);

        let service = RaddecService::new(
            Arc::new(filter),
            false,
            Arc::new(store),
            Arc::new(producer),
        );

        assert!(service.store_raddec(sample_raddec()).await.is_ok());
    }

    #[tokio::test]
    async fn test_include_packets_option_keeps_packets() {
        let mut store = MockEventStore::new();
        store
            .expect_insert_raddec()
            .withf(|row: &NewEventRow| row.record.get("packets").is_some())
            .times(1)
            .return_once(|_| Ok(1));

        let mut producer = MockStoredEventProducer::new();
        producer.expect_publish().times(1).return_once(|_| Ok(()));

        let service = RaddecService::new(
            Arc::new(passing_filter()),
            true,
            Arc::new(store),
            Arc::new(producer),
        );

        assert!(service.store_raddec(sample_raddec()).await.is_ok());
    }

    #[tokio::test]
    async fn test_insert_failure_does_not_publish() {
        let mut store = MockEventStore::new();
        store
            .expect_insert_raddec()
            .times(1)
            .return_once(|_| Err(DomainError::StoreError(anyhow::anyhow!("insert failed"))));

        let mut producer = MockStoredEventProducer::new();
        producer.expect_publish().times(0);

        let service = RaddecService::new(
            Arc::new(passing_filter()),
            false,
            Arc::new(store),
            Arc::new(producer),
        );

        let result = service.store_raddec(sample_raddec()).await;
        assert!(matches!(result, Err(DomainError::StoreError(_))));
    }
}
