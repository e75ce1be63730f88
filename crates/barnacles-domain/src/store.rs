use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::DomainResult;
use crate::event::EventKind;

/// Row to insert for an accepted event: storage key, absolute
/// timestamp, and the transformed record as a serialized document.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventRow {
    pub signature: String,
    pub occurred_at: DateTime<Utc>,
    pub record: Value,
}

/// Spatial rows additionally carry the extracted 3D point literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpatemRow {
    pub row: NewEventRow,
    pub geometry_wkt: String,
}

/// Confirmation emitted after a successful insert: the transformed
/// record plus the database-generated identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub kind: EventKind,
    pub store_id: i64,
    pub record: Value,
}

/// Storage trait implemented by the infrastructure layer
/// (barnacles-postgres). Each insert is an independent unit of work;
/// implementations return the generated identifier.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_raddec(&self, row: NewEventRow) -> DomainResult<i64>;

    async fn insert_dynamb(&self, row: NewEventRow) -> DomainResult<i64>;

    async fn insert_spatem(&self, row: NewSpatemRow) -> DomainResult<i64>;
}

/// Publish interface for stored-event confirmations. Only invoked
/// after the corresponding insert has been acknowledged.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait StoredEventProducer: Send + Sync {
    async fn publish(&self, event: &StoredEvent) -> DomainResult<()>;
}
