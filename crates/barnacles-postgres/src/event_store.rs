use async_trait::async_trait;
use tracing::debug;

use barnacles_domain::error::{DomainError, DomainResult};
use barnacles_domain::store::{EventStore, NewEventRow, NewSpatemRow};

use crate::client::PostgresClient;

/// Postgres-backed event store. Each insert is one independent
/// parameterized statement against the shared pool; the generated
/// identifier comes back via RETURNING.
#[derive(Clone)]
pub struct PostgresEventStore {
    client: PostgresClient,
}

impl PostgresEventStore {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert_raddec(&self, row: NewEventRow) -> DomainResult<i64> {
        debug!(signature = %row.signature, "inserting raddec");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::StoreError)?;

        let inserted = conn
            .query_one(
                "INSERT INTO raddecs (signature, occurred_at, record)
                 VALUES ($1, $2, $3)
                 RETURNING id",
                &[&row.signature, &row.occurred_at, &row.record],
            )
            .await
            .map_err(|e| DomainError::StoreError(e.into()))?;

        Ok(inserted.get(0))
    }

    async fn insert_dynamb(&self, row: NewEventRow) -> DomainResult<i64> {
        debug!(signature = %row.signature, "inserting dynamb");

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::StoreError)?;

        let inserted = conn
            .query_one(
                "INSERT INTO dynambs (signature, occurred_at, record)
                 VALUES ($1, $2, $3)
                 RETURNING id",
                &[&row.signature, &row.occurred_at, &row.record],
            )
            .await
            .map_err(|e| DomainError::StoreError(e.into()))?;

        Ok(inserted.get(0))
    }

    async fn insert_spatem(&self, row: NewSpatemRow) -> DomainResult<i64> {
        debug!(
            signature = %row.row.signature,
            geometry = %row.geometry_wkt,
            "inserting spatem"
        );

        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::StoreError)?;

        let inserted = conn
            .query_one(
                "INSERT INTO spatems (signature, occurred_at, record, position)
                 VALUES ($1, $2, $3, ST_GeomFromText($4, 4326))
                 RETURNING id",
                &[
                    &row.row.signature,
                    &row.row.occurred_at,
                    &row.row.record,
                    &row.geometry_wkt,
                ],
            )
            .await
            .map_err(|e| DomainError::StoreError(e.into()))?;

        Ok(inserted.get(0))
    }
}
