//! Persistence gateway
//!
//! The store contract the harvest pipeline writes through: one snapshot
//! query of already-ingested document ids, and one multi-row insert per
//! pack. The production implementation opens a fresh connection per logical
//! operation and closes it afterward; there is no pooling and no shared
//! handle. Schema/DDL provisioning is external; the `reload_log` table is
//! assumed to exist.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Connection, MySql, MySqlConnection, QueryBuilder};
use tracing::debug;

use crate::error::Result;
use crate::record::LogRecord;

/// Store contract used by the harvest pipeline
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Snapshot of every document id already ingested
    async fn existing_ids(&self) -> Result<HashSet<String>>;

    /// Insert all records as one batched statement; returns rows affected
    async fn insert_batch(&self, records: &[LogRecord]) -> Result<u64>;
}

/// MySQL-backed gateway
pub struct MySqlLogStore {
    database_url: String,
}

impl MySqlLogStore {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    async fn connect(&self) -> Result<MySqlConnection> {
        Ok(MySqlConnection::connect(&self.database_url).await?)
    }
}

#[async_trait]
impl PersistenceGateway for MySqlLogStore {
    async fn existing_ids(&self) -> Result<HashSet<String>> {
        let mut conn = self.connect().await?;

        let ids: Vec<String> = sqlx::query_scalar("SELECT document_id FROM reload_log")
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        debug!("Fetched {} existing document ids", ids.len());
        Ok(ids.into_iter().collect())
    }

    async fn insert_batch(&self, records: &[LogRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connect().await?;

        let mut query_builder: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO reload_log \
             (event, status_message, status_code, log_date, document_id, relative_path) ",
        );
        query_builder.push_values(records, |mut b, record| {
            b.push_bind(&record.event)
                .push_bind(&record.status_message)
                .push_bind(record.status_code.as_str())
                .push_bind(record.date)
                .push_bind(&record.document_id)
                .push_bind(&record.relative_path);
        });

        let affected = query_builder
            .build()
            .execute(&mut conn)
            .await?
            .rows_affected();
        conn.close().await?;

        Ok(affected)
    }
}
