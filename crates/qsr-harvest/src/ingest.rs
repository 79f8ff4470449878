//! Batch ingestor
//!
//! Partitions new log files into fixed-size packs and processes the packs
//! sequentially: records are extracted with bounded concurrency, then each
//! pack is written to the store as one batched insert. Failures are
//! contained at the smallest unit: a malformed file is skipped, a failed
//! pack insert does not abort later packs.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use qsr_common::pool::WorkerPool;

use crate::dedup;
use crate::error::Result;
use crate::record;
use crate::store::PersistenceGateway;

/// Number of log files processed and persisted as one batch. Bounds both
/// per-pack memory and the size of the generated insert statement.
pub const PACK_SIZE: usize = 50;

/// Counters for one ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestStats {
    /// Packs processed (including packs with nothing to insert)
    pub packs: usize,

    /// Records successfully extracted
    pub extracted: usize,

    /// Files skipped because extraction failed
    pub skipped_files: usize,

    /// Rows reported inserted by the store
    pub inserted_rows: u64,

    /// Packs whose batch insert failed
    pub failed_packs: usize,

    /// Wall time of the ingestion phase
    pub elapsed: Duration,
}

/// Runs the parse-and-persist phase over deduplicated log files
pub struct BatchIngestor<'a, G> {
    gateway: &'a G,
    pool: &'a WorkerPool,
}

impl<'a, G: PersistenceGateway> BatchIngestor<'a, G> {
    pub fn new(gateway: &'a G, pool: &'a WorkerPool) -> Self {
        Self { gateway, pool }
    }

    /// Ingest every file, one batched insert per pack of [`PACK_SIZE`].
    pub async fn ingest(&self, files: &[PathBuf]) -> IngestStats {
        let start = Instant::now();
        let mut stats = IngestStats::default();

        if files.is_empty() {
            info!("No new log files to ingest");
            stats.elapsed = start.elapsed();
            return stats;
        }

        info!(
            "Ingesting {} log files in packs of {} (concurrency={})",
            files.len(),
            PACK_SIZE,
            self.pool.limit()
        );

        for (index, pack) in files.chunks(PACK_SIZE).enumerate() {
            stats.packs += 1;

            let results = self
                .pool
                .run_all(pack.iter().cloned(), |path| async move {
                    let result = record::extract(&path);
                    (path, result)
                })
                .await;

            let mut records = Vec::with_capacity(results.len());
            for (path, result) in results {
                match result {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        stats.skipped_files += 1;
                        warn!("Skipping {}: {}", path.display(), e);
                    },
                }
            }

            if records.is_empty() {
                info!("Pack {}: no extractable records, nothing to insert", index + 1);
                continue;
            }

            stats.extracted += records.len();

            match self.gateway.insert_batch(&records).await {
                Ok(rows) => {
                    stats.inserted_rows += rows;
                    info!("Pack {}: inserted {} rows", index + 1, rows);
                },
                Err(e) => {
                    stats.failed_packs += 1;
                    error!("Pack {}: batch insert failed: {}", index + 1, e);
                },
            }
        }

        stats.elapsed = start.elapsed();
        info!(
            "Ingestion finished: {} rows inserted across {} packs, {} files skipped, in {:.2}s",
            stats.inserted_rows,
            stats.packs,
            stats.skipped_files,
            stats.elapsed.as_secs_f64()
        );

        stats
    }
}

/// Run the full harvest phase: snapshot the store, dedup, ingest.
///
/// A failed snapshot query aborts only this phase; the reload phase has
/// already completed by the time this runs.
pub async fn harvest<G: PersistenceGateway>(
    gateway: &G,
    pool: &WorkerPool,
    log_files: Vec<PathBuf>,
) -> Result<IngestStats> {
    let existing = gateway.existing_ids().await?;
    debug!("{} document ids already ingested", existing.len());

    let candidates = log_files.len();
    let fresh = dedup::filter_new(log_files, &existing);
    info!("{} of {} log files are new", fresh.len(), candidates);

    Ok(BatchIngestor::new(gateway, pool).ingest(&fresh).await)
}
