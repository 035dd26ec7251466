use log::{info, warn};

use crate::{
    error::Result,
    stats_table::StatsTable,
    store::{BlobStore, ObjectStoreGateway},
};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub objects_read: usize,
    pub rows: usize,
    pub columns: Vec<String>,
    pub written: bool,
}

/// Merges every raw object of one bucket into a single table.
pub struct Consolidator<'a, B> {
    gateway: &'a ObjectStoreGateway<B>,
}

impl<'a, B: BlobStore> Consolidator<'a, B> {
    pub fn new(gateway: &'a ObjectStoreGateway<B>) -> Self {
        Self { gateway }
    }

    /// Reads all objects in `source_bucket` and concatenates them in listing
    /// order. The first table's columns are canonical. Any other column set is
    /// a schema mismatch and nothing is written. An empty source writes nothing.
    pub async fn consolidate(
        &self,
        source_bucket: &str,
        dest_bucket: &str,
        dest_key: &str,
    ) -> Result<ConsolidationReport> {
        let keys = self.gateway.list(source_bucket).await?;
        // A previous unified artifact in the same bucket is not raw input.
        let keys: Vec<String> = keys
            .into_iter()
            .filter(|key| !(source_bucket == dest_bucket && key == dest_key))
            .collect();
        info!("Consolidating {} objects from '{source_bucket}'", keys.len());

        let mut unified: Option<StatsTable> = None;
        let mut objects_read = 0;
        for key in &keys {
            let table = self.gateway.get(source_bucket, key).await?;
            // A zero-byte object carries no schema to merge against.
            if !table.has_columns() {
                warn!("Object '{key}' in '{source_bucket}' has no columns. Skipping...");
                continue;
            }
            objects_read += 1;
            unified = match unified.take() {
                None => Some(table),
                Some(mut merged) => {
                    merged.append(table, key)?;
                    Some(merged)
                }
            };
        }

        let Some(unified) = unified else {
            info!("Bucket '{source_bucket}' has no tables, nothing to write");
            return Ok(ConsolidationReport::default());
        };

        self.gateway.ensure_bucket(dest_bucket).await?;
        self.gateway.put(dest_bucket, dest_key, &unified).await?;
        info!(
            "Wrote '{dest_key}' to '{dest_bucket}': {} rows from {} objects",
            unified.row_count(),
            objects_read
        );
        Ok(ConsolidationReport {
            objects_read,
            rows: unified.row_count(),
            columns: unified.columns().to_vec(),
            written: true,
        })
    }
}
