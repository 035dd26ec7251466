//! Bucket-oriented object storage and the CSV gateway on top of it.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use log::info;

use crate::{
    error::{Error, Result},
    stats_table::StatsTable,
};

/// Raw primitives of a blob store such as MinIO or S3.
///
/// `get_object` must report a missing key as [`Error::NotFound`] and keep
/// [`Error::Store`] for transport or permission failures.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;
    async fn create_bucket(&self, bucket: &str) -> Result<()>;
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    /// All keys in the bucket, in the store's listing order.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>>;
}

/// Reads and writes [`StatsTable`]s as CSV objects.
pub struct ObjectStoreGateway<B> {
    blobs: B,
}

impl<B: BlobStore> ObjectStoreGateway<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Creates the bucket unless it already exists.
    pub async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        if self.blobs.bucket_exists(bucket).await? {
            info!("Bucket '{bucket}' already exists");
            return Ok(());
        }
        self.blobs.create_bucket(bucket).await?;
        info!("Bucket '{bucket}' created");
        Ok(())
    }

    /// Stores `table` as CSV, replacing whatever was at `key`.
    pub async fn put(&self, bucket: &str, key: &str, table: &StatsTable) -> Result<()> {
        let body = table.to_csv()?;
        self.blobs.put_object(bucket, key, body).await?;
        info!("Stored '{key}' in bucket '{bucket}' ({} rows)", table.row_count());
        Ok(())
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Result<StatsTable> {
        let body = self.blobs.get_object(bucket, key).await?;
        StatsTable::from_csv(&body)
    }

    /// Like [`Self::get`], but a missing object is `Ok(None)`.
    pub async fn try_get(&self, bucket: &str, key: &str) -> Result<Option<StatsTable>> {
        match self.get(bucket, key).await {
            Ok(table) => Ok(Some(table)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, bucket: &str) -> Result<Vec<String>> {
        self.blobs.list_objects(bucket).await
    }
}

/// In-process [`BlobStore`], used in tests and for local dry runs.
#[derive(Default)]
pub struct MemoryBlobStore {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
    rejected_keys: Mutex<HashSet<String>>,
    puts: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put_object` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Makes every put or get of `key` fail with a store error.
    pub fn reject_key(&self, key: &str) -> Result<()> {
        self.rejected_keys
            .lock()
            .map_err(|_| poisoned())?
            .insert(key.to_string());
        Ok(())
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .lock()
            .ok()?
            .get(bucket)?
            .get(key)
            .cloned()
    }

    fn check_rejected(&self, key: &str) -> Result<()> {
        if self.rejected_keys.lock().map_err(|_| poisoned())?.contains(key) {
            return Err(Error::store(format!("access denied for '{key}'")));
        }
        Ok(())
    }
}

fn poisoned() -> Error {
    Error::store("memory store lock poisoned")
}

fn no_such_bucket(bucket: &str) -> Error {
    Error::store(format!("no such bucket '{bucket}'"))
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(self.buckets.lock().map_err(|_| poisoned())?.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.buckets
            .lock()
            .map_err(|_| poisoned())?
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.check_rejected(key)?;
        let mut buckets = self.buckets.lock().map_err(|_| poisoned())?;
        let objects = buckets.get_mut(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        objects.insert(key.to_string(), body);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.check_rejected(key)?;
        let buckets = self.buckets.lock().map_err(|_| poisoned())?;
        let objects = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(bucket, key))
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let buckets = self.buckets.lock().map_err(|_| poisoned())?;
        let objects = buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket))?;
        Ok(objects.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats_table::Cell;

    fn points_table() -> StatsTable {
        StatsTable::new(
            vec!["PLAYER_ID".to_string(), "PTS".to_string()],
            vec![
                vec![Cell::Int(1), Cell::Int(20)],
                vec![Cell::Int(2), Cell::Int(15)],
            ],
        )
        .unwrap()
    }

    async fn gateway_with_bucket(bucket: &str) -> ObjectStoreGateway<MemoryBlobStore> {
        let gateway = ObjectStoreGateway::new(MemoryBlobStore::new());
        gateway.ensure_bucket(bucket).await.unwrap();
        gateway
    }

    #[tokio::test]
    async fn ensure_bucket_is_idempotent() {
        let gateway = gateway_with_bucket("raw-nba").await;
        gateway.put("raw-nba", "a.csv", &points_table()).await.unwrap();
        gateway.ensure_bucket("raw-nba").await.unwrap();
        assert_eq!(gateway.list("raw-nba").await.unwrap(), vec!["a.csv"]);
    }

    #[tokio::test]
    async fn table_round_trips_through_store() {
        let gateway = gateway_with_bucket("raw-nba").await;
        let table = points_table();
        gateway.put("raw-nba", "points.csv", &table).await.unwrap();

        let stored = gateway.blobs().object("raw-nba", "points.csv").unwrap();
        assert_eq!(stored, b"PLAYER_ID,PTS\n1,20\n2,15\n");
        assert_eq!(gateway.get("raw-nba", "points.csv").await.unwrap(), table);
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let gateway = gateway_with_bucket("raw-nba").await;
        gateway.put("raw-nba", "k.csv", &points_table()).await.unwrap();
        let newer = StatsTable::new(
            vec!["PLAYER_ID".to_string(), "PTS".to_string()],
            vec![vec![Cell::Int(3), Cell::Int(40)]],
        )
        .unwrap();
        gateway.put("raw-nba", "k.csv", &newer).await.unwrap();

        assert_eq!(gateway.list("raw-nba").await.unwrap().len(), 1);
        assert_eq!(gateway.get("raw-nba", "k.csv").await.unwrap(), newer);
    }

    #[tokio::test]
    async fn missing_key_is_not_found_not_store_error() {
        let gateway = gateway_with_bucket("raw-nba").await;
        let err = gateway.get("raw-nba", "missing.csv").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        gateway.blobs().reject_key("denied.csv").unwrap();
        let err = gateway.get("raw-nba", "denied.csv").await.unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
    }

    #[tokio::test]
    async fn try_get_maps_only_missing_keys_to_none() {
        let gateway = gateway_with_bucket("raw-nba").await;
        assert_eq!(gateway.try_get("raw-nba", "missing.csv").await.unwrap(), None);

        gateway.blobs().reject_key("denied.csv").unwrap();
        assert!(gateway.try_get("raw-nba", "denied.csv").await.is_err());
    }

    #[tokio::test]
    async fn empty_bucket_lists_nothing() {
        let gateway = gateway_with_bucket("raw-nba").await;
        assert!(gateway.list("raw-nba").await.unwrap().is_empty());
    }
}
