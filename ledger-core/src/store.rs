//! Receipt store backed by RocksDB
//!
//! Receipts live outside the replicated state view, in a metadata database
//! owned by this process. All receipts for a block are staged into one write
//! batch and committed after the whole block has been processed, so a block
//! is either fully receipted or not at all. Keys reuse the canonical
//! transaction key layout from [`crate::keys`].

use crate::config::Config;
use crate::error::Result;
use crate::ids::Id;
use crate::keys;
use crate::records::Receipt;
use rocksdb::{Options, WriteBatch, DB};

/// Persistent store for transaction receipts
pub struct ReceiptStore {
    db: DB,
}

impl std::fmt::Debug for ReceiptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptStore")
            .field("path", &self.db.path())
            .finish()
    }
}

impl ReceiptStore {
    /// Open or create the store under `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        let db = DB::open(&opts, &config.data_dir)?;
        tracing::info!(path = ?config.data_dir, "opened receipt store");
        Ok(Self { db })
    }

    /// Start a batch of receipt writes for one block
    pub fn batch(&self) -> ReceiptBatch {
        ReceiptBatch {
            inner: WriteBatch::default(),
        }
    }

    /// Commit a block's receipts atomically
    pub fn commit(&self, batch: ReceiptBatch) -> Result<()> {
        self.db.write(batch.inner)?;
        Ok(())
    }

    /// Point read of one receipt; `Ok(None)` for an unknown transaction
    pub fn get_receipt(&self, tx_id: &Id) -> Result<Option<Receipt>> {
        match self.db.get(keys::tx_key(tx_id))? {
            Some(v) => Ok(Some(Receipt::decode(&v)?)),
            None => Ok(None),
        }
    }

    /// Close the store (graceful shutdown)
    pub fn close(self) {
        drop(self.db);
        tracing::info!("receipt store closed");
    }
}

/// Staged receipt writes for a single block
pub struct ReceiptBatch {
    inner: WriteBatch,
}

impl std::fmt::Debug for ReceiptBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptBatch")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl ReceiptBatch {
    /// Stage one receipt
    pub fn store_receipt(&mut self, tx_id: &Id, timestamp: i64, success: bool, units: u64) {
        let receipt = Receipt {
            timestamp,
            success,
            units,
        };
        self.inner.put(keys::tx_key(tx_id), receipt.encode());
    }

    /// Number of staged receipts
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (ReceiptStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        (ReceiptStore::open(&config).unwrap(), temp_dir)
    }

    #[test]
    fn test_missing_receipt() {
        let (store, _temp) = test_store();
        assert!(store.get_receipt(&Id::from_data(b"nope")).unwrap().is_none());
    }

    #[test]
    fn test_batch_commit_and_read() {
        let (store, _temp) = test_store();

        let tx1 = Id::from_data(b"tx1");
        let tx2 = Id::from_data(b"tx2");
        let mut batch = store.batch();
        batch.store_receipt(&tx1, 1000, true, 72);
        batch.store_receipt(&tx2, 1000, false, 40);
        assert_eq!(batch.len(), 2);
        store.commit(batch).unwrap();

        let r1 = store.get_receipt(&tx1).unwrap().unwrap();
        assert!(r1.success);
        assert_eq!(r1.units, 72);
        assert_eq!(r1.timestamp, 1000);

        let r2 = store.get_receipt(&tx2).unwrap().unwrap();
        assert!(!r2.success);
        assert_eq!(r2.units, 40);
    }

    #[test]
    fn test_uncommitted_batch_writes_nothing() {
        let (store, _temp) = test_store();
        let tx = Id::from_data(b"tx");
        let mut batch = store.batch();
        batch.store_receipt(&tx, 5, true, 1);
        drop(batch);
        assert!(store.get_receipt(&tx).unwrap().is_none());
    }
}
