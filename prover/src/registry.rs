//! Append-only file registry persisted in sled.
//!
//! Records get dense sequential IDs starting at 1, so a contiguous
//! `[start, end]` query returns exactly the records created in that order.
//! Keys are big-endian IDs, which keeps sled's byte ordering equal to ID
//! ordering and makes range scans cheap.

use anyhow::{Context, ensure};
use da_circuits::Commitment;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sled::Transactional;
use sled::transaction::ConflictableTransactionError;
use std::convert::Infallible;
use std::path::Path;
use tracing::{debug, info, warn};

/// A file committed to the prover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub id: u64,
    pub commitment: Commitment,
    /// Handle into the storage backend
    pub content_id: String,
    pub size_bytes: i64,
    /// Unix timestamp after which the file no longer has to be provable
    pub expiration: i64,
}

/// Fields supplied when appending a record; the registry assigns the ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFileRecord {
    pub commitment: Commitment,
    pub content_id: String,
    pub size_bytes: i64,
    pub expiration: i64,
}

impl NewFileRecord {
    /// Attach the ID assigned by a registry.
    pub fn into_record(self, id: u64) -> FileRecord {
        FileRecord {
            id,
            commitment: self.commitment,
            content_id: self.content_id,
            size_bytes: self.size_bytes,
            expiration: self.expiration,
        }
    }
}

/// Persistent record stored in sled (bincode serialized).
///
/// The commitment is kept in its 48-byte compressed form.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct PersistentFileRecord {
    commitment: Vec<u8>,
    content_id: String,
    size_bytes: i64,
    expiration: i64,
}

impl PersistentFileRecord {
    fn from_new(record: &NewFileRecord) -> Self {
        Self {
            commitment: record.commitment.to_bytes(),
            content_id: record.content_id.clone(),
            size_bytes: record.size_bytes,
            expiration: record.expiration,
        }
    }

    fn into_record(self, id: u64) -> anyhow::Result<FileRecord> {
        Ok(FileRecord {
            id,
            commitment: Commitment::from_bytes(&self.commitment)
                .with_context(|| format!("file {} has an invalid commitment", id))?,
            content_id: self.content_id,
            size_bytes: self.size_bytes,
            expiration: self.expiration,
        })
    }
}

/// Registry operations used by the sampler and the registration path.
pub trait FileRegistry: Send + Sync {
    /// Append a record and return its ID.
    fn create_file_record(&self, record: NewFileRecord) -> anyhow::Result<u64>;

    /// Records with `start <= id <= end`, in ID order.
    fn get_range_file_info(&self, start: u64, end: u64) -> anyhow::Result<Vec<FileRecord>>;

    /// Number of records; also the highest assigned ID.
    fn get_file_count(&self) -> anyhow::Result<u64>;
}

const FILES_TREE: &str = "files";
const META_TREE: &str = "meta";
const COUNT_KEY: &[u8] = b"file_count";

fn parse_id(key: &[u8]) -> anyhow::Result<u64> {
    Ok(u64::from_be_bytes(
        key.try_into().context("file key is not a big-endian u64")?,
    ))
}

/// Sled-backed [`FileRegistry`].
pub struct SledFileRegistry {
    db: sled::Db,
    files_tree: sled::Tree,
    meta_tree: sled::Tree,
    /// Highest assigned ID; the lock serializes appends
    count: Mutex<u64>,
}

impl SledFileRegistry {
    /// Open sled database and recover the record counter.
    pub fn open(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = sled::open(db_path)?;
        let files_tree = db.open_tree(FILES_TREE)?;
        let meta_tree = db.open_tree(META_TREE)?;

        // Records and the counter are written in one transaction, so the
        // highest record key is the count. The stored counter only confirms it.
        let count = match files_tree.last()? {
            Some((key, _)) => parse_id(&key)?,
            None => 0,
        };
        ensure!(
            files_tree.len() as u64 == count,
            "registry has {} records but the highest ID is {}",
            files_tree.len(),
            count
        );

        let stored = meta_tree
            .get(COUNT_KEY)?
            .map(|v| bincode::deserialize::<u64>(&v));
        match stored {
            Some(Ok(stored)) if stored == count => {}
            None if count == 0 => {}
            other => {
                warn!(
                    stored = ?other.as_ref().map(|r| r.as_ref().ok()),
                    recovered = count,
                    "Persisted file count disagrees with the records, rewriting it"
                );
                meta_tree
                    .insert(COUNT_KEY, bincode::serialize(&count)?)
                    .context("failed to rewrite file count")?;
            }
        }

        info!(files = count, db_path = %db_path.display(), "File registry opened");

        Ok(Self {
            db,
            files_tree,
            meta_tree,
            count: Mutex::new(count),
        })
    }

    /// Get a single record.
    pub fn get_file(&self, id: u64) -> anyhow::Result<Option<FileRecord>> {
        if id == 0 || id > *self.count.lock() {
            return Ok(None);
        }
        match self.files_tree.get(id.to_be_bytes())? {
            Some(bytes) => {
                let persistent: PersistentFileRecord = bincode::deserialize(&bytes)?;
                Ok(Some(persistent.into_record(id)?))
            }
            None => Ok(None),
        }
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> anyhow::Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl FileRegistry for SledFileRegistry {
    fn create_file_record(&self, record: NewFileRecord) -> anyhow::Result<u64> {
        let bytes = bincode::serialize(&PersistentFileRecord::from_new(&record))?;

        let mut count = self.count.lock();
        let id = *count + 1;
        let id_bytes = bincode::serialize(&id)?;
        (&self.files_tree, &self.meta_tree)
            .transaction(|(files, meta)| {
                files.insert(id.to_be_bytes().to_vec(), bytes.clone())?;
                meta.insert(COUNT_KEY, id_bytes.clone())?;
                Ok::<_, ConflictableTransactionError<Infallible>>(())
            })
            .context("failed to store file record")?;
        *count = id;

        debug!(
            id,
            content_id = %record.content_id,
            size_bytes = record.size_bytes,
            expiration = record.expiration,
            "File record created"
        );
        Ok(id)
    }

    fn get_range_file_info(&self, start: u64, end: u64) -> anyhow::Result<Vec<FileRecord>> {
        let start = start.max(1);
        let end = end.min(*self.count.lock());
        if start > end {
            return Ok(Vec::new());
        }

        let mut records = Vec::with_capacity((end - start + 1) as usize);
        for entry in self.files_tree.range(start.to_be_bytes()..=end.to_be_bytes()) {
            let (key, value) = entry?;
            let id = parse_id(&key)?;
            let persistent: PersistentFileRecord = bincode::deserialize(&value)
                .with_context(|| format!("file {} is corrupted", id))?;
            records.push(persistent.into_record(id)?);
        }

        Ok(records)
    }

    fn get_file_count(&self) -> anyhow::Result<u64> {
        Ok(*self.count.lock())
    }
}
