//! Durable record store backed by an append-only log

use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use strata_core::{CollectionMetaRow, ItemRow, RowPatch, StrataError, StrataResult};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::entry::LogEntry;
use super::format::{decode_record, encode_record, LogHeader, LogRecordError, LOG_HEADER_SIZE};
use super::mode::DurabilityMode;
use crate::contract::RecordStore;
use crate::memory::MemoryStore;

/// Name of the record log inside a store directory
pub const LOG_FILE_NAME: &str = "records.log";

/// Name of the process lock file inside a store directory
pub const LOCK_FILE_NAME: &str = "LOCK";

/// File operations the log writer relies on
trait LogFile: Write + Send {
    fn sync_data(&self) -> io::Result<()>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn sync_data(&self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.seek(SeekFrom::Start(len))?;
        Ok(())
    }
}

/// Appends framed entries and fsyncs according to the durability mode
///
/// A failed append is cut back off the file, so the log never keeps a
/// partial frame or a record whose caller saw an error.
struct LogWriter {
    file: Box<dyn LogFile>,
    mode: DurabilityMode,
    write_position: u64,
    unsynced: usize,
    last_sync: Instant,
    broken: bool,
}

impl LogWriter {
    fn new(file: impl LogFile + 'static, mode: DurabilityMode, write_position: u64) -> Self {
        LogWriter {
            file: Box::new(file),
            mode,
            write_position,
            unsynced: 0,
            last_sync: Instant::now(),
            broken: false,
        }
    }

    fn append(&mut self, entry: &LogEntry) -> StrataResult<()> {
        if self.broken {
            return Err(StrataError::internal(
                "record log could not be restored after a failed write; reopen the store",
            ));
        }
        let record = encode_record(&entry.to_bytes()?)
            .map_err(|e| StrataError::serialization(format!("frame log entry: {}", e)))?;

        let start = self.write_position;
        let unsynced = self.unsynced;
        match self.write_and_sync(&record) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.rollback(start, unsynced);
                Err(e)
            }
        }
    }

    fn write_and_sync(&mut self, record: &[u8]) -> StrataResult<()> {
        self.file.write_all(record)?;
        self.write_position += record.len() as u64;
        self.unsynced += 1;
        if self.mode.sync_due(self.unsynced, self.last_sync.elapsed()) {
            self.sync()?;
        }
        Ok(())
    }

    fn rollback(&mut self, position: u64, unsynced: usize) {
        match self.file.truncate_to(position) {
            Ok(()) => {
                warn!(target: "strata::storage", position, "Rolled back failed log append");
                self.write_position = position;
                self.unsynced = unsynced;
            }
            Err(e) => {
                error!(
                    target: "strata::storage",
                    position,
                    error = %e,
                    "Failed to roll back log append, refusing further writes"
                );
                self.broken = true;
            }
        }
    }

    fn sync(&mut self) -> StrataResult<()> {
        if self.unsynced > 0 {
            self.file.sync_data()?;
            self.unsynced = 0;
            self.last_sync = Instant::now();
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        if self.unsynced > 0 {
            let _ = self.file.sync_data();
        }
    }
}

/// Record store that survives process restarts
///
/// Live state is a [`MemoryStore`]. Every mutation is checked against it,
/// appended to the log, then applied, all while holding the writer lock, so
/// the log order is the apply order and replay rebuilds the same state
/// (including scan order).
///
/// One process at a time: the directory is guarded by an exclusive lock on
/// its `LOCK` file for as long as the store is open.
pub struct LogStore {
    dir: PathBuf,
    store_uuid: Uuid,
    state: MemoryStore,
    writer: Mutex<LogWriter>,
    replayed: usize,
    _lock: File,
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("dir", &self.dir)
            .field("store_uuid", &self.store_uuid)
            .field("replayed", &self.replayed)
            .finish()
    }
}

impl LogStore {
    /// Open (or create) a store in `dir`
    ///
    /// Replays the existing log. A torn or corrupt tail is cut off at the
    /// last intact record.
    pub fn open(dir: impl AsRef<Path>, mode: DurabilityMode) -> StrataResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(dir.join(LOCK_FILE_NAME))?;
        lock.try_lock_exclusive()
            .map_err(|_| StrataError::StoreLocked {
                path: dir.display().to_string(),
            })?;

        let path = dir.join(LOG_FILE_NAME);
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        if bytes.len() < LOG_HEADER_SIZE {
            if !bytes.is_empty() {
                warn!(
                    target: "strata::storage",
                    path = %path.display(),
                    size = bytes.len(),
                    "Record log header is incomplete, starting a fresh log"
                );
            }
            let store_uuid = Uuid::new_v4();
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&LogHeader::new(*store_uuid.as_bytes()).to_bytes())?;
            file.sync_all()?;
            info!(target: "strata::storage", path = %path.display(), %store_uuid, "Created record log");
            let writer = LogWriter::new(file, mode, LOG_HEADER_SIZE as u64);
            return Ok(Self::assemble(dir, store_uuid, MemoryStore::new(), writer, 0, lock));
        }

        let header = LogHeader::from_bytes(&bytes[..LOG_HEADER_SIZE])
            .map_err(|e| StrataError::corruption(format!("{}: {}", path.display(), e)))?;
        let store_uuid = Uuid::from_bytes(header.store_uuid);

        let state = MemoryStore::new();
        let (replayed, valid_end) = replay(&bytes, &state)?;

        if valid_end < bytes.len() {
            warn!(
                target: "strata::storage",
                path = %path.display(),
                valid_end,
                original_size = bytes.len(),
                "Truncating torn record log tail"
            );
            file.set_len(valid_end as u64)?;
            file.sync_all()?;
        }
        let write_position = file.seek(SeekFrom::End(0))?;

        info!(
            target: "strata::storage",
            path = %path.display(),
            %store_uuid,
            records = replayed,
            collections = state.item_store_count(),
            "Opened record log"
        );
        let writer = LogWriter::new(file, mode, write_position);
        Ok(Self::assemble(dir, store_uuid, state, writer, replayed, lock))
    }

    fn assemble(
        dir: PathBuf,
        store_uuid: Uuid,
        state: MemoryStore,
        writer: LogWriter,
        replayed: usize,
        lock: File,
    ) -> Self {
        LogStore {
            dir,
            store_uuid,
            state,
            writer: Mutex::new(writer),
            replayed,
            _lock: lock,
        }
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Identity written into the log header when the store was created
    pub fn store_uuid(&self) -> Uuid {
        self.store_uuid
    }

    /// Number of records replayed when the store was opened
    pub fn replayed_records(&self) -> usize {
        self.replayed
    }

    /// Durability mode in effect
    pub fn durability_mode(&self) -> DurabilityMode {
        self.writer.lock().mode
    }

    fn require_item_store(&self, collection: &str) -> StrataResult<()> {
        if self.state.item_store_exists(collection) {
            Ok(())
        } else {
            Err(StrataError::item_store_not_found(collection))
        }
    }

    fn commit(&self, writer: &mut LogWriter, entry: LogEntry) -> StrataResult<usize> {
        writer.append(&entry)?;
        entry.apply(&self.state)
    }
}

/// Replay every intact record after the header
///
/// Replay stops at a torn or checksum-failing record; everything from there
/// on is the tail to truncate. A record that passes its checksum but cannot
/// be decoded or applied is corruption.
///
/// Returns (records applied, offset just past the last intact record).
fn replay(bytes: &[u8], state: &MemoryStore) -> StrataResult<(usize, usize)> {
    let mut offset = LOG_HEADER_SIZE;
    let mut applied = 0;

    while offset < bytes.len() {
        let (payload, consumed) = match decode_record(&bytes[offset..]) {
            Ok(decoded) => decoded,
            Err(
                e @ (LogRecordError::InsufficientData
                | LogRecordError::InvalidFormat
                | LogRecordError::ChecksumMismatch { .. }),
            ) => {
                debug!(target: "strata::storage", offset, error = %e, "Replay stopped");
                break;
            }
            Err(e) => {
                return Err(StrataError::corruption(format!(
                    "record at offset {}: {}",
                    offset, e
                )))
            }
        };
        let entry = LogEntry::from_bytes(payload).map_err(|e| {
            StrataError::corruption(format!("record at offset {}: {}", offset, e))
        })?;
        entry.apply(state).map_err(|e| {
            StrataError::corruption(format!("record at offset {} does not apply: {}", offset, e))
        })?;
        applied += 1;
        offset += consumed;
    }

    Ok((applied, offset))
}

impl RecordStore for LogStore {
    fn create_item_store(&self, collection: &str) -> StrataResult<()> {
        let mut writer = self.writer.lock();
        if self.state.item_store_exists(collection) {
            return Err(StrataError::ItemStoreExists {
                collection: collection.to_string(),
            });
        }
        let entry = LogEntry::CreateItemStore {
            collection: collection.to_string(),
        };
        self.commit(&mut writer, entry).map(|_| ())
    }

    fn drop_item_store(&self, collection: &str) -> StrataResult<()> {
        let mut writer = self.writer.lock();
        self.require_item_store(collection)?;
        let entry = LogEntry::DropItemStore {
            collection: collection.to_string(),
        };
        self.commit(&mut writer, entry).map(|_| ())
    }

    fn item_store_exists(&self, collection: &str) -> bool {
        self.state.item_store_exists(collection)
    }

    fn upsert_rows(&self, collection: &str, rows: Vec<ItemRow>) -> StrataResult<()> {
        let mut writer = self.writer.lock();
        self.require_item_store(collection)?;
        if rows.is_empty() {
            return Ok(());
        }
        let entry = LogEntry::UpsertRows {
            collection: collection.to_string(),
            rows,
        };
        self.commit(&mut writer, entry).map(|_| ())
    }

    fn update_rows(&self, collection: &str, patches: Vec<RowPatch>) -> StrataResult<usize> {
        let mut writer = self.writer.lock();
        self.require_item_store(collection)?;
        if patches.is_empty() {
            return Ok(0);
        }
        let entry = LogEntry::UpdateRows {
            collection: collection.to_string(),
            patches,
        };
        self.commit(&mut writer, entry)
    }

    fn delete_rows(&self, collection: &str, ids: &[String]) -> StrataResult<usize> {
        let mut writer = self.writer.lock();
        self.require_item_store(collection)?;
        if ids.is_empty() {
            return Ok(0);
        }
        let entry = LogEntry::DeleteRows {
            collection: collection.to_string(),
            ids: ids.to_vec(),
        };
        self.commit(&mut writer, entry)
    }

    fn scan_rows(&self, collection: &str) -> StrataResult<Vec<ItemRow>> {
        self.state.scan_rows(collection)
    }

    fn read_rows_by_id(&self, collection: &str, ids: &[String]) -> StrataResult<Vec<ItemRow>> {
        self.state.read_rows_by_id(collection, ids)
    }

    fn count_rows(&self, collection: &str) -> StrataResult<usize> {
        self.state.count_rows(collection)
    }

    fn upsert_collection_meta(&self, meta: CollectionMetaRow) -> StrataResult<()> {
        let mut writer = self.writer.lock();
        self.commit(&mut writer, LogEntry::UpsertCollectionMeta { meta })
            .map(|_| ())
    }

    fn delete_collection_meta(&self, name: &str) -> StrataResult<bool> {
        let mut writer = self.writer.lock();
        if self.state.read_collection_meta(name)?.is_none() {
            return Ok(false);
        }
        let entry = LogEntry::DeleteCollectionMeta {
            name: name.to_string(),
        };
        Ok(self.commit(&mut writer, entry)? == 1)
    }

    fn read_collection_meta(&self, name: &str) -> StrataResult<Option<CollectionMetaRow>> {
        self.state.read_collection_meta(name)
    }

    fn list_collection_meta(&self) -> StrataResult<Vec<CollectionMetaRow>> {
        self.state.list_collection_meta()
    }

    fn sync(&self) -> StrataResult<()> {
        self.writer.lock().sync()
    }
}
