//! Database: record store handle plus configuration
//!
//! A `Database` owns the one [`RecordStore`] every primitive reads and writes
//! through. Disk-backed databases use a [`LogStore`] in the data directory and
//! read `strata.toml` from it; ephemeral databases use a [`MemoryStore`] and
//! touch no files.
//!
//! # Example
//!
//! ```text
//! use strata_engine::{Database, VectorStore};
//!
//! let db = Database::open("/path/to/data")?;
//! let vectors = VectorStore::new(db.clone());
//! ```

pub mod config;

pub use config::{StrataConfig, VectorSettings, CONFIG_FILE_NAME};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_core::StrataResult;
use strata_storage::{LogStore, MemoryStore, RecordStore};
use tracing::info;

/// Handle to one record store and its configuration
pub struct Database {
    /// Data directory (None for ephemeral databases)
    data_dir: Option<PathBuf>,
    /// Shared record store
    store: Arc<dyn RecordStore>,
    /// Configuration in effect
    config: StrataConfig,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("data_dir", &self.data_dir)
            .field("config", &self.config)
            .finish()
    }
}

impl Database {
    /// Open a disk-backed database, creating the directory if needed
    ///
    /// Writes a default `strata.toml` on first open, then reads it.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid, the directory is locked by another
    /// process, or the record log cannot be read.
    pub fn open(path: impl AsRef<Path>) -> StrataResult<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        StrataConfig::write_default_if_missing(&config_path)?;
        let config = StrataConfig::from_file(&config_path)?;

        Self::open_dir(data_dir, config)
    }

    /// Open a disk-backed database with an explicit configuration
    ///
    /// The configuration is written to `strata.toml`, replacing what was there.
    pub fn open_with_config(path: impl AsRef<Path>, config: StrataConfig) -> StrataResult<Arc<Self>> {
        config.validate()?;
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        config.write_to_file(&data_dir.join(CONFIG_FILE_NAME))?;

        Self::open_dir(data_dir, config)
    }

    fn open_dir(data_dir: PathBuf, config: StrataConfig) -> StrataResult<Arc<Self>> {
        let mode = config.durability_mode()?;
        let store = LogStore::open(&data_dir, mode)?;
        info!(
            target: "strata::db",
            path = %data_dir.display(),
            durability = %config.durability,
            replayed = store.replayed_records(),
            "Database opened"
        );
        Ok(Arc::new(Database {
            data_dir: Some(data_dir),
            store: Arc::new(store),
            config,
        }))
    }

    /// Create an in-memory database with default configuration
    pub fn ephemeral() -> Arc<Self> {
        Self::with_store(Arc::new(MemoryStore::new()), StrataConfig::default())
    }

    /// Wrap an existing record store
    pub fn with_store(store: Arc<dyn RecordStore>, config: StrataConfig) -> Arc<Self> {
        Arc::new(Database {
            data_dir: None,
            store,
            config,
        })
    }

    /// The record store
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// The configuration in effect
    pub fn config(&self) -> &StrataConfig {
        &self.config
    }

    /// Data directory, if disk-backed
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// True for databases that write no files
    pub fn is_ephemeral(&self) -> bool {
        self.data_dir.is_none()
    }

    /// Force buffered writes to stable storage
    pub fn flush(&self) -> StrataResult<()> {
        self.store.sync()
    }
}
