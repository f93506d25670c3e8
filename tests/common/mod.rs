//! Shared test utilities for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use tempfile::TempDir;

pub use serde_json::{json, Value as JsonValue};
pub use stratavec::{
    AddRequest, Database, DeleteRequest, DocumentFilter, GetRequest, Include, MetadataFilter,
    QueryRequest, StrataConfig, UpdateRequest, VectorError, VectorStore, CONFIG_FILE_NAME,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route engine logs to the test harness output.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Create a StrataConfig with always durability mode.
pub fn always_config() -> StrataConfig {
    StrataConfig {
        durability: "always".to_string(),
        ..StrataConfig::default()
    }
}

// ============================================================================
// TestDb
// ============================================================================

/// Disk-backed test database in a temporary directory.
pub struct TestDb {
    pub db: Arc<Database>,
    pub dir: TempDir,
}

impl TestDb {
    /// Create a test database with standard durability (default).
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open(dir.path()).expect("Failed to create test database");
        TestDb { db, dir }
    }

    /// Create a test database with always durability.
    pub fn new_strict() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open_with_config(dir.path(), always_config())
            .expect("Failed to create test database");
        TestDb { db, dir }
    }

    pub fn vector(&self) -> VectorStore {
        VectorStore::new(self.db.clone())
    }

    pub fn db_path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the record log.
    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join(stratavec::LOG_FILE_NAME)
    }

    /// Reopen the database (simulates restart).
    ///
    /// Every VectorStore obtained from this TestDb must be dropped first.
    pub fn reopen(&mut self) {
        let path = self.dir.path().to_path_buf();
        drop(std::mem::replace(&mut self.db, Database::ephemeral()));
        self.db = Database::open(&path).expect("Failed to reopen database");
    }
}

impl Default for TestDb {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// In-memory vector store.
pub fn ephemeral_vector() -> VectorStore {
    init_tracing();
    VectorStore::new(Database::ephemeral())
}

/// Ephemeral and disk-backed stores for cross-mode testing.
pub fn all_mode_stores() -> Vec<(&'static str, VectorStore, Option<TempDir>)> {
    let standard = TestDb::new();
    let strict = TestDb::new_strict();
    vec![
        ("ephemeral", ephemeral_vector(), None),
        ("standard", standard.vector(), Some(standard.dir)),
        ("always", strict.vector(), Some(strict.dir)),
    ]
}

/// Deterministic embedding function: letter frequencies of a-d.
pub fn letter_embedder(texts: &[String]) -> Vec<Vec<f32>> {
    texts
        .iter()
        .map(|text| {
            ['a', 'b', 'c', 'd']
                .iter()
                .map(|letter| text.chars().filter(|c| c == letter).count() as f32 + 0.01)
                .collect()
        })
        .collect()
}

/// Add `ids` with the given 2-d embeddings, no documents or metadata.
pub fn add_points(vector: &VectorStore, collection: &str, points: &[(&str, [f32; 2])]) {
    let ids: Vec<&str> = points.iter().map(|(id, _)| *id).collect();
    let embeddings = points.iter().map(|(_, e)| e.to_vec()).collect();
    vector
        .add(collection, AddRequest::new(ids).embeddings(embeddings))
        .expect("add points");
}
