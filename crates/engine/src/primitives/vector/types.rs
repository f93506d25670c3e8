//! Request and result types for vector operations

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use strata_core::Timestamp;

use crate::primitives::vector::filter::{DocumentFilter, MetadataFilter};
use crate::primitives::vector::{VectorError, VectorResult};

/// A registered collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique collection name
    pub name: String,
    /// Collection metadata (always a JSON object)
    pub metadata: JsonValue,
    /// Creation time
    pub created_at: Timestamp,
}

/// One decoded item
#[derive(Debug, Clone, PartialEq)]
pub struct VectorItem {
    /// Item id (unique within its collection)
    pub id: String,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// Optional document text
    pub document: Option<String>,
    /// Optional metadata object
    pub metadata: Option<JsonValue>,
    /// Insert time
    pub created_at: Timestamp,
}

/// Which parallel lists a read returns
///
/// `ids` are always returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Include {
    /// Return embeddings
    pub embeddings: bool,
    /// Return documents
    pub documents: bool,
    /// Return metadatas
    pub metadatas: bool,
    /// Return distances (queries only)
    pub distances: bool,
}

impl Include {
    /// Every field; the default for queries
    pub fn all() -> Self {
        Include {
            embeddings: true,
            documents: true,
            metadatas: true,
            distances: true,
        }
    }

    /// Embeddings, documents and metadatas; the default for `get`
    pub fn stored() -> Self {
        Include {
            distances: false,
            ..Self::all()
        }
    }

    /// Ids only
    pub fn ids_only() -> Self {
        Include {
            embeddings: false,
            documents: false,
            metadatas: false,
            distances: false,
        }
    }

    /// Parse field names: `embeddings`, `documents`, `metadatas`, `distances`
    ///
    /// An empty list selects nothing but ids.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> VectorResult<Self> {
        let mut include = Self::ids_only();
        for name in names {
            match name.as_ref() {
                "embeddings" => include.embeddings = true,
                "documents" => include.documents = true,
                "metadatas" => include.metadatas = true,
                "distances" => include.distances = true,
                other => {
                    return Err(VectorError::InvalidArgument(format!(
                        "unknown include field '{}'",
                        other
                    )))
                }
            }
        }
        Ok(include)
    }
}

impl Default for Include {
    fn default() -> Self {
        Self::all()
    }
}

fn collect_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

fn collect_metadatas<I, M>(values: I) -> Vec<Option<JsonValue>>
where
    I: IntoIterator<Item = M>,
    M: Into<Option<JsonValue>>,
{
    values.into_iter().map(Into::into).collect()
}

/// Insert-or-replace a batch of items
///
/// # Example
///
/// ```text
/// let req = AddRequest::new(["1", "2"])
///     .embeddings(vec![vec![1.0, 0.0], vec![0.0, 1.0]])
///     .documents(["alpha", "beta"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddRequest {
    /// Item ids
    pub ids: Vec<String>,
    /// One embedding per id; derived from `documents` when absent
    pub embeddings: Option<Vec<Vec<f32>>>,
    /// One document per id
    pub documents: Option<Vec<String>>,
    /// One metadata object per id (`None` entries store no metadata)
    pub metadatas: Option<Vec<Option<JsonValue>>>,
}

impl AddRequest {
    /// Start a request for the given ids
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AddRequest {
            ids: collect_strings(ids),
            ..Default::default()
        }
    }

    /// Set embeddings
    pub fn embeddings(mut self, embeddings: Vec<Vec<f32>>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    /// Set documents
    pub fn documents<I, S>(mut self, documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents = Some(collect_strings(documents));
        self
    }

    /// Set metadatas
    pub fn metadatas<I, M>(mut self, metadatas: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Option<JsonValue>>,
    {
        self.metadatas = Some(collect_metadatas(metadatas));
        self
    }
}

/// Patch a batch of existing items
///
/// Only supplied fields are written. Ids that do not exist are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    /// Item ids
    pub ids: Vec<String>,
    /// Replacement embeddings; derived from `documents` when absent and
    /// documents are given
    pub embeddings: Option<Vec<Vec<f32>>>,
    /// Replacement documents
    pub documents: Option<Vec<String>>,
    /// Replacement metadatas (`None` entries clear the stored metadata)
    pub metadatas: Option<Vec<Option<JsonValue>>>,
}

impl UpdateRequest {
    /// Start a request for the given ids
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        UpdateRequest {
            ids: collect_strings(ids),
            ..Default::default()
        }
    }

    /// Set embeddings
    pub fn embeddings(mut self, embeddings: Vec<Vec<f32>>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    /// Set documents
    pub fn documents<I, S>(mut self, documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documents = Some(collect_strings(documents));
        self
    }

    /// Set metadatas
    pub fn metadatas<I, M>(mut self, metadatas: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Option<JsonValue>>,
    {
        self.metadatas = Some(collect_metadatas(metadatas));
        self
    }
}

/// Delete items by id or by filter
///
/// When `ids` is set the filters are ignored. With neither ids nor filters
/// every item is deleted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteRequest {
    /// Exact ids to delete
    pub ids: Option<Vec<String>>,
    /// Metadata filter
    pub where_metadata: Option<MetadataFilter>,
    /// Document filter
    pub where_document: Option<DocumentFilter>,
}

impl DeleteRequest {
    /// Delete every item
    pub fn all() -> Self {
        Self::default()
    }

    /// Delete exactly these ids
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DeleteRequest {
            ids: Some(collect_strings(ids)),
            ..Default::default()
        }
    }

    /// Delete items matching a metadata filter
    pub fn where_metadata(mut self, filter: MetadataFilter) -> Self {
        self.where_metadata = Some(filter);
        self
    }

    /// Delete items matching a document filter
    pub fn where_document(mut self, filter: DocumentFilter) -> Self {
        self.where_document = Some(filter);
        self
    }
}

/// Read items by id and/or filter
#[derive(Debug, Clone, PartialEq)]
pub struct GetRequest {
    /// Restrict to these ids
    pub ids: Option<Vec<String>>,
    /// Metadata filter
    pub where_metadata: Option<MetadataFilter>,
    /// Document filter
    pub where_document: Option<DocumentFilter>,
    /// Fields to return (distances are ignored)
    pub include: Include,
}

impl Default for GetRequest {
    fn default() -> Self {
        GetRequest {
            ids: None,
            where_metadata: None,
            where_document: None,
            include: Include::stored(),
        }
    }
}

impl GetRequest {
    /// Read every item
    pub fn all() -> Self {
        Self::default()
    }

    /// Read these ids
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GetRequest {
            ids: Some(collect_strings(ids)),
            ..Default::default()
        }
    }

    /// Keep items matching a metadata filter
    pub fn where_metadata(mut self, filter: MetadataFilter) -> Self {
        self.where_metadata = Some(filter);
        self
    }

    /// Keep items matching a document filter
    pub fn where_document(mut self, filter: DocumentFilter) -> Self {
        self.where_document = Some(filter);
        self
    }

    /// Choose returned fields
    pub fn include(mut self, include: Include) -> Self {
        self.include = include;
        self
    }
}

/// Rank items by cosine distance to one or more query vectors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    /// Query vectors
    pub query_embeddings: Option<Vec<Vec<f32>>>,
    /// Query texts, embedded with the store's embedding function
    pub query_texts: Option<Vec<String>>,
    /// Results per query vector (the configured default when `None`)
    pub top_n: Option<usize>,
    /// Metadata filter
    pub where_metadata: Option<MetadataFilter>,
    /// Document filter
    pub where_document: Option<DocumentFilter>,
    /// Fields to return
    pub include: Include,
}

impl QueryRequest {
    /// Query by vectors
    pub fn embeddings(query_embeddings: Vec<Vec<f32>>) -> Self {
        QueryRequest {
            query_embeddings: Some(query_embeddings),
            ..Default::default()
        }
    }

    /// Query by texts
    pub fn texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryRequest {
            query_texts: Some(collect_strings(texts)),
            ..Default::default()
        }
    }

    /// Results per query vector
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    /// Keep items matching a metadata filter
    pub fn where_metadata(mut self, filter: MetadataFilter) -> Self {
        self.where_metadata = Some(filter);
        self
    }

    /// Keep items matching a document filter
    pub fn where_document(mut self, filter: DocumentFilter) -> Self {
        self.where_document = Some(filter);
        self
    }

    /// Choose returned fields
    pub fn include(mut self, include: Include) -> Self {
        self.include = include;
        self
    }
}

/// Items returned by `get`, as parallel lists
///
/// Fields that were not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GetResult {
    /// Item ids, in scan order
    pub ids: Vec<String>,
    /// Embeddings
    pub embeddings: Option<Vec<Vec<f32>>>,
    /// Documents
    pub documents: Option<Vec<Option<String>>>,
    /// Metadatas
    pub metadatas: Option<Vec<Option<JsonValue>>>,
}

impl GetResult {
    pub(crate) fn with_include(include: Include) -> Self {
        GetResult {
            ids: Vec::new(),
            embeddings: include.embeddings.then(Vec::new),
            documents: include.documents.then(Vec::new),
            metadatas: include.metadatas.then(Vec::new),
        }
    }

    pub(crate) fn push(&mut self, item: VectorItem) {
        self.ids.push(item.id);
        if let Some(embeddings) = &mut self.embeddings {
            embeddings.push(item.embedding);
        }
        if let Some(documents) = &mut self.documents {
            documents.push(item.document);
        }
        if let Some(metadatas) = &mut self.metadatas {
            metadatas.push(item.metadata);
        }
    }

    /// Number of items returned
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if no item matched
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Ranked matches returned by `query`: one inner list per query vector
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    /// Ranked ids per query
    pub ids: Vec<Vec<String>>,
    /// Embeddings per query
    pub embeddings: Option<Vec<Vec<Vec<f32>>>>,
    /// Documents per query
    pub documents: Option<Vec<Vec<Option<String>>>>,
    /// Metadatas per query
    pub metadatas: Option<Vec<Vec<Option<JsonValue>>>>,
    /// Distances per query (`1 - cosine similarity`, ascending)
    pub distances: Option<Vec<Vec<f32>>>,
}

impl QueryResult {
    pub(crate) fn with_include(include: Include) -> Self {
        QueryResult {
            ids: Vec::new(),
            embeddings: include.embeddings.then(Vec::new),
            documents: include.documents.then(Vec::new),
            metadatas: include.metadatas.then(Vec::new),
            distances: include.distances.then(Vec::new),
        }
    }

    pub(crate) fn push_ranking(&mut self, ranked: Vec<(&VectorItem, f32)>) {
        let mut ids = Vec::with_capacity(ranked.len());
        let mut embeddings = Vec::new();
        let mut documents = Vec::new();
        let mut metadatas = Vec::new();
        let mut distances = Vec::new();

        for (item, distance) in ranked {
            ids.push(item.id.clone());
            if self.embeddings.is_some() {
                embeddings.push(item.embedding.clone());
            }
            if self.documents.is_some() {
                documents.push(item.document.clone());
            }
            if self.metadatas.is_some() {
                metadatas.push(item.metadata.clone());
            }
            distances.push(distance);
        }

        self.ids.push(ids);
        if let Some(all) = &mut self.embeddings {
            all.push(embeddings);
        }
        if let Some(all) = &mut self.documents {
            all.push(documents);
        }
        if let Some(all) = &mut self.metadatas {
            all.push(metadatas);
        }
        if let Some(all) = &mut self.distances {
            all.push(distances);
        }
    }

    /// Number of query vectors answered
    pub fn num_queries(&self) -> usize {
        self.ids.len()
    }
}
