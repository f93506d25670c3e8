//! Exact similarity search
//!
//! Every query scores all candidate items of the collection: items are
//! filtered first, then ranked by cosine distance, ascending. Ties keep scan
//! order. Candidates whose embedding dimension differs from the query vector
//! are skipped.
//!
//! Large candidate sets are scored on the rayon pool; the ranking is the same
//! either way.

use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

use crate::primitives::vector::codec::decode_item;
use crate::primitives::vector::distance::{compare_distances, cosine_distance};
use crate::primitives::vector::filter::matches;
use crate::primitives::vector::{
    QueryRequest, QueryResult, VectorError, VectorItem, VectorResult, VectorStore,
};

impl VectorStore {
    /// Find the `top_n` nearest items for each query vector
    ///
    /// Query vectors come from `query_embeddings`, or from `query_texts`
    /// through the embedding function. `top_n` defaults to the configured
    /// `vector.default_top_n`.
    ///
    /// # Errors
    /// - `CollectionNotFound` if the collection doesn't exist
    /// - `InvalidArgument` if no query vectors are given or one is empty
    /// - `MissingEmbeddingFunction` for text queries without a function
    pub fn query(&self, collection: &str, request: QueryRequest) -> VectorResult<QueryResult> {
        let start = Instant::now();
        self.registry.ensure_exists(collection)?;

        let queries = match (request.query_embeddings, &request.query_texts) {
            (Some(embeddings), _) => embeddings,
            (None, Some(texts)) => self.embed(texts)?,
            (None, None) => {
                return Err(VectorError::InvalidArgument(
                    "either query embeddings or query texts must be provided".into(),
                ))
            }
        };
        if let Some(position) = queries.iter().position(|q| q.is_empty()) {
            return Err(VectorError::InvalidArgument(format!(
                "query vector {} is empty",
                position
            )));
        }

        let settings = &self.db.config().vector;
        let top_n = request.top_n.unwrap_or(settings.default_top_n);

        let rows = self.db.store().scan_rows(collection)?;
        let scanned = rows.len();
        let mut candidates = Vec::with_capacity(scanned);
        for row in rows {
            let item = decode_item(row)?;
            if matches(
                &item,
                request.where_metadata.as_ref(),
                request.where_document.as_ref(),
            ) {
                candidates.push(item);
            }
        }

        let mut result = QueryResult::with_include(request.include);
        for query in &queries {
            let ranked =
                rank_candidates(&candidates, query, top_n, settings.parallel_scan_threshold);
            result.push_ranking(ranked);
        }

        debug!(
            target: "strata::vector",
            collection,
            queries = queries.len(),
            scanned,
            candidates = candidates.len(),
            top_n,
            duration_us = start.elapsed().as_micros() as u64,
            "Query completed"
        );

        Ok(result)
    }
}

/// Rank `candidates` by cosine distance to `query` and keep the first `top_n`
///
/// Candidates of a different dimension are excluded. The sort is stable, so
/// equal distances keep candidate order.
pub(crate) fn rank_candidates<'a>(
    candidates: &'a [VectorItem],
    query: &[f32],
    top_n: usize,
    parallel_threshold: usize,
) -> Vec<(&'a VectorItem, f32)> {
    if top_n == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let score = |(index, item): (usize, &VectorItem)| {
        (item.embedding.len() == query.len())
            .then(|| (index, cosine_distance(query, &item.embedding)))
    };

    let mut scored: Vec<(usize, f32)> = if candidates.len() > parallel_threshold {
        candidates.par_iter().enumerate().filter_map(score).collect()
    } else {
        candidates.iter().enumerate().filter_map(score).collect()
    };

    let skipped = candidates.len() - scored.len();
    if skipped > 0 {
        debug!(
            target: "strata::vector",
            skipped,
            dimension = query.len(),
            "Skipped candidates with mismatched dimension"
        );
    }

    scored.sort_by(|a, b| compare_distances(a.1, b.1));
    scored.truncate(top_n);
    scored
        .into_iter()
        .map(|(index, distance)| (&candidates[index], distance))
        .collect()
}
