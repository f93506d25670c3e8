//! Embedding function contract
//!
//! The engine never generates embeddings itself. Text operations (adding
//! documents without embeddings, querying by text) call an injected
//! [`EmbeddingFunction`].

use crate::primitives::vector::{VectorError, VectorResult};

/// Maps texts to embeddings
///
/// The output must have one embedding per input text, in input order.
///
/// Any `Fn(&[String]) -> Vec<Vec<f32>>` closure that is `Send + Sync` is an
/// embedding function.
pub trait EmbeddingFunction: Send + Sync {
    /// Embed a batch of texts
    fn embed(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>>;
}

impl<F> EmbeddingFunction for F
where
    F: Fn(&[String]) -> Vec<Vec<f32>> + Send + Sync,
{
    fn embed(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        Ok(self(texts))
    }
}

/// Call `function` and check it returned one embedding per text
pub(crate) fn embed_checked(
    function: &dyn EmbeddingFunction,
    texts: &[String],
) -> VectorResult<Vec<Vec<f32>>> {
    let embeddings = function.embed(texts)?;
    if embeddings.len() != texts.len() {
        return Err(VectorError::Embedding(format!(
            "embedding function returned {} embeddings for {} texts",
            embeddings.len(),
            texts.len()
        )));
    }
    Ok(embeddings)
}
