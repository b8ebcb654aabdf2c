//! Response envelopes shared by several providers
//!
//! OpenAI-style providers answer with `{"data": [{"embedding": [...], "index": 0}, ...]}`.
//! Some DeepSeek-style deployments answer with `{"embeddings": [[...], ...]}` instead.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::provider::Embedding;
use crate::error::{EmbedError, Result};

/// Single entry of an OpenAI-style `data` array
#[derive(Debug, Deserialize)]
struct DataItem {
    #[serde(default)]
    embedding: Embedding,
    #[serde(default)]
    index: Option<usize>,
}

/// Extract `data[i].embedding` from an OpenAI-style body
///
/// Entries are ordered by their `index` field when every entry has one.
/// An entry without an `embedding` field yields an empty vector.
pub(crate) fn data_vectors(body: &Value) -> Result<Vec<Embedding>> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| EmbedError::response("missing 'data' array"))?;

    let mut items = data
        .iter()
        .map(|item| serde_json::from_value::<DataItem>(item.clone()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if items.iter().all(|item| item.index.is_some()) {
        items.sort_by_key(|item| item.index);
    }

    Ok(items.into_iter().map(|item| item.embedding).collect())
}

/// Extract `data[0].embedding`, requiring a non-empty `data` array
pub(crate) fn first_data_vector(body: &Value) -> Result<Embedding> {
    data_vectors(body)?
        .into_iter()
        .next()
        .ok_or_else(|| EmbedError::response("empty 'data' array"))
}

/// Extract the `embeddings` array of vectors
pub(crate) fn embeddings_vectors(body: &Value) -> Result<Vec<Embedding>> {
    let embeddings = body
        .get("embeddings")
        .ok_or_else(|| EmbedError::response("missing 'embeddings' array"))?;
    Ok(serde_json::from_value(embeddings.clone())?)
}

/// Spread a batch response over the input positions
///
/// Missing positions become response errors; surplus vectors are dropped.
pub(crate) fn align_batch(vectors: Vec<Embedding>, expected: usize) -> Vec<Result<Embedding>> {
    let received = vectors.len();
    if received > expected {
        warn!(
            expected,
            received, "Provider returned more embeddings than inputs, dropping the surplus"
        );
    }

    let mut results: Vec<Result<Embedding>> =
        vectors.into_iter().take(expected).map(Ok).collect();
    while results.len() < expected {
        let index = results.len();
        results.push(Err(EmbedError::response(format!(
            "no embedding returned for input {} ({} of {} received)",
            index, received, expected
        ))));
    }
    results
}

/// Report the same failure for every position of a batch
pub(crate) fn fail_batch(error: EmbedError, expected: usize) -> Vec<Result<Embedding>> {
    vec![Err(error); expected]
}
