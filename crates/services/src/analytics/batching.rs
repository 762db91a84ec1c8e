//! Chunk-and-merge helpers for gateway lookups with capped id lists.

use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;

use futures::future::try_join_all;
use tracing::debug;

/// Split `ids` into chunks of at most `batch_size`, issue one `fetch` per
/// chunk concurrently, and flatten the results in chunk order.
///
/// The first failing chunk fails the whole lookup; no chunk is retried.
///
/// # Errors
///
/// Returns the first error produced by any chunk.
pub async fn fetch_in_batches<I, T, E, F, Fut>(
    ids: &[I],
    batch_size: usize,
    fetch: F,
) -> Result<Vec<T>, E>
where
    I: Clone,
    F: Fn(Vec<I>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let calls = ids.chunks(batch_size.max(1)).map(|chunk| fetch(chunk.to_vec()));
    let batches = try_join_all(calls).await?;
    debug!(ids = ids.len(), batches = batches.len(), "merged batched lookup");

    Ok(batches.into_iter().flatten().collect())
}

/// Keep the first occurrence of every key, preserving order.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}
