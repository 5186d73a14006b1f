// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Request batching and orchestrated fan-out fetches
//!
//! The BusTime API caps the number of identifiers a single request may
//! carry. This module splits identifier lists into compliant batches,
//! issues all batch requests concurrently and stitches the responses back
//! together in input order.

use futures_util::future::try_join_all;

use crate::error::{AppError, Result};

/// Upstream per-request identifier limit (routes per vehicle request,
/// vehicles per prediction request)
pub const MAX_BATCH_SIZE: usize = 10;

/// Splits `items` into ordered batches of at most `max_batch_size` elements.
///
/// Concatenating the output yields the input exactly; no batch is empty.
/// An empty input produces an empty output.
pub fn split<T: Clone>(items: &[T], max_batch_size: usize) -> Vec<Vec<T>> {
    assert!(max_batch_size > 0, "batch size must be at least 1");
    items
        .chunks(max_batch_size)
        .map(<[T]>::to_vec)
        .collect()
}

/// Returns a sizing error when a batch exceeds the upstream limit.
///
/// Callers must never silently truncate an oversized batch.
pub fn ensure_batch_size(requested: usize, max: usize) -> Result<()> {
    if requested > max {
        return Err(AppError::BatchSizeExceeded { requested, max });
    }
    Ok(())
}

/// Fetches `ids` through `fetch`, one call per batch, all batches in flight
/// concurrently.
///
/// Results are concatenated in input batch order regardless of completion
/// order. Fails as a whole with the first batch error; no partial result is
/// ever returned. Empty `ids` resolves to an empty result without invoking
/// `fetch`.
pub async fn fetch_in_batches<T, R, F, Fut>(
    ids: &[T],
    max_batch_size: usize,
    fetch: F,
) -> Result<Vec<R>>
where
    T: Clone,
    F: Fn(Vec<T>) -> Fut,
    Fut: Future<Output = Result<Vec<R>>>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let batches = split(ids, max_batch_size);
    let responses = try_join_all(batches.into_iter().map(fetch)).await?;
    Ok(responses.into_iter().flatten().collect())
}
