// SPDX-License-Identifier: Apache-2.0

//! Bounded concurrent fan-out over per-repository sub-fetches.
//!
//! Runs one future per item with at most `concurrency` in flight and collects
//! every outcome. A failing item never cancels the others. Outcomes are
//! returned in input order so callers can fold them into ordered tallies
//! without any shared mutable state.

use std::fmt::Display;
use std::future::Future;

use futures::{StreamExt, stream};
use tracing::debug;

/// Outcome of processing a single item.
#[derive(Debug)]
pub enum ItemOutcome<T> {
    /// Item was processed successfully.
    Success(T),
    /// Item processing failed; holds the error description.
    Failed(String),
}

/// Result of a fan-out.
#[derive(Debug)]
pub struct FanOutResult<I, T> {
    /// Number of items processed successfully.
    pub succeeded: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Outcomes in input order (identifier, outcome).
    pub outcomes: Vec<(I, ItemOutcome<T>)>,
}

impl<I, T> Default for FanOutResult<I, T> {
    fn default() -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            outcomes: Vec::new(),
        }
    }
}

/// Processes items concurrently, isolating failures per item.
///
/// # Arguments
///
/// * `items` - (identifier, data) pairs to process
/// * `concurrency` - maximum number of in-flight futures (0 is treated as 1)
/// * `processor` - async function producing a result for one item
///
/// # Example
///
/// ```rust,no_run
/// use forgestat_core::fanout::fan_out;
///
/// # async fn example() {
/// let items = vec![("alpha".to_string(), 1), ("beta".to_string(), 2)];
/// let result = fan_out(items, 5, |n| async move { Ok::<_, forgestat_core::ForgeError>(n * 2) }).await;
/// assert_eq!(result.succeeded, 2);
/// # }
/// ```
pub async fn fan_out<I, D, T, F, Fut>(
    items: Vec<(I, D)>,
    concurrency: usize,
    processor: F,
) -> FanOutResult<I, T>
where
    I: Display,
    F: Fn(D) -> Fut,
    Fut: Future<Output = crate::Result<T>>,
{
    let total = items.len();
    let processor = &processor;

    let mut outcomes = stream::iter(items.into_iter().enumerate())
        .map(|(idx, (id, data))| async move {
            let result = processor(data).await;
            (idx, id, result)
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await;

    outcomes.sort_by_key(|(idx, _, _)| *idx);

    let mut result = FanOutResult::default();
    for (_, id, outcome) in outcomes {
        match outcome {
            Ok(value) => {
                result.succeeded += 1;
                result.outcomes.push((id, ItemOutcome::Success(value)));
            }
            Err(e) => {
                result.failed += 1;
                result.outcomes.push((id, ItemOutcome::Failed(e.to_string())));
            }
        }
    }

    debug!(
        total,
        succeeded = result.succeeded,
        failed = result.failed,
        "Fan-out complete"
    );

    result
}
