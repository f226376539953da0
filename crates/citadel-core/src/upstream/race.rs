//! First-success race combinator.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Every attempt in a race failed.
///
/// Errors are kept in completion order, so [`RaceFailure::last`] is the failure that ended the
/// race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceFailure<E> {
    pub errors: Vec<E>,
}

impl<E> RaceFailure<E> {
    /// The last failure to resolve, or `None` when the race had no attempts.
    #[must_use]
    pub fn last(&self) -> Option<&E> {
        self.errors.last()
    }

    /// Number of attempts that failed.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.errors.len()
    }
}

/// Polls every attempt concurrently and returns the first `Ok`.
///
/// When an attempt succeeds the remaining ones are dropped, cancelling their in-flight work.
/// If every attempt fails the errors are returned in the order they resolved. An empty input
/// fails immediately with no errors.
///
/// Launch order does not favour any attempt; whichever resolves to `Ok` first wins.
///
/// # Errors
///
/// Returns [`RaceFailure`] when no attempt succeeds.
pub async fn race_first_ok<I, F, T, E>(attempts: I) -> Result<T, RaceFailure<E>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let mut in_flight: FuturesUnordered<F> = attempts.into_iter().collect();
    let mut errors = Vec::with_capacity(in_flight.len());

    while let Some(outcome) = in_flight.next().await {
        match outcome {
            Ok(value) => return Ok(value),
            Err(error) => errors.push(error),
        }
    }

    Err(RaceFailure { errors })
}
