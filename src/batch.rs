use std::future::Future;

use futures_util::future::join_all;
use thiserror::Error;

use crate::store::StoreError;

/// Aggregate result of a best-effort batch: every operation is awaited and
/// already-committed writes are kept even when a sibling fails.
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub attempted: usize,
    pub values: Vec<T>,
    pub first_error: Option<StoreError>,
    pub failed: usize,
}

#[derive(Debug, Error)]
#[error("{source} ({failed} of {attempted} writes failed)")]
pub struct BatchFailure {
    pub attempted: usize,
    pub failed: usize,
    #[source]
    pub source: StoreError,
}

impl<T> BatchOutcome<T> {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    pub fn into_result(self) -> Result<Vec<T>, BatchFailure> {
        match self.first_error {
            None => Ok(self.values),
            Some(source) => Err(BatchFailure {
                attempted: self.attempted,
                failed: self.failed,
                source,
            }),
        }
    }
}

/// Drives all operations concurrently and waits for each one.
pub async fn run_all<I, F, T>(operations: I) -> BatchOutcome<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, StoreError>>,
{
    let results = join_all(operations).await;
    let attempted = results.len();
    let mut values = Vec::with_capacity(attempted);
    let mut first_error = None;
    let mut failed = 0;

    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(err) => {
                failed += 1;
                first_error.get_or_insert(err);
            }
        }
    }

    BatchOutcome {
        attempted,
        values,
        first_error,
        failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_every_success() {
        let outcome = run_all((1..=3).map(|n| async move { Ok::<_, StoreError>(n * 10) })).await;
        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded(), 3);
        assert_eq!(outcome.into_result().unwrap(), vec![10, 20, 30]);
    }

    #[tokio::test]
    async fn keeps_first_error_and_counts_failures() {
        let outcome = run_all((0..4).map(|n| async move {
            if n % 2 == 1 {
                Err(StoreError::NotFound(n))
            } else {
                Ok(n)
            }
        }))
        .await;

        assert_eq!(outcome.attempted, 4);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(outcome.values, vec![0, 2]);

        let failure = outcome.into_result().unwrap_err();
        assert!(matches!(failure.source, StoreError::NotFound(1)));
        assert_eq!(failure.to_string(), "candidate 1 not found (2 of 4 writes failed)");
    }

    #[tokio::test]
    async fn empty_batch_succeeds() {
        let outcome = run_all(Vec::<std::future::Ready<Result<(), StoreError>>>::new()).await;
        assert_eq!(outcome.attempted, 0);
        assert!(outcome.into_result().unwrap().is_empty());
    }
}
