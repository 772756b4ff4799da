//! Retrying storage calls that failed for transient reasons.

use std::{future::Future, time::Duration};

use bingo_core::{Error, Result, store::StoreFailure};

/// How often, and how patiently, a storage call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Attempts per call, the first one included.
  pub max_attempts: u32,
  /// Delay before the second attempt; doubles for each one after.
  pub base_delay:   Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_attempts: 3, base_delay: Duration::from_millis(25) }
  }
}

impl RetryPolicy {
  fn delay(&self, attempt: u32) -> Duration {
    self.base_delay.saturating_mul(1 << attempt.saturating_sub(1).min(10))
  }

  /// Run `call` until it succeeds, fails permanently, or runs out of
  /// attempts. Failures are mapped into the domain error taxonomy.
  pub(crate) async fn run<T, E, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T>
  where
    E: StoreFailure,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
  {
    let max_attempts = self.max_attempts.max(1);
    let mut attempt = 1;
    loop {
      let err = match call().await {
        Ok(value) => return Ok(value),
        Err(err) => err,
      };

      if !err.is_transient() {
        tracing::error!(op, error = %err, "storage failure");
        return Err(Error::Storage(Box::new(err)));
      }
      if attempt >= max_attempts {
        tracing::error!(op, attempts = attempt, error = %err, "storage unavailable");
        return Err(Error::StorageUnavailable(Box::new(err)));
      }

      let delay = self.delay(attempt);
      tracing::warn!(op, attempt, ?delay, error = %err, "transient storage failure, retrying");
      drop(err);
      tokio::time::sleep(delay).await;
      attempt += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicU32, Ordering};

  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("fake failure (transient: {0})")]
  struct Fake(bool);

  impl StoreFailure for Fake {
    fn is_transient(&self) -> bool { self.0 }
  }

  fn quick(max_attempts: u32) -> RetryPolicy {
    RetryPolicy { max_attempts, base_delay: Duration::from_millis(1) }
  }

  #[test]
  fn delay_doubles() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay(1), Duration::from_millis(25));
    assert_eq!(policy.delay(2), Duration::from_millis(50));
    assert_eq!(policy.delay(3), Duration::from_millis(100));
  }

  #[tokio::test]
  async fn transient_failure_then_success() {
    let calls = &AtomicU32::new(0);
    let value = quick(3)
      .run("test", || async move {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 { Err(Fake(true)) } else { Ok(7) }
      })
      .await
      .unwrap();
    assert_eq!(value, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn exhaustion_is_unavailable() {
    let calls = &AtomicU32::new(0);
    let err = quick(3)
      .run("test", || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(Fake(true))
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::StorageUnavailable(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn permanent_failure_is_not_retried() {
    let calls = &AtomicU32::new(0);
    let err = quick(3)
      .run("test", || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(Fake(false))
      })
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }
}
