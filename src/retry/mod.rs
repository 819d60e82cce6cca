use anyhow::Result;
use log::warn;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Backoff schedule applied to a retryable operation.
/// One attempt is made per delay plus the initial one.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn no_retry() -> Self {
        Self { delays: Vec::new() }
    }

    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Run `operation` until it succeeds, fails with an error `is_retryable`
    /// rejects, or the schedule is exhausted
    pub async fn run<T, F, Fut, P>(&self, label: &str, mut operation: F, is_retryable: P) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&anyhow::Error) -> bool,
    {
        let mut attempt = 0;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_retryable(&err) {
                return Err(err);
            }

            let Some(delay) = self.delays.get(attempt) else {
                return Err(err.context(format!(
                    "{} gave up after {} attempts",
                    label,
                    self.max_attempts()
                )));
            };

            attempt += 1;
            warn!(
                "{} attempt {}/{} failed: {:#}; retrying in {:?}",
                label,
                attempt,
                self.max_attempts(),
                err,
                delay
            );
            sleep(*delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{is_timeout, ScrapeError};
    use std::cell::RefCell;
    use tokio::time::Instant;

    fn schedule() -> RetryPolicy {
        RetryPolicy::new(vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_exhaust_schedule() {
        let attempts = RefCell::new(Vec::new());

        let result: Result<()> = schedule()
            .run(
                "stats",
                || {
                    attempts.borrow_mut().push(Instant::now());
                    async { Err::<(), _>(anyhow::Error::from(ScrapeError::Timeout("stats cell".into()))) }
                },
                is_timeout,
            )
            .await;

        let err = result.unwrap_err();
        assert!(is_timeout(&err));

        let attempts = attempts.into_inner();
        assert_eq!(attempts.len(), 4);
        let gaps: Vec<Duration> = attempts.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_structural_error_fails_immediately() {
        let calls = RefCell::new(0);

        let result: Result<()> = schedule()
            .run(
                "stats",
                || {
                    *calls.borrow_mut() += 1;
                    async { Err::<(), _>(anyhow::Error::from(ScrapeError::Structure("missing frame".into()))) }
                },
                is_timeout,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_timeout() {
        let calls = RefCell::new(0);

        let value = schedule()
            .run(
                "stats",
                || {
                    *calls.borrow_mut() += 1;
                    let n = *calls.borrow();
                    async move {
                        if n < 3 {
                            Err(anyhow::Error::from(ScrapeError::Timeout("slow frame".into())))
                        } else {
                            Ok(n)
                        }
                    }
                },
                is_timeout,
            )
            .await
            .unwrap();

        assert_eq!(value, 3);
    }

    #[test]
    fn test_attempt_count() {
        assert_eq!(schedule().max_attempts(), 4);
        assert_eq!(RetryPolicy::no_retry().max_attempts(), 1);
    }
}
