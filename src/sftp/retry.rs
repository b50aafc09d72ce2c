use crate::error::Result;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use log::{debug, warn};
use std::thread;
use std::time::Duration;

/// Retry configuration for remote operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, the first one included
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Retries without waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            multiplier: 1.0,
        }
    }

    /// Runs the operation until it succeeds or the attempts are exhausted,
    /// returning the last error in that case.
    pub fn run<T, F>(&self, action: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.initial_delay,
            max_interval: self.max_delay,
            multiplier: self.multiplier,
            max_elapsed_time: None,
            ..Default::default()
        };
        backoff.reset();

        let mut attempt = 0;
        loop {
            attempt += 1;

            match operation() {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt >= self.max_attempts.max(1) {
                        warn!(
                            "Unable to {} after {} attempts: {}",
                            action, attempt, error
                        );
                        return Err(error);
                    }

                    let delay = backoff.next_backoff().unwrap_or(self.max_delay);
                    debug!(
                        "Unable to {} (attempt {}): {}, retrying after {:?}",
                        action, attempt, error, delay
                    );
                    thread::sleep(delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_succeeds_after_failures() {
        let mut calls = 0;
        let result = RetryPolicy::immediate(3).run("test", || {
            calls += 1;
            if calls < 3 {
                return Err(Error::SftpError(format!("failure {}", calls)));
            }
            return Ok(calls);
        });

        assert_eq!(3, result.unwrap());
        assert_eq!(3, calls);
    }

    #[test]
    fn test_returns_last_error() {
        let mut calls = 0;
        let result: Result<()> = RetryPolicy::immediate(2).run("test", || {
            calls += 1;
            return Err(Error::SftpError(format!("failure {}", calls)));
        });

        assert_eq!("failure 2", result.unwrap_err().to_string());
        assert_eq!(2, calls);
    }

    #[test]
    fn test_zero_attempts_runs_once() {
        let mut calls = 0;
        let result: Result<()> = RetryPolicy::immediate(0).run("test", || {
            calls += 1;
            return Err("failure".into());
        });

        assert!(result.is_err());
        assert_eq!(1, calls);
    }
}
