// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Fixed-backoff retry shared by every per-host operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

/// Final outcome of a retried operation and how many attempts it took.
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub outcome: Result<T, E>,
    pub attempts: u32,
}

impl RetryPolicy {
    pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

    /// At least one attempt is always made.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds or the attempts are used up.
    ///
    /// The closure receives the 1-based attempt number. The backoff is slept
    /// between attempts only, never after the last one.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Attempted<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match operation(attempt).await {
                Ok(value) => {
                    return Attempted {
                        outcome: Ok(value),
                        attempts: attempt,
                    }
                }
                Err(e) if attempt >= self.max_attempts => {
                    tracing::warn!(
                        "{}: attempt {}/{} failed, giving up: {}",
                        label,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    return Attempted {
                        outcome: Err(e),
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        "{}: attempt {}/{} failed, retrying in {:?}: {}",
                        label,
                        attempt,
                        self.max_attempts,
                        self.backoff,
                        e
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Self::DEFAULT_BACKOFF)
    }
}
