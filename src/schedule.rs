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

//! Delayed start: wait for a local wall-clock time before dispatching.

use chrono::{Local, NaiveDate, NaiveDateTime};
use std::time::Duration;

use crate::config::ConfigError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a local start time. A bare date means midnight.
pub fn parse_start_time(value: &str) -> Result<NaiveDateTime, ConfigError> {
    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ConfigError::InvalidSchedule {
            value: value.to_string(),
        })
}

/// How long to wait from `now` until `start`; `None` when it already passed.
pub fn delay_until(start: NaiveDateTime, now: NaiveDateTime) -> Option<Duration> {
    (start - now)
        .to_std()
        .ok()
        .filter(|delay| !delay.is_zero())
}

/// Sleep until `start` in local time, returning immediately for past times.
pub async fn wait_until(start: NaiveDateTime) {
    match delay_until(start, Local::now().naive_local()) {
        Some(delay) => {
            tracing::info!("Waiting {:?} until {}", delay, start);
            println!("Scheduled start at {start}, waiting {}s", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
        None => tracing::debug!("Start time {} already passed, running now", start),
    }
}

/// Parse a duration given in (possibly fractional) hours.
pub fn parse_hours(hours: f64) -> Result<Duration, ConfigError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(ConfigError::InvalidDuration {
            field: "--hours",
            value: hours.to_string(),
        });
    }
    Duration::try_from_secs_f64(hours * 3600.0).map_err(|_| ConfigError::InvalidDuration {
        field: "--hours",
        value: hours.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> NaiveDateTime {
        parse_start_time(value).unwrap()
    }

    #[test]
    fn test_accepted_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 20)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(at("2025-11-20T18:30"), expected);
        assert_eq!(at("2025-11-20T18:30:00"), expected);
        assert_eq!(at("2025-11-20 18:30"), expected);
        assert_eq!(at(" 2025-11-20 18:30:00 "), expected);
        assert_eq!(
            at("2025-11-20"),
            NaiveDate::from_ymd_opt(2025, 11, 20)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_malformed_time() {
        assert_eq!(
            parse_start_time("tomorrow 6pm"),
            Err(ConfigError::InvalidSchedule {
                value: "tomorrow 6pm".to_string()
            })
        );
        assert!(parse_start_time("2025-11-31T10:00").is_err());
    }

    #[test]
    fn test_delay_until() {
        let now = at("2025-11-20T18:00");
        assert_eq!(
            delay_until(at("2025-11-20T18:30"), now),
            Some(Duration::from_secs(1800))
        );
        assert_eq!(delay_until(at("2025-11-20T17:00"), now), None);
        assert_eq!(delay_until(now, now), None);
    }

    #[tokio::test]
    async fn test_past_time_returns_immediately() {
        let started = std::time::Instant::now();
        wait_until(at("2000-01-01T00:00")).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_parse_hours() {
        assert_eq!(parse_hours(1.5).unwrap(), Duration::from_secs(5400));
        assert!(parse_hours(0.0).is_err());
        assert!(parse_hours(-2.0).is_err());
        assert!(parse_hours(f64::NAN).is_err());
    }
}
