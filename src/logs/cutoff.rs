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

use chrono::NaiveDateTime;
use std::fmt;

use crate::config::ConfigError;

/// Lower bound for collected log lines, as `YYYYMMDDHHMM` or `0`.
///
/// The value is forwarded verbatim to the remote filter, which compares it
/// numerically against the timestamp of each log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cutoff(String);

const MINUTE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y/%m/%d %H:%M"];
const HOUR_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y/%m/%d %H:%M"];

impl Cutoff {
    /// Every log line qualifies.
    pub fn beginning() -> Self {
        Self("0".to_string())
    }

    /// Accepts blank input or `0` (beginning of time), twelve or ten digit compact
    /// timestamps, or a handful of human date formats.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let value = input.trim();
        if value.is_empty() || value == "0" {
            return Ok(Self::beginning());
        }

        if value.chars().all(|c| c.is_ascii_digit()) {
            match value.len() {
                12 => return Ok(Self(value.to_string())),
                10 => return Ok(Self(format!("{value}00"))),
                _ => {}
            }
        }

        for format in MINUTE_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(Self::from_datetime(parsed));
            }
        }

        // Hour-only inputs such as `2025-11-20 18`.
        let with_minutes = format!("{value}:00");
        for format in HOUR_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&with_minutes, format) {
                return Ok(Self::from_datetime(parsed));
            }
        }

        Err(ConfigError::InvalidCutoff {
            value: value.to_string(),
        })
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime.format("%Y%m%d%H%M").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_beginning(&self) -> bool {
        self.0 == "0"
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_beginning() {
        assert!(Cutoff::parse("").unwrap().is_beginning());
        assert!(Cutoff::parse("   ").unwrap().is_beginning());
        assert!(Cutoff::parse("0").unwrap().is_beginning());
    }

    #[test]
    fn test_compact_forms() {
        assert_eq!(Cutoff::parse("202511201830").unwrap().as_str(), "202511201830");
        assert_eq!(Cutoff::parse("2025112018").unwrap().as_str(), "202511201800");
    }

    #[test]
    fn test_human_forms() {
        let cases = [
            ("2025-11-20 18:30", "202511201830"),
            ("2025-11-20T18:30", "202511201830"),
            ("2025/11/20 18:30", "202511201830"),
            ("2025-11-20 18", "202511201800"),
            ("2025/11/20 07", "202511200700"),
        ];
        for (input, expected) in cases {
            assert_eq!(Cutoff::parse(input).unwrap().as_str(), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        for input in ["yesterday", "20251120", "2025-13-40 10:00", "1234567890123"] {
            assert_eq!(
                Cutoff::parse(input),
                Err(ConfigError::InvalidCutoff {
                    value: input.to_string()
                }),
                "input {input:?}"
            );
        }
    }
}
