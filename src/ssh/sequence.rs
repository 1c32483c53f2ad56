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

//! Keystroke sequences typed into interactive shells.

use std::fmt;
use std::time::Duration;

/// End-of-text, what a terminal sends for Ctrl-C.
pub const CTRL_C: u8 = 0x03;

/// One unit of input for an interactive shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Text followed by a newline. An empty line is a bare Enter.
    Line(&'static str),
    /// A single raw control byte, sent without a newline.
    Control(u8),
}

impl Step {
    /// Bytes written to the channel for this step.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Step::Line(text) => {
                let mut bytes = Vec::with_capacity(text.len() + 1);
                bytes.extend_from_slice(text.as_bytes());
                bytes.push(b'\n');
                bytes
            }
            Step::Control(byte) => vec![*byte],
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Line("") => write!(f, "<enter>"),
            Step::Line(text) => write!(f, "{text:?}"),
            Step::Control(CTRL_C) => write!(f, "<ctrl-c>"),
            Step::Control(byte) => write!(f, "<0x{byte:02x}>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    /// Wait between opening the shell and the first keystroke.
    pub shell_settle: Duration,
    /// Wait after the first step, which attaches to the remote program.
    pub attach: Duration,
    /// Wait after every later step.
    pub per_step: Duration,
}

impl DelayPolicy {
    pub fn delay_after(&self, index: usize) -> Duration {
        if index == 0 {
            self.attach
        } else {
            self.per_step
        }
    }

    /// Time the whole sequence spends sleeping.
    pub fn total_for(&self, steps: usize) -> Duration {
        (0..steps).fold(self.shell_settle, |acc, i| acc + self.delay_after(i))
    }
}

/// A named, fixed list of steps and the pacing used to type them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySequence {
    pub label: &'static str,
    pub steps: &'static [Step],
    pub delays: DelayPolicy,
}

impl KeySequence {
    pub const fn new(label: &'static str, steps: &'static [Step], delays: DelayPolicy) -> Self {
        Self {
            label,
            steps,
            delays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_payload_appends_newline() {
        assert_eq!(Step::Line("screen -x").payload(), b"screen -x\n".to_vec());
        assert_eq!(Step::Line("").payload(), b"\n".to_vec());
    }

    #[test]
    fn test_control_payload_is_raw() {
        assert_eq!(Step::Control(CTRL_C).payload(), vec![0x03]);
    }

    #[test]
    fn test_first_step_waits_for_attach() {
        let delays = DelayPolicy {
            shell_settle: Duration::from_millis(1000),
            attach: Duration::from_millis(2000),
            per_step: Duration::from_millis(700),
        };
        assert_eq!(delays.delay_after(0), Duration::from_millis(2000));
        assert_eq!(delays.delay_after(1), Duration::from_millis(700));
        assert_eq!(delays.delay_after(3), Duration::from_millis(700));
        assert_eq!(delays.total_for(4), Duration::from_millis(5100));
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::Line("q").to_string(), "\"q\"");
        assert_eq!(Step::Line("").to_string(), "<enter>");
        assert_eq!(Step::Control(CTRL_C).to_string(), "<ctrl-c>");
    }
}
