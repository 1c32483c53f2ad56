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

//! Per-family remote automation.

use std::time::Duration;

use super::family::DeviceFamily;
use crate::logs::PS1_LOG_PIPELINE;
use crate::ssh::sequence::{DelayPolicy, KeySequence, Step, CTRL_C};

const PS1_START_STEPS: &[Step] = &[Step::Line("screen -x"), Step::Line("16"), Step::Line("14")];

const PS1_STOP_STEPS: &[Step] = &[
    Step::Line("screen -x"),
    Step::Line(""),
    Step::Line("q"),
    Step::Control(CTRL_C),
];

const PS1_START_DELAYS: DelayPolicy = DelayPolicy {
    shell_settle: Duration::from_secs(1),
    attach: Duration::from_secs(2),
    per_step: Duration::from_millis(1000),
};

const PS1_STOP_DELAYS: DelayPolicy = DelayPolicy {
    shell_settle: Duration::from_secs(1),
    attach: Duration::from_secs(2),
    per_step: Duration::from_millis(700),
};

/// What psfleet knows how to do on one family of machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyProfile {
    pub family: DeviceFamily,
    /// Keystrokes that put the machine into overnight test mode.
    pub start: Option<KeySequence>,
    /// Keystrokes that take it out again.
    pub stop: Option<KeySequence>,
    /// Remote log filter, with a `%SINCE%` placeholder for the cutoff.
    pub log_command: Option<&'static str>,
}

impl FamilyProfile {
    pub fn is_automated(&self) -> bool {
        self.start.is_some() || self.stop.is_some() || self.log_command.is_some()
    }
}

static PS1_PROFILE: FamilyProfile = FamilyProfile {
    family: DeviceFamily::Ps1,
    start: Some(KeySequence::new("start", PS1_START_STEPS, PS1_START_DELAYS)),
    stop: Some(KeySequence::new("stop", PS1_STOP_STEPS, PS1_STOP_DELAYS)),
    log_command: Some(PS1_LOG_PIPELINE),
};

// PS2 machines are operated by hand for now.
static PS2_PROFILE: FamilyProfile = FamilyProfile {
    family: DeviceFamily::Ps2,
    start: None,
    stop: None,
    log_command: None,
};

/// Look up the profile of a family. Unrecognized machines have none.
pub fn profile(family: DeviceFamily) -> Option<&'static FamilyProfile> {
    match family {
        DeviceFamily::Ps1 => Some(&PS1_PROFILE),
        DeviceFamily::Ps2 => Some(&PS2_PROFILE),
        DeviceFamily::Unknown => None,
    }
}
