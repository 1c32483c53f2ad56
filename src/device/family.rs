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

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

static PS1_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^PS\d{4}$").expect("valid PS1 pattern"));
static PS2_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^PS\d{7}$").expect("valid PS2 pattern"));

/// Canonical form of a machine name: trimmed and upper-cased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Hardware family of a machine, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceFamily {
    Ps1,
    Ps2,
    Unknown,
}

impl DeviceFamily {
    /// `PS` plus four digits is PS1, `PS` plus seven digits is PS2.
    pub fn classify(name: &str) -> Self {
        let name = normalize_name(name);
        if PS1_NAME.is_match(&name) {
            DeviceFamily::Ps1
        } else if PS2_NAME.is_match(&name) {
            DeviceFamily::Ps2
        } else {
            DeviceFamily::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeviceFamily::Ps1 => "PS1",
            DeviceFamily::Ps2 => "PS2",
            DeviceFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which families an operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FamilySelection {
    Ps1,
    Ps2,
    #[default]
    Both,
}

impl FamilySelection {
    /// `Both` covers PS1 and PS2 but never unrecognized names.
    pub fn includes(&self, family: DeviceFamily) -> bool {
        match (self, family) {
            (_, DeviceFamily::Unknown) => false,
            (FamilySelection::Both, _) => true,
            (FamilySelection::Ps1, DeviceFamily::Ps1) => true,
            (FamilySelection::Ps2, DeviceFamily::Ps2) => true,
            _ => false,
        }
    }
}

impl fmt::Display for FamilySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FamilySelection::Ps1 => "PS1",
            FamilySelection::Ps2 => "PS2",
            FamilySelection::Both => "BOTH",
        };
        f.write_str(label)
    }
}
