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

use super::cutoff::Cutoff;

/// Placeholder replaced by the cutoff in log command templates.
pub const SINCE_PLACEHOLDER: &str = "%SINCE%";

/// Tallies EMCY codes and failure lines from the rotated PS1 console logs
/// newer than the cutoff, most frequent first.
pub const PS1_LOG_PIPELINE: &str = r#"
{ zcat /data/poursteady/log/*-console.txt-*.gz 2>/dev/null;
  cat /data/poursteady/log/*-console.txt 2>/dev/null;
} | awk -v since="%SINCE%" '
BEGIN{IGNORECASE=1}
{
  split($1, dt, /[T:-]/)
  if (length(dt[1])==0 || length(dt[2])==0 || length(dt[3])==0) next
  datenum = dt[1] dt[2] dt[3]
  timenum = dt[4] * 100 + dt[5]
  datetime = datenum * 10000 + timenum

  if (datetime >= since) {
    line = $0
    if (/EMCY/) {
      match(line, /(0000|1000|2310|2340|3210|3220|4280|4310|5441|5442|5443|6100|7500|8110|8130|8331|8580|8611|9000|FF01|FF02|FF03|FF04|FF05)/)
      if (RSTART > 0) {
        code = substr(line, RSTART, RLENGTH)
        timestamp = $1
        emcy_count[code]++
        emcy_last_time[code] = timestamp
      }
    }
    if (/failure/) {
      failure_count++
      failure_last_timestamp = $1
    }
  }
}
END {
  for (code in emcy_count) {
    print emcy_count[code], code, emcy_last_time[code]
  }
  print (failure_count ? failure_count : 0) " SAOBO Errors " failure_last_timestamp
}' | sort -rn
"#;

/// Substitute the cutoff into a log command template.
pub fn render_log_command(template: &str, cutoff: &Cutoff) -> String {
    template.replace(SINCE_PLACEHOLDER, cutoff.as_str())
}
