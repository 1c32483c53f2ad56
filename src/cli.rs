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

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::device::FamilySelection;

#[derive(Parser, Debug)]
#[command(
    name = "psfleet",
    version,
    about = "Fleet SSH automation for PS1/PS2 overnight testing and error log collection",
    long_about = "psfleet drives a fleet of PS1/PS2 machines over SSH.\nIt starts and stops overnight testing by typing the machines' console key sequences,\ncollects error log summaries, and runs arbitrary commands on every host of a host list\nwith bounded parallelism, retries and an aggregate JSON report.",
    after_help = "EXAMPLES:\n  Run a command on every host:     psfleet -H hosts.csv exec \"uptime\"\n  Pipe a script to every host:     psfleet -H hosts.csv exec --script check.sh\n  Fetch a file after the command:  psfleet -H hosts.csv exec --download /var/log/app.log \"sync\"\n  Start overnight testing:         psfleet -H hosts.txt start --model ps1\n  Full overnight cycle:            psfleet -H hosts.txt overnight --model both --hours 10\n  Collect error logs:              psfleet -H hosts.txt logs --since \"2025-11-20 18:00\"\n\nCredentials are read from --password/--identity or SSH_USERNAME/SSH_PASSWORD (also from .env)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(
        long,
        global = true,
        help = "Configuration file path [default: ~/.config/psfleet/config.yaml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

/// Flags shared by every subcommand that talks to the fleet.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(
        short = 'H',
        long,
        global = true,
        help = "Host list (exec: address[,user[,port]] per line) or inventory (SINCE= header plus name,address rows) [default: hosts.txt]"
    )]
    pub hosts: Option<PathBuf>,

    #[arg(
        short = 'u',
        long,
        env = "SSH_USERNAME",
        global = true,
        help = "Username for hosts that do not name one"
    )]
    pub user: Option<String>,

    #[arg(short = 'i', long, global = true, help = "SSH private key file path")]
    pub identity: Option<PathBuf>,

    #[arg(
        long,
        env = "SSH_PASSWORD",
        hide_env_values = true,
        global = true,
        help = "SSH password (prefer SSH_PASSWORD or --ask-password)"
    )]
    pub password: Option<String>,

    #[arg(
        short = 'P',
        long,
        global = true,
        help = "Prompt for the SSH password"
    )]
    pub ask_password: bool,

    #[arg(long, global = true, help = "Default SSH port [default: 22]")]
    pub port: Option<u16>,

    #[arg(
        short = 'p',
        long,
        global = true,
        help = "Maximum parallel connections [default: 16]"
    )]
    pub parallel: Option<usize>,

    #[arg(
        long,
        global = true,
        help = "Command timeout in seconds [default: 120]"
    )]
    pub timeout: Option<u64>,

    #[arg(
        long,
        global = true,
        help = "SSH connection timeout in seconds [default: 10]"
    )]
    pub connect_timeout: Option<u64>,

    #[arg(
        long,
        global = true,
        help = "Attempts per host, including the first [default: 2]"
    )]
    pub retries: Option<u32>,

    #[arg(
        short = 'o',
        long,
        global = true,
        help = "Directory for per-host output files and downloads [default: ./results]"
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Aggregate JSON report path [default: <output-dir>/<command>_results.json]"
    )]
    pub report: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Verify host keys against this known_hosts file (no verification by default)"
    )]
    pub known_hosts: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Run a command on every host of a host list")]
    Exec {
        #[arg(
            trailing_var_arg = true,
            required_unless_present = "script",
            help = "Command to execute on remote hosts [default with --script: sh -s]"
        )]
        command: Vec<String>,

        #[arg(short = 's', long, help = "Local script piped to the command's stdin")]
        script: Option<PathBuf>,

        #[arg(short = 'd', long, help = "Remote file to download after the command")]
        download: Option<String>,

        #[arg(long, help = "Start at this local time (YYYY-MM-DDTHH:MM[:SS])")]
        at: Option<String>,
    },

    #[command(about = "Put machines into overnight testing mode")]
    Start {
        #[arg(short = 'm', long, value_enum, default_value_t = FamilySelection::Both, ignore_case = true)]
        model: FamilySelection,
    },

    #[command(about = "Take machines out of overnight testing mode")]
    Stop {
        #[arg(short = 'm', long, value_enum, default_value_t = FamilySelection::Both, ignore_case = true)]
        model: FamilySelection,
    },

    #[command(about = "Collect error log summaries from machines")]
    Logs {
        #[arg(short = 'm', long, value_enum, default_value_t = FamilySelection::Both, ignore_case = true)]
        model: FamilySelection,

        #[arg(
            long,
            help = "Cutoff (YYYYMMDDHHMM, YYYY-MM-DD HH:MM, ...) [default: SINCE from the inventory]"
        )]
        since: Option<String>,
    },

    #[command(about = "Start testing, wait, stop testing, then collect logs")]
    Overnight {
        #[arg(short = 'm', long, value_enum, default_value_t = FamilySelection::Both, ignore_case = true)]
        model: FamilySelection,

        #[arg(long, help = "Hours to let the test run")]
        hours: f64,

        #[arg(long, help = "Log cutoff [default: SINCE from the inventory]")]
        since: Option<String>,

        #[arg(long, help = "Start at this local time (YYYY-MM-DDTHH:MM[:SS])")]
        at: Option<String>,
    },

    #[command(about = "List inventory machines and their families")]
    List {
        #[arg(short = 'm', long, value_enum, default_value_t = FamilySelection::Both, ignore_case = true)]
        model: FamilySelection,
    },
}
