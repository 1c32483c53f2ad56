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

use anyhow::Result;
use clap::Parser;
use owo_colors::OwoColorize;

use psfleet::{
    cli::{Cli, Commands},
    commands::{
        exec::{execute_command, ExecuteCommandParams},
        list::list_machines,
        logs::collect_and_report,
        overnight::{run_overnight, start_or_stop, OvernightParams, TestAction},
        FleetContext,
    },
    config::{describe_key, obtain_password, Config, ConfigError, RunSettings},
    hostlist::Inventory,
    utils::init_logging,
};

/// Exit status for configuration problems detected before any host is contacted.
const CONFIG_ERROR_EXIT_CODE: i32 = 2;

#[tokio::main]
async fn main() {
    // .env must be loaded before parsing so SSH_USERNAME/SSH_PASSWORD fall back to it
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        if let Some(config_error) = e.downcast_ref::<ConfigError>() {
            eprintln!("{} {}", "error:".red().bold(), config_error);
            std::process::exit(CONFIG_ERROR_EXIT_CODE);
        }
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_with_priority(cli.config.as_deref()).await?;

    if let Commands::List { model } = &cli.command {
        let hosts_file = RunSettings::hosts_file(&cli.connection, &config);
        let inventory = Inventory::load(&hosts_file)
            .await
            .map_err(ConfigError::from)?;
        list_machines(&inventory, *model);
        return Ok(());
    }

    let password = obtain_password(&cli.connection)?;
    let settings = RunSettings::resolve(&cli.connection, &config, password)?;
    tracing::debug!(
        "Settings: hosts={:?} parallel={} attempts={} timeout={:?} key={} password={}",
        settings.hosts_file,
        settings.parallel,
        settings.retry.max_attempts(),
        settings.timeout,
        describe_key(settings.credentials.key_path()),
        settings.credentials.has_password()
    );

    let ctx = FleetContext::over_ssh(settings);

    match cli.command {
        Commands::Exec {
            command,
            script,
            download,
            at,
        } => {
            execute_command(
                &ctx,
                ExecuteCommandParams {
                    command,
                    script,
                    download,
                    at,
                },
            )
            .await?;
        }
        Commands::Start { model } => {
            let inventory = load_inventory(&ctx).await?;
            start_or_stop(&ctx, &inventory, model, TestAction::Start).await?;
        }
        Commands::Stop { model } => {
            let inventory = load_inventory(&ctx).await?;
            start_or_stop(&ctx, &inventory, model, TestAction::Stop).await?;
        }
        Commands::Logs { model, since } => {
            let inventory = load_inventory(&ctx).await?;
            collect_and_report(&ctx, &inventory, model, since.as_deref()).await?;
        }
        Commands::Overnight {
            model,
            hours,
            since,
            at,
        } => {
            let inventory = load_inventory(&ctx).await?;
            run_overnight(
                &ctx,
                &inventory,
                OvernightParams {
                    selection: model,
                    hours,
                    since,
                    at,
                },
            )
            .await?;
        }
        Commands::List { .. } => {}
    }

    Ok(())
}

async fn load_inventory(ctx: &FleetContext) -> Result<Inventory> {
    let inventory = Inventory::load(&ctx.settings.hosts_file)
        .await
        .map_err(ConfigError::from)?;
    if inventory.machines.is_empty() {
        tracing::warn!("Inventory {:?} lists no machines", ctx.settings.hosts_file);
    }
    Ok(inventory)
}
