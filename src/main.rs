use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands, LogFormat, LogsCommands, SubscriptionCommands};
use hookhub_console::client::DeliveryApi;
use hookhub_console::config::{self, Config};
use hookhub_console::init_tracing;
use hookhub_console::logs::LogQuery;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let args = Cli::parse();

    // Config errors are reported by the command, after logging is up
    let loaded = config::load_config(&args.config);

    let json_logs = match args.log_format {
        Some(format) => format == LogFormat::Json,
        None => matches!(&loaded, Ok(cfg) if cfg.log_format == "json"),
    };
    init_tracing(json_logs);

    if let Err(e) = run(args, loaded).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Cli, loaded: Result<Config>) -> Result<()> {
    // Dispatch to appropriate command handler
    match args.command {
        Commands::Version => {
            println!("HookHub Console v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Sign(sign_args) => commands::sign::execute(sign_args),
        Commands::Config { action } => {
            let cfg = loaded?;
            match action {
                ConfigCommands::Show => commands::config::show(&args.config, &cfg),
                ConfigCommands::Validate => commands::config::validate(&args.config, &cfg),
            }
        }
        Commands::Subscriptions { action } => {
            let cfg = loaded?;
            let api = commands::api_client(&cfg)?;
            match action {
                SubscriptionCommands::List { format } => {
                    commands::subscriptions::list(&api, format).await
                }
                SubscriptionCommands::Show { id, format } => {
                    commands::subscriptions::show(&api, &id, format).await
                }
                SubscriptionCommands::Create {
                    url,
                    event_type,
                    secret,
                } => commands::subscriptions::create(&api, url, event_type, secret).await,
                SubscriptionCommands::Delete { id } => {
                    commands::subscriptions::delete(&api, &id).await
                }
            }
        }
        Commands::Send(send_args) => {
            let cfg = loaded?;
            let api = commands::api_client(&cfg)?;
            commands::send::execute(&api, send_args).await
        }
        Commands::Logs { action } => {
            let cfg = loaded?;
            let api = commands::api_client(&cfg)?;
            match action {
                LogsCommands::Recent { hours, display } => {
                    let hours = hours.or(cfg.logs.default_hours);
                    commands::logs::execute(&api, LogQuery::Recent { hours }, display).await
                }
                LogsCommands::Subscription { id, display } => {
                    commands::logs::execute(&api, LogQuery::Subscription(id), display).await
                }
                LogsCommands::Task { id, display } => {
                    commands::logs::execute(&api, LogQuery::Task(id), display).await
                }
                LogsCommands::Tasks { hours, format } => {
                    let hours = hours.or(cfg.logs.default_hours);
                    commands::logs::tasks(&api, hours, format).await
                }
            }
        }
        Commands::Browse { hours } => {
            let cfg = loaded?;
            let api: Arc<dyn DeliveryApi> = Arc::new(commands::api_client(&cfg)?);
            commands::browse::execute(api, hours, cfg.logs.refresh_seconds).await
        }
    }
}
