use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use hookhub_console::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "hookhub", version, about = "HookHub webhook delivery console")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Diagnostic log format (overrides log_format from the config file)
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Output format for listing commands
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage webhook subscriptions
    Subscriptions {
        #[command(subcommand)]
        action: SubscriptionCommands,
    },

    /// Send a test webhook to a subscription
    Send(crate::commands::send::SendArgs),

    /// Query delivery logs
    Logs {
        #[command(subcommand)]
        action: LogsCommands,
    },

    /// Interactive delivery log browser
    Browse {
        /// Initial window in hours (24, 48 or 72); omitted loads the most recent logs
        #[arg(long)]
        hours: Option<u32>,
    },

    /// Compute or verify a webhook signature
    Sign(crate::commands::sign::SignArgs),

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubscriptionCommands {
    /// List all subscriptions
    List {
        #[arg(short = 'f', long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show one subscription
    Show {
        id: String,
        #[arg(short = 'f', long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Register a new subscription
    Create {
        /// Absolute http(s) URL that receives deliveries
        #[arg(long)]
        url: String,

        /// Event type to subscribe to
        #[arg(long)]
        event_type: String,

        /// Optional signing secret
        #[arg(long, env = "HOOKHUB_SECRET", hide_env_values = true)]
        secret: Option<String>,
    },

    /// Delete a subscription
    Delete { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum LogsCommands {
    /// Logs within a time window
    Recent {
        /// Window in hours; omitted asks the server for its most recent slice
        #[arg(long)]
        hours: Option<u32>,

        #[command(flatten)]
        display: crate::commands::logs::DisplayArgs,
    },

    /// All logs of one subscription
    Subscription {
        id: String,

        #[command(flatten)]
        display: crate::commands::logs::DisplayArgs,
    },

    /// All attempts of one delivery task
    Task {
        id: String,

        #[command(flatten)]
        display: crate::commands::logs::DisplayArgs,
    },

    /// Distinct delivery tasks within a window
    Tasks {
        #[arg(long)]
        hours: Option<u32>,

        #[arg(short = 'f', long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Validate configuration file
    Validate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookhub_console::logs::OutcomeFilter;
    use hookhub_console::models::Outcome;

    #[test]
    fn test_cli_parsing_logs_recent() {
        let args = vec!["hookhub", "logs", "recent", "--hours", "48", "--outcome", "failure"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Logs {
                action: LogsCommands::Recent { hours, display },
            } => {
                assert_eq!(hours, Some(48));
                assert_eq!(display.outcome, Some(OutcomeFilter::Only(Outcome::Failure)));
                assert_eq!(display.format, OutputFormat::Text);
            }
            _ => panic!("Expected logs recent command"),
        }
    }

    #[test]
    fn test_cli_parsing_logs_task_json() {
        let args = vec!["hookhub", "logs", "task", "T1", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Logs {
                action: LogsCommands::Task { id, display },
            } => {
                assert_eq!(id, "T1");
                assert_eq!(display.format, OutputFormat::Json);
            }
            _ => panic!("Expected logs task command"),
        }
    }

    #[test]
    fn test_cli_parsing_create_subscription() {
        let args = vec![
            "hookhub",
            "subscriptions",
            "create",
            "--url",
            "https://example.com/hook",
            "--event-type",
            "user.created",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Subscriptions {
                action: SubscriptionCommands::Create { url, event_type, .. },
            } => {
                assert_eq!(url, "https://example.com/hook");
                assert_eq!(event_type, "user.created");
            }
            _ => panic!("Expected subscriptions create command"),
        }
    }

    #[test]
    fn test_global_options() {
        let args = vec![
            "hookhub",
            "config",
            "show",
            "--config",
            "other.toml",
            "--log-format",
            "json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.config, PathBuf::from("other.toml"));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigCommands::Show
            }
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(vec!["hookhub"]).is_err());
    }
}
