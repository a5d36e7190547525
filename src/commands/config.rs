use anyhow::Result;
use colored::Colorize;
use hookhub_console::config::Config;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the effective configuration (file plus environment overrides)
pub fn show(path: &Path, cfg: &Config) -> Result<()> {
    info!(path = %path.display(), "Displaying configuration");

    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    println!("{} {}", "Configuration source:".bold(), source.dimmed());
    println!();

    let toml_string = toml::to_string_pretty(cfg)?;
    println!("{}", toml_string);
    Ok(())
}

/// Execute the config validate command
pub fn validate(path: &Path, cfg: &Config) -> Result<()> {
    info!(path = %path.display(), "Configuration validation successful");

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  API Base URL: {}", cfg.api.base_url);
    println!("  Timeout: {}s", cfg.api.timeout_seconds);
    println!(
        "  Default Window: {}",
        cfg.logs
            .default_hours
            .map(|h| format!("{} hours", h))
            .unwrap_or_else(|| "most recent".to_string())
    );
    println!(
        "  Browser Refresh: {}",
        match cfg.logs.refresh_seconds {
            0 => "off".to_string(),
            s => format!("every {}s", s),
        }
    );
    Ok(())
}
