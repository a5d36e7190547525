//! Subscriptions command implementation
//!
//! Thin wrappers around the registry calls. Secrets are rendered masked in
//! both text and JSON output.

use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde_json::json;
use tracing::{info, warn};

use hookhub_console::client::DeliveryApi;
use hookhub_console::directory::SubscriptionDirectory;
use hookhub_console::logging::mask_secret;
use hookhub_console::models::{CreateSubscriptionRequest, Subscription};

use crate::cli::OutputFormat;

/// Execute `subscriptions list`
pub async fn list(api: &dyn DeliveryApi, format: OutputFormat) -> Result<()> {
    let subscriptions = api.list_subscriptions().await?;
    info!(count = subscriptions.len(), "Subscriptions loaded");

    if format == OutputFormat::Json {
        let masked: Vec<serde_json::Value> = subscriptions.iter().map(masked_json).collect();
        println!("{}", serde_json::to_string_pretty(&masked)?);
        return Ok(());
    }

    if subscriptions.is_empty() {
        println!(
            "{}",
            "No subscriptions yet. Create one with `hookhub subscriptions create`.".yellow()
        );
        return Ok(());
    }

    println!("{}", format!("Found {} subscription(s)", subscriptions.len()).bold());
    println!("{}", subscription_table(&subscriptions));
    Ok(())
}

/// Execute `subscriptions show`
pub async fn show(api: &dyn DeliveryApi, id: &str, format: OutputFormat) -> Result<()> {
    let sub = api.get_subscription(id).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&masked_json(&sub))?),
        OutputFormat::Text => print_details(&sub),
    }
    Ok(())
}

/// Execute `subscriptions create`
pub async fn create(
    api: &dyn DeliveryApi,
    url: String,
    event_type: String,
    secret: Option<String>,
) -> Result<()> {
    let request = CreateSubscriptionRequest::new(url, event_type, secret);
    let created = api.create_subscription(&request).await?;
    info!(id = %created.id, event_type = %created.event_type, "Subscription created");

    println!("{}", "✓ Subscription created".green());
    print_details(&created);
    report_registry(api).await;
    Ok(())
}

/// Execute `subscriptions delete`
pub async fn delete(api: &dyn DeliveryApi, id: &str) -> Result<()> {
    api.delete_subscription(id).await?;
    info!(id = %id.trim(), "Subscription deleted");

    println!("{}", format!("✓ Subscription {} deleted", id.trim()).green());
    report_registry(api).await;
    Ok(())
}

/// Reload the directory after a registry change and report its size
async fn report_registry(api: &dyn DeliveryApi) {
    let mut directory = SubscriptionDirectory::new();
    match directory.reload(api).await {
        Ok(count) => println!("  {}", format!("{} subscription(s) registered", count).dimmed()),
        Err(e) => warn!(error = %e, "Could not reload subscriptions"),
    }
}

fn subscription_table(subscriptions: &[Subscription]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("EVENT TYPE").fg(Color::Cyan),
        Cell::new("TARGET URL").fg(Color::Cyan),
        Cell::new("SECRET").fg(Color::Cyan),
        Cell::new("CREATED").fg(Color::Cyan),
    ]);

    for sub in subscriptions {
        let secret = if sub.has_secret() {
            Cell::new("set").fg(Color::Green)
        } else {
            Cell::new("-")
        };
        table.add_row(vec![
            Cell::new(&sub.id),
            Cell::new(&sub.event_type).fg(Color::Yellow),
            Cell::new(&sub.target_url),
            secret,
            Cell::new(sub.created_at.as_deref().unwrap_or("-")),
        ]);
    }

    table
}

fn print_details(sub: &Subscription) {
    println!("  {} {}", "ID:".bold(), sub.id);
    println!("  {} {}", "Event Type:".bold(), sub.event_type.yellow());
    println!("  {} {}", "Target URL:".bold(), sub.target_url);
    println!("  {} {}", "Secret:".bold(), mask_secret(sub.secret.as_deref()));
    if let Some(created_at) = &sub.created_at {
        println!("  {} {}", "Created:".bold(), created_at.dimmed());
    }
}

fn masked_json(sub: &Subscription) -> serde_json::Value {
    json!({
        "id": sub.id,
        "targetUrl": sub.target_url,
        "eventType": sub.event_type,
        "secret": if sub.has_secret() { Some(mask_secret(sub.secret.as_deref())) } else { None },
        "createdAt": sub.created_at,
    })
}
