//! Send command implementation
//!
//! Triggers a test delivery. The backend answers with a bare acknowledgement;
//! the delivery itself shows up later in the logs.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};

use hookhub_console::client::{parse_payload, prepare_send, require_id, DeliveryApi};
use hookhub_console::directory::SubscriptionDirectory;

/// Sample payloads for the common event types
pub const TEMPLATES: &[(&str, &str)] = &[
    (
        "user.created",
        r#"{
  "userId": "12345",
  "name": "John Doe",
  "email": "john@example.com"
}"#,
    ),
    (
        "order.completed",
        r#"{
  "orderId": "ORD-789",
  "amount": 99.99,
  "status": "completed"
}"#,
    ),
    (
        "payment.success",
        r#"{
  "paymentId": "PAY-456",
  "amount": 199.99,
  "currency": "USD"
}"#,
    ),
];

/// Send a test webhook
#[derive(Debug, Clone, Parser)]
pub struct SendArgs {
    /// Target subscription
    pub subscription_id: String,

    /// Event type (defaults to the subscription's own event type)
    #[arg(short, long)]
    pub event_type: Option<String>,

    /// Raw JSON payload
    #[arg(short, long, conflicts_with = "template")]
    pub payload: Option<String>,

    /// Use a sample payload (user.created, order.completed, payment.success)
    #[arg(short, long)]
    pub template: Option<String>,
}

/// Look up a sample payload by event type
pub fn template(name: &str) -> Option<&'static str> {
    TEMPLATES
        .iter()
        .find(|(event_type, _)| *event_type == name)
        .map(|(_, payload)| *payload)
}

/// Execute the send command
pub async fn execute(api: &dyn DeliveryApi, args: SendArgs) -> Result<()> {
    // Local input errors are reported before any network call
    let subscription_id = require_id(&args.subscription_id, "subscription id")?.to_string();
    let chosen = chosen_payload(args.payload, args.template.as_deref())?;
    if let Some(payload) = &chosen {
        parse_payload(payload)?;
    }

    let event_type = match args.event_type {
        Some(event_type) => event_type,
        None => default_event_type(api, &subscription_id).await?,
    };
    let payload = chosen.unwrap_or_else(|| sample_payload(&event_type));

    prepare_send(&subscription_id, &event_type, &payload)?;

    api.send_webhook(&subscription_id, &event_type, &payload)
        .await?;
    info!(subscription_id = %subscription_id, event_type = %event_type, "Webhook accepted");

    println!("{}", "✓ Webhook sent successfully!".green());
    println!(
        "  {}",
        format!("Check delivery with: hookhub logs subscription {}", subscription_id).dimmed()
    );
    Ok(())
}

async fn default_event_type(api: &dyn DeliveryApi, subscription_id: &str) -> Result<String> {
    let mut directory = SubscriptionDirectory::new();
    directory.reload(api).await?;

    match directory.get(subscription_id) {
        Some(sub) => Ok(sub.event_type.clone()),
        None => anyhow::bail!(
            "Subscription '{}' not found; pass --event-type to send anyway",
            subscription_id
        ),
    }
}

/// Payload given on the command line, explicitly or by template name
fn chosen_payload(payload: Option<String>, template_name: Option<&str>) -> Result<Option<String>> {
    if let Some(payload) = payload {
        return Ok(Some(payload));
    }

    match template_name {
        Some(name) => match template(name) {
            Some(sample) => Ok(Some(sample.to_string())),
            None => {
                let known: Vec<&str> = TEMPLATES.iter().map(|(name, _)| *name).collect();
                anyhow::bail!("Unknown template '{}'. Must be one of: {}", name, known.join(", "))
            }
        },
        None => Ok(None),
    }
}

/// Sample for the event type, or an empty object when there is none
fn sample_payload(event_type: &str) -> String {
    match template(event_type) {
        Some(sample) => sample.to_string(),
        None => {
            warn!(
                event_type = %event_type,
                "No sample payload for event type; sending empty object"
            );
            "{}".to_string()
        }
    }
}
