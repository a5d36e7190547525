//! API Gateway Client
//!
//! Typed bindings to the three remote resource groups (subscriptions,
//! webhook send, delivery status). Every call is a single round trip with no
//! retry and no local state; validation failures short-circuit before any
//! request is issued.

pub mod http;

use async_trait::async_trait;

use crate::error::{ConsoleError, Result};
use crate::models::{
    CreateSubscriptionRequest, DeliveryAttemptRecord, Subscription, WebhookSendRequest,
};

pub use http::ApiClient;

/// Remote operations the console relies on
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>>;

    async fn get_subscription(&self, id: &str) -> Result<Subscription>;

    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<Subscription>;

    async fn delete_subscription(&self, id: &str) -> Result<()>;

    /// Trigger a test delivery. `payload` is raw JSON text, checked before transmission.
    async fn send_webhook(
        &self,
        subscription_id: &str,
        event_type: &str,
        payload: &str,
    ) -> Result<()>;

    /// Recent records; `None` asks the backend for its default most-recent slice
    async fn query_recent(&self, hours: Option<u32>) -> Result<Vec<DeliveryAttemptRecord>>;

    async fn query_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<DeliveryAttemptRecord>>;

    async fn query_by_task(&self, task_id: &str) -> Result<Vec<DeliveryAttemptRecord>>;
}

/// Reject a blank identifier without touching the network
pub fn require_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::validation(format!("missing {}", what)));
    }
    Ok(trimmed)
}

/// Check required fields of a create request
pub fn validate_create(request: &CreateSubscriptionRequest) -> Result<()> {
    if request.target_url.trim().is_empty() {
        return Err(ConsoleError::validation("targetUrl is required"));
    }
    if request.event_type.trim().is_empty() {
        return Err(ConsoleError::validation("eventType is required"));
    }

    let parsed = url::Url::parse(request.target_url.trim()).map_err(|e| {
        ConsoleError::validation(format!("targetUrl is not an absolute URL: {}", e))
    })?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConsoleError::validation(format!(
            "targetUrl must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    Ok(())
}

/// Parse a send request from raw payload text.
///
/// Only syntactic well-formedness is checked; the payload is schema-less.
pub fn prepare_send(
    subscription_id: &str,
    event_type: &str,
    payload: &str,
) -> Result<WebhookSendRequest> {
    require_id(subscription_id, "subscription id")?;
    if event_type.trim().is_empty() {
        return Err(ConsoleError::validation("eventType is required"));
    }

    Ok(WebhookSendRequest {
        event_type: event_type.trim().to_string(),
        payload: parse_payload(payload)?,
    })
}

/// Check that payload text is well-formed JSON
pub fn parse_payload(payload: &str) -> Result<serde_json::Value> {
    serde_json::from_str(payload)
        .map_err(|e| ConsoleError::validation(format!("invalid JSON payload: {}", e)))
}

/// Check a time window before it goes on the wire
pub fn validate_hours(hours: Option<u32>) -> Result<Option<u32>> {
    match hours {
        Some(0) => Err(ConsoleError::validation("hours must be a positive integer")),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id("  abc ", "search id").unwrap(), "abc");
        let err = require_id("   ", "search id").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: missing search id");
    }

    #[test]
    fn test_validate_create() {
        let ok = CreateSubscriptionRequest::new("https://example.com/hook", "user.created", None);
        assert!(validate_create(&ok).is_ok());

        let missing_event = CreateSubscriptionRequest::new("https://example.com/hook", " ", None);
        assert!(validate_create(&missing_event).unwrap_err().is_validation());

        let relative = CreateSubscriptionRequest::new("/hook", "user.created", None);
        assert!(validate_create(&relative).unwrap_err().is_validation());
    }

    #[test]
    fn test_prepare_send_rejects_malformed_json() {
        let err = prepare_send("sub-1", "user.created", "{\"userId\": ").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("invalid JSON payload"));
    }

    #[test]
    fn test_prepare_send_accepts_any_json_value() {
        let req = prepare_send("sub-1", "order.completed", "[1, 2, 3]").unwrap();
        assert_eq!(req.payload, serde_json::json!([1, 2, 3]));
        assert_eq!(req.event_type, "order.completed");
    }

    #[test]
    fn test_validate_hours() {
        assert_eq!(validate_hours(None).unwrap(), None);
        assert_eq!(validate_hours(Some(24)).unwrap(), Some(24));
        assert!(validate_hours(Some(0)).is_err());
    }
}
