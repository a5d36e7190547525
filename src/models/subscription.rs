use serde::{Deserialize, Serialize};

/// A registered binding of an event type to a delivery target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Opaque identifier assigned by the registry
    pub id: String,
    /// Delivery destination
    pub target_url: String,
    /// Kind of event this subscription receives
    pub event_type: String,
    /// Signing secret (never displayed in plaintext)
    #[serde(default, alias = "secretKey", skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Creation time, set by the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Subscription {
    /// Whether a non-empty signing secret is configured
    pub fn has_secret(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Body of `POST /subscriptions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub target_url: String,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl CreateSubscriptionRequest {
    /// Build a request, treating an empty secret as absent
    pub fn new(
        target_url: impl Into<String>,
        event_type: impl Into<String>,
        secret: Option<String>,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            event_type: event_type.into(),
            secret: secret.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Body of `POST /webhooks/{subscriptionId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSendRequest {
    pub event_type: String,
    /// Schema-less event payload
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscription_deserializes_without_optional_fields() {
        let sub: Subscription = serde_json::from_value(json!({
            "id": "a1",
            "targetUrl": "https://example.com/hook",
            "eventType": "user.created"
        }))
        .unwrap();

        assert_eq!(sub.id, "a1");
        assert!(sub.secret.is_none());
        assert!(sub.created_at.is_none());
        assert!(!sub.has_secret());
    }

    #[test]
    fn test_subscription_accepts_secret_key_alias() {
        let sub: Subscription = serde_json::from_value(json!({
            "id": "a1",
            "targetUrl": "https://example.com/hook",
            "eventType": "user.created",
            "secretKey": "s3cr3t"
        }))
        .unwrap();

        assert!(sub.has_secret());
    }

    #[test]
    fn test_create_request_drops_blank_secret() {
        let req = CreateSubscriptionRequest::new(
            "https://example.com",
            "order.completed",
            Some("  ".into()),
        );
        assert!(req.secret.is_none());

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            json!({"targetUrl": "https://example.com", "eventType": "order.completed"})
        );
    }
}
