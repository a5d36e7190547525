//! reqwest-backed implementation of [`DeliveryApi`]

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{prepare_send, require_id, validate_create, validate_hours, DeliveryApi};
use crate::config::ApiConfig;
use crate::error::{ConsoleError, Result};
use crate::models::{CreateSubscriptionRequest, DeliveryAttemptRecord, Subscription};

/// HTTP client for the HookHub API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. "http://localhost:8080/api")
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ConsoleError::validation(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::validation(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ConsoleError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(cfg: &ApiConfig) -> Result<Self> {
        Self::new(&cfg.base_url, Duration::from_secs(cfg.timeout_seconds))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(method = "GET", url = %url, "Sending request");
        let response = self.client.get(url).send().await?;
        let response = check_status(response, what).await?;
        decode(response).await
    }
}

#[async_trait]
impl DeliveryApi for ApiClient {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.get_json(self.endpoint(&["subscriptions"]), "subscriptions")
            .await
    }

    async fn get_subscription(&self, id: &str) -> Result<Subscription> {
        let id = require_id(id, "subscription id")?;
        self.get_json(self.endpoint(&["subscriptions", id]), &format!("subscription {}", id))
            .await
    }

    async fn create_subscription(
        &self,
        request: &CreateSubscriptionRequest,
    ) -> Result<Subscription> {
        validate_create(request)?;

        let url = self.endpoint(&["subscriptions"]);
        debug!(method = "POST", url = %url, event_type = %request.event_type, "Sending request");
        let response = self.client.post(url).json(request).send().await?;
        let response = check_status(response, "subscription").await?;
        decode(response).await
    }

    async fn delete_subscription(&self, id: &str) -> Result<()> {
        let id = require_id(id, "subscription id")?;

        let url = self.endpoint(&["subscriptions", id]);
        debug!(method = "DELETE", url = %url, "Sending request");
        let response = self.client.delete(url).send().await?;
        check_status(response, &format!("subscription {}", id)).await?;
        Ok(())
    }

    async fn send_webhook(
        &self,
        subscription_id: &str,
        event_type: &str,
        payload: &str,
    ) -> Result<()> {
        let body = prepare_send(subscription_id, event_type, payload)?;
        let subscription_id = subscription_id.trim();

        let url = self.endpoint(&["webhooks", subscription_id]);
        debug!(method = "POST", url = %url, event_type = %body.event_type, "Sending request");
        let response = self.client.post(url).json(&body).send().await?;
        check_status(response, &format!("subscription {}", subscription_id)).await?;
        Ok(())
    }

    async fn query_recent(&self, hours: Option<u32>) -> Result<Vec<DeliveryAttemptRecord>> {
        let hours = validate_hours(hours)?;

        let mut url = self.endpoint(&["status", "recent"]);
        if let Some(hours) = hours {
            url.query_pairs_mut().append_pair("hours", &hours.to_string());
        }
        self.get_json(url, "recent delivery logs").await
    }

    async fn query_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<DeliveryAttemptRecord>> {
        let id = require_id(subscription_id, "search id")?;
        self.get_json(
            self.endpoint(&["status", "subscription", id]),
            &format!("delivery logs for subscription {}", id),
        )
        .await
    }

    async fn query_by_task(&self, task_id: &str) -> Result<Vec<DeliveryAttemptRecord>> {
        let id = require_id(task_id, "search id")?;

        let url = self.endpoint(&["status", "task", id]);
        debug!(method = "GET", url = %url, "Sending request");
        let response = self.client.get(url).send().await?;

        // The status service answers 404 for a task with no records
        if response.status() == StatusCode::NOT_FOUND {
            debug!(task_id = %id, "No records for task");
            return Ok(Vec::new());
        }

        let response = check_status(response, &format!("delivery logs for task {}", id)).await?;
        decode(response).await
    }
}

/// Map a non-2xx response onto the error taxonomy
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    });

    Err(match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ConsoleError::Validation(message)
        }
        StatusCode::NOT_FOUND => ConsoleError::NotFound(format!("{} ({})", what, message)),
        _ => ConsoleError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": ..}`, `{"error": ..}` and `{"error": {"message": ..}}`,
/// falling back to the raw text.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let candidate = value
            .get("message")
            .or_else(|| value.get("error").and_then(|e| e.get("message")))
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str());
        if let Some(msg) = candidate {
            return Some(msg.to_string());
        }
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:8080/api");
        assert_eq!(
            c.endpoint(&["status", "recent"]).as_str(),
            "http://localhost:8080/api/status/recent"
        );

        let c = client("http://localhost:8080/api/");
        assert_eq!(
            c.endpoint(&["subscriptions"]).as_str(),
            "http://localhost:8080/api/subscriptions"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let c = client("http://localhost:8080/api");
        assert_eq!(
            c.endpoint(&["subscriptions", "a/b"]).as_str(),
            "http://localhost:8080/api/subscriptions/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(ApiClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("mailto:ops@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(extract_message(""), None);
        assert_eq!(
            extract_message(r#"{"message": "eventType must not be blank"}"#).as_deref(),
            Some("eventType must not be blank")
        );
        assert_eq!(
            extract_message(r#"{"error": {"message": "nope"}}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(
            extract_message("Subscription ID not found.").as_deref(),
            Some("Subscription ID not found.")
        );
    }
}
