//! Subscription Directory Cache
//!
//! Session-scoped snapshot of the subscription registry, used to enrich
//! delivery records (which only carry ids) with human-readable context.

use std::collections::HashMap;
use tracing::info;

use crate::client::DeliveryApi;
use crate::error::Result;
use crate::models::Subscription;

/// Event type reported for ids missing from the snapshot
pub const UNKNOWN_EVENT_TYPE: &str = "Unknown";

/// Latest full list of subscriptions, indexed by id
#[derive(Debug, Clone, Default)]
pub struct SubscriptionDirectory {
    /// Registry order, as returned by the list call
    subscriptions: Vec<Subscription>,
    by_id: HashMap<String, usize>,
}

impl SubscriptionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        let mut directory = Self::new();
        directory.replace(subscriptions);
        directory
    }

    /// Replace the snapshot wholesale
    pub fn replace(&mut self, subscriptions: Vec<Subscription>) {
        self.by_id = subscriptions
            .iter()
            .enumerate()
            .map(|(idx, sub)| (sub.id.clone(), idx))
            .collect();
        self.subscriptions = subscriptions;
    }

    /// Fetch the full list and replace the snapshot.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn reload(&mut self, api: &dyn DeliveryApi) -> Result<usize> {
        let subscriptions = api.list_subscriptions().await?;
        self.replace(subscriptions);
        info!(count = self.subscriptions.len(), "Subscription directory reloaded");
        Ok(self.subscriptions.len())
    }

    pub fn get(&self, id: &str) -> Option<&Subscription> {
        self.by_id.get(id).map(|&idx| &self.subscriptions[idx])
    }

    /// Event type for `id`, or [`UNKNOWN_EVENT_TYPE`] on a miss
    pub fn event_type(&self, id: &str) -> &str {
        self.get(id)
            .map(|sub| sub.event_type.as_str())
            .unwrap_or(UNKNOWN_EVENT_TYPE)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(id: &str, event_type: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            target_url: format!("https://example.com/{}", id),
            event_type: event_type.to_string(),
            secret: None,
            created_at: None,
        }
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let directory = SubscriptionDirectory::from_subscriptions(vec![
            sub("s1", "user.created"),
            sub("s2", "order.completed"),
        ]);

        assert_eq!(directory.event_type("s2"), "order.completed");
        assert_eq!(directory.event_type("gone"), UNKNOWN_EVENT_TYPE);
        assert!(directory.get("gone").is_none());
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut directory =
            SubscriptionDirectory::from_subscriptions(vec![sub("s1", "user.created")]);
        directory.replace(vec![sub("s2", "payment.success")]);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.event_type("s1"), UNKNOWN_EVENT_TYPE);
        assert_eq!(directory.event_type("s2"), "payment.success");
    }

    #[test]
    fn test_iter_keeps_registry_order() {
        let directory = SubscriptionDirectory::from_subscriptions(vec![
            sub("b", "x"),
            sub("a", "y"),
        ]);
        let ids: Vec<&str> = directory.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
