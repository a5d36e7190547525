//! Wire types exchanged with the HookHub API
//!
//! All payloads are camelCase JSON.

pub mod delivery;
pub mod subscription;

pub use delivery::{DeliveryAttemptRecord, Outcome};
pub use subscription::{CreateSubscriptionRequest, Subscription, WebhookSendRequest};
