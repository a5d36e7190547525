/// End-to-end tests for the log explorer over an in-memory backend
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hookhub_console::client::DeliveryApi;
use hookhub_console::directory::UNKNOWN_EVENT_TYPE;
use hookhub_console::error::{ConsoleError, Result};
use hookhub_console::logs::{FetchOutcome, LogExplorer, LogQuery, OutcomeFilter, SearchMode};
use hookhub_console::models::{
    CreateSubscriptionRequest, DeliveryAttemptRecord, Outcome, Subscription,
};

/// Backend double that serves a fixed record set and counts calls
#[derive(Default)]
struct FakeApi {
    subscriptions: Vec<Subscription>,
    records: Vec<DeliveryAttemptRecord>,
    fail_queries: bool,
    calls: AtomicUsize,
    last_hours: Mutex<Option<Option<u32>>>,
}

impl FakeApi {
    fn with_records(records: Vec<DeliveryAttemptRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn query(
        &self,
        keep: impl Fn(&DeliveryAttemptRecord) -> bool,
    ) -> Result<Vec<DeliveryAttemptRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries {
            return Err(ConsoleError::Transport("connection refused".into()));
        }
        Ok(self.records.iter().filter(|r| keep(r)).cloned().collect())
    }
}

#[async_trait]
impl DeliveryApi for FakeApi {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.subscriptions.clone())
    }

    async fn get_subscription(&self, id: &str) -> Result<Subscription> {
        self.subscriptions
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ConsoleError::NotFound(id.to_string()))
    }

    async fn create_subscription(
        &self,
        _request: &CreateSubscriptionRequest,
    ) -> Result<Subscription> {
        Err(ConsoleError::Api {
            status: 501,
            message: "not supported".into(),
        })
    }

    async fn delete_subscription(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn send_webhook(
        &self,
        _subscription_id: &str,
        _event_type: &str,
        _payload: &str,
    ) -> Result<()> {
        Ok(())
    }

    async fn query_recent(&self, hours: Option<u32>) -> Result<Vec<DeliveryAttemptRecord>> {
        *self.last_hours.lock().unwrap() = Some(hours);
        self.query(|_| true)
    }

    async fn query_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<DeliveryAttemptRecord>> {
        self.query(|r| r.subscription_id == subscription_id)
    }

    async fn query_by_task(&self, task_id: &str) -> Result<Vec<DeliveryAttemptRecord>> {
        self.query(|r| r.delivery_task_id == task_id)
    }
}

fn record(
    id: i64,
    task: &str,
    subscription: &str,
    attempt: u32,
    outcome: Outcome,
    status: Option<u16>,
) -> DeliveryAttemptRecord {
    DeliveryAttemptRecord {
        id,
        delivery_task_id: task.to_string(),
        subscription_id: subscription.to_string(),
        target_url: "https://example.com/hook".to_string(),
        timestamp: format!("2024-05-01T10:00:0{}", id),
        attempt_number: attempt,
        outcome,
        http_status_code: status,
        error_details: None,
    }
}

/// T1 retried twice then succeeded, T2 failed terminally
fn retry_scenario() -> Vec<DeliveryAttemptRecord> {
    vec![
        record(1, "T1", "s1", 1, Outcome::FailedAttempt, Some(500)),
        record(2, "T1", "s1", 2, Outcome::FailedAttempt, Some(503)),
        record(3, "T1", "s1", 3, Outcome::Success, Some(200)),
        record(4, "T2", "s2", 1, Outcome::Failure, Some(404)),
    ]
}

#[tokio::test]
async fn test_outcome_filter_over_retry_scenario() {
    let api = FakeApi::with_records(retry_scenario());
    let mut explorer = LogExplorer::new();

    let outcome = explorer.fetch_recent(&api, Some(24)).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Loaded(4));
    assert_eq!(*api.last_hours.lock().unwrap(), Some(Some(24)));

    explorer.set_filter(OutcomeFilter::Only(Outcome::FailedAttempt));
    let view = explorer.view();
    let ids: Vec<i64> = view.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(view.records().iter().all(|r| r.delivery_task_id == "T1"));

    explorer.set_filter(OutcomeFilter::Only(Outcome::Success));
    let view = explorer.view();
    assert_eq!(view.visible(), 1);
    assert_eq!(view.records()[0].attempt_number, 3);
    assert_eq!(view.summary(), "Showing 1 of 4 logs");

    // Filtering never alters the batch
    explorer.set_filter(OutcomeFilter::All);
    assert_eq!(explorer.view().visible(), 4);
    assert_eq!(explorer.batch().len(), 4);

    let tasks: Vec<&str> = explorer.task_index().iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(tasks, vec!["T1", "T2"]);
}

#[tokio::test]
async fn test_status_colouring_is_independent_of_outcome() {
    let api = FakeApi::with_records(vec![
        record(1, "T1", "s1", 1, Outcome::FailedAttempt, Some(204)),
        record(2, "T2", "s1", 1, Outcome::Success, Some(302)),
        record(3, "T3", "s1", 1, Outcome::FailedAttempt, None),
    ]);
    let mut explorer = LogExplorer::new();
    explorer.fetch_by_subscription(&api, "s1").await.unwrap();

    let success: Vec<bool> = explorer.view().rows.iter().map(|r| r.http_success).collect();
    assert_eq!(success, vec![true, false, false]);
}

#[tokio::test]
async fn test_blank_search_makes_no_call() {
    let api = FakeApi::with_records(retry_scenario());
    let mut explorer = LogExplorer::new();
    explorer.set_search_mode(SearchMode::Subscription);
    explorer.set_search_id("   ");

    let err = explorer.search(&api).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(api.calls(), 0);
    assert!(!explorer.is_loading());
}

#[tokio::test]
async fn test_search_by_task_mode() {
    let api = FakeApi::with_records(retry_scenario());
    let mut explorer = LogExplorer::new();

    explorer.set_search_id("s1");
    explorer.toggle_search_mode();
    assert_eq!(explorer.search_mode(), SearchMode::Task);
    assert_eq!(explorer.search_id(), "");

    explorer.set_search_id("T2");
    let outcome = explorer.search(&api).await.unwrap();
    assert_eq!(outcome, FetchOutcome::Loaded(1));
    assert_eq!(explorer.last_query(), Some(&LogQuery::Task("T2".into())));
}

#[tokio::test]
async fn test_empty_result_is_not_an_error() {
    let api = FakeApi::with_records(retry_scenario());
    let mut explorer = LogExplorer::new();

    let outcome = explorer.fetch_by_task(&api, "T-none").await.unwrap();
    assert_eq!(outcome, FetchOutcome::Empty);
    assert!(explorer.batch().is_empty());
    assert!(explorer.task_index().is_empty());
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_state() {
    let good = FakeApi::with_records(retry_scenario());
    let mut explorer = LogExplorer::new();
    explorer.fetch_recent(&good, None).await.unwrap();
    explorer.toggle_expanded(3);

    let broken = FakeApi {
        fail_queries: true,
        ..FakeApi::default()
    };
    let err = explorer.fetch_recent(&broken, Some(72)).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Transport(_)));
    assert_eq!(explorer.batch().len(), 4);
    assert_eq!(explorer.task_index().len(), 2);
    assert_eq!(explorer.expanded(), Some(3));
    assert_eq!(explorer.last_query(), Some(&LogQuery::Recent { hours: None }));
}

#[tokio::test]
async fn test_out_of_order_responses_apply_latest_only() {
    let api = FakeApi::with_records(retry_scenario());
    let mut explorer = LogExplorer::new();

    let slow = explorer.begin(LogQuery::Subscription("s1".into())).unwrap();
    let fast = explorer.begin(LogQuery::Subscription("s2".into())).unwrap();

    let fast_result = fast.query.execute(&api).await;
    let slow_result = slow.query.execute(&api).await;

    assert_eq!(explorer.complete(fast, fast_result).unwrap(), FetchOutcome::Loaded(1));
    assert_eq!(explorer.complete(slow, slow_result).unwrap(), FetchOutcome::Stale);

    assert_eq!(explorer.batch().len(), 1);
    assert_eq!(explorer.batch()[0].subscription_id, "s2");
    assert!(!explorer.is_loading());
}

#[tokio::test]
async fn test_task_summaries_resolve_event_types() {
    let api = FakeApi {
        subscriptions: vec![Subscription {
            id: "s1".to_string(),
            target_url: "https://example.com/hook".to_string(),
            event_type: "order.completed".to_string(),
            secret: None,
            created_at: None,
        }],
        records: retry_scenario(),
        ..FakeApi::default()
    };
    let mut explorer = LogExplorer::new();
    assert_eq!(explorer.reload_directory(&api).await.unwrap(), 1);
    explorer.fetch_recent(&api, None).await.unwrap();

    let summaries = explorer.task_summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].task_id, "T1");
    assert_eq!(summaries[0].event_type, "order.completed");
    // s2 was deleted from the registry
    assert_eq!(summaries[1].event_type, UNKNOWN_EVENT_TYPE);
}
