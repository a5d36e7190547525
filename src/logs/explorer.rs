use tracing::{info, warn};

use super::filter::OutcomeFilter;
use super::sequence::{FetchTicket, RequestSequencer};
use super::tasks::{distinct_tasks, summarize, TaskRef, TaskSummary};
use crate::client::{require_id, validate_hours, DeliveryApi};
use crate::directory::SubscriptionDirectory;
use crate::error::Result;
use crate::models::DeliveryAttemptRecord;

/// Which identifier the search box holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Subscription,
    Task,
}

impl SearchMode {
    pub fn toggled(&self) -> Self {
        match self {
            Self::Subscription => Self::Task,
            Self::Task => Self::Subscription,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Subscription => "Subscription ID",
            Self::Task => "Task ID",
        }
    }
}

/// One of the three independent query modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogQuery {
    Recent { hours: Option<u32> },
    Subscription(String),
    Task(String),
}

impl LogQuery {
    /// Check inputs without touching the network
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Recent { hours } => validate_hours(*hours).map(|_| ()),
            Self::Subscription(id) | Self::Task(id) => require_id(id, "search id").map(|_| ()),
        }
    }

    pub async fn execute(&self, api: &dyn DeliveryApi) -> Result<Vec<DeliveryAttemptRecord>> {
        match self {
            Self::Recent { hours } => api.query_recent(*hours).await,
            Self::Subscription(id) => api.query_by_subscription(id.trim()).await,
            Self::Task(id) => api.query_by_task(id.trim()).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Recent { hours: None } => "most recent logs".to_string(),
            Self::Recent { hours: Some(h) } => format!("logs from the past {} hours", h),
            Self::Subscription(id) => format!("logs for subscription {}", id),
            Self::Task(id) => format!("logs for task {}", id),
        }
    }
}

/// A fetch that has been issued but not yet applied
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub ticket: FetchTicket,
    pub query: LogQuery,
}

/// Result of applying a completed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Batch replaced with this many records
    Loaded(usize),
    /// Successful call with zero records; informational, not a failure
    Empty,
    /// A newer fetch was issued meanwhile; the response was dropped
    Stale,
}

/// One displayed row
#[derive(Debug, Clone)]
pub struct LogRow<'a> {
    pub record: &'a DeliveryAttemptRecord,
    pub expanded: bool,
    /// Status code in `[200, 300)`, independent of `outcome`
    pub http_success: bool,
}

/// Filtered projection of the current batch
#[derive(Debug, Clone)]
pub struct LogView<'a> {
    pub rows: Vec<LogRow<'a>>,
    /// Size of the unfiltered batch
    pub total: usize,
    pub filter: OutcomeFilter,
}

impl<'a> LogView<'a> {
    pub fn visible(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty_batch(&self) -> bool {
        self.total == 0
    }

    /// True when records exist but none match the filter
    pub fn is_filtered_out(&self) -> bool {
        self.total > 0 && self.rows.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("Showing {} of {} logs", self.visible(), self.total)
    }

    pub fn records(&self) -> Vec<&'a DeliveryAttemptRecord> {
        self.rows.iter().map(|row| row.record).collect()
    }
}

/// Pure view derivation, invoked fresh on every state change
pub fn derive_view<'a>(
    batch: &'a [DeliveryAttemptRecord],
    filter: OutcomeFilter,
    expanded: Option<i64>,
) -> LogView<'a> {
    let rows = filter
        .apply(batch)
        .into_iter()
        .map(|record| LogRow {
            record,
            expanded: expanded == Some(record.id),
            http_success: record.is_http_success(),
        })
        .collect();

    LogView {
        rows,
        total: batch.len(),
        filter,
    }
}

/// Session state of the log surfaces
#[derive(Debug, Default)]
pub struct LogExplorer {
    batch: Vec<DeliveryAttemptRecord>,
    tasks: Vec<TaskRef>,
    directory: SubscriptionDirectory,
    filter: OutcomeFilter,
    search_mode: SearchMode,
    search_id: String,
    expanded: Option<i64>,
    last_query: Option<LogQuery>,
    sequencer: RequestSequencer,
}

impl LogExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(directory: SubscriptionDirectory) -> Self {
        Self {
            directory,
            ..Self::default()
        }
    }

    // --- fetching ---

    /// Validate `query` and tag it with a fresh sequence number.
    ///
    /// Validation failures return before any ticket is issued.
    pub fn begin(&mut self, query: LogQuery) -> Result<PendingFetch> {
        query.validate()?;
        let ticket = self.sequencer.issue();
        Ok(PendingFetch { ticket, query })
    }

    /// Apply the result of a fetch started with [`LogExplorer::begin`].
    ///
    /// Responses from superseded fetches are discarded. A failed fetch leaves
    /// the current batch untouched.
    pub fn complete(
        &mut self,
        pending: PendingFetch,
        result: Result<Vec<DeliveryAttemptRecord>>,
    ) -> Result<FetchOutcome> {
        if !self.sequencer.resolve(pending.ticket) {
            warn!(
                seq = pending.ticket.seq(),
                query = %pending.query.describe(),
                "Discarding stale response"
            );
            return Ok(FetchOutcome::Stale);
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    query = %pending.query.describe(),
                    error = %e,
                    "Fetch failed; keeping previous logs"
                );
                return Err(e);
            }
        };

        self.replace_batch(records);
        self.last_query = Some(pending.query);

        Ok(if self.batch.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Loaded(self.batch.len())
        })
    }

    /// Issue `query`, await it and apply the result
    pub async fn fetch(&mut self, api: &dyn DeliveryApi, query: LogQuery) -> Result<FetchOutcome> {
        let pending = self.begin(query)?;
        let result = pending.query.execute(api).await;
        self.complete(pending, result)
    }

    pub async fn fetch_recent(
        &mut self,
        api: &dyn DeliveryApi,
        hours: Option<u32>,
    ) -> Result<FetchOutcome> {
        self.fetch(api, LogQuery::Recent { hours }).await
    }

    pub async fn fetch_by_subscription(
        &mut self,
        api: &dyn DeliveryApi,
        subscription_id: &str,
    ) -> Result<FetchOutcome> {
        self.fetch(api, LogQuery::Subscription(subscription_id.to_string()))
            .await
    }

    pub async fn fetch_by_task(
        &mut self,
        api: &dyn DeliveryApi,
        task_id: &str,
    ) -> Result<FetchOutcome> {
        self.fetch(api, LogQuery::Task(task_id.to_string())).await
    }

    /// Query built from the current search mode and id
    pub fn search_query(&self) -> LogQuery {
        match self.search_mode {
            SearchMode::Subscription => LogQuery::Subscription(self.search_id.clone()),
            SearchMode::Task => LogQuery::Task(self.search_id.clone()),
        }
    }

    /// Run the search described by the current mode and id
    pub async fn search(&mut self, api: &dyn DeliveryApi) -> Result<FetchOutcome> {
        let query = self.search_query();
        self.fetch(api, query).await
    }

    /// Re-issue the last applied query, if any
    pub fn last_query(&self) -> Option<&LogQuery> {
        self.last_query.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.sequencer.is_loading()
    }

    fn replace_batch(&mut self, records: Vec<DeliveryAttemptRecord>) {
        self.tasks = distinct_tasks(&records);
        if let Some(id) = self.expanded {
            if !records.iter().any(|r| r.id == id) {
                self.expanded = None;
            }
        }
        self.batch = records;
        info!(records = self.batch.len(), tasks = self.tasks.len(), "Delivery log batch replaced");
    }

    /// Drop the batch and the search id; the outcome filter is kept
    pub fn clear(&mut self) {
        self.batch.clear();
        self.tasks.clear();
        self.expanded = None;
        self.search_id.clear();
        self.last_query = None;
    }

    // --- search box ---

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    /// Switch mode; a different mode clears the search id
    pub fn set_search_mode(&mut self, mode: SearchMode) {
        if mode != self.search_mode {
            self.search_mode = mode;
            self.search_id.clear();
        }
    }

    pub fn toggle_search_mode(&mut self) {
        self.set_search_mode(self.search_mode.toggled());
    }

    pub fn search_id(&self) -> &str {
        &self.search_id
    }

    pub fn set_search_id(&mut self, id: impl Into<String>) {
        self.search_id = id.into();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_id.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search_id.pop();
    }

    // --- filter & expansion ---

    pub fn filter(&self) -> OutcomeFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: OutcomeFilter) {
        self.filter = filter;
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
    }

    /// Toggle one record's detail; expanding a record collapses any other
    pub fn toggle_expanded(&mut self, record_id: i64) {
        self.expanded = if self.expanded == Some(record_id) {
            None
        } else {
            Some(record_id)
        };
    }

    pub fn expanded(&self) -> Option<i64> {
        self.expanded
    }

    // --- derived state ---

    pub fn batch(&self) -> &[DeliveryAttemptRecord] {
        &self.batch
    }

    /// Distinct-task index of the current batch, first-seen order
    pub fn task_index(&self) -> &[TaskRef] {
        &self.tasks
    }

    pub fn task_summaries(&self) -> Vec<TaskSummary> {
        summarize(&self.tasks, &self.directory)
    }

    pub fn view(&self) -> LogView<'_> {
        derive_view(&self.batch, self.filter, self.expanded)
    }

    // --- directory ---

    pub fn directory(&self) -> &SubscriptionDirectory {
        &self.directory
    }

    pub fn replace_directory(&mut self, directory: SubscriptionDirectory) {
        self.directory = directory;
    }

    pub async fn reload_directory(&mut self, api: &dyn DeliveryApi) -> Result<usize> {
        self.directory.reload(api).await
    }
}
