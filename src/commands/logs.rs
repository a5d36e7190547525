//! Logs query command
//!
//! Fetches delivery logs through the [`LogExplorer`] and prints the filtered
//! view, either as text or JSON.

use anyhow::Result;
use clap::Args;
use colored::{ColoredString, Colorize};
use serde_json::json;

use hookhub_console::client::{validate_hours, DeliveryApi};
use hookhub_console::logs::{
    FetchOutcome, LogExplorer, LogQuery, LogView, OutcomeFilter, TaskTimeline,
};
use hookhub_console::models::{DeliveryAttemptRecord, Outcome};
use tracing::warn;

use crate::cli::OutputFormat;

/// Display options shared by the log queries
#[derive(Debug, Clone, Args)]
pub struct DisplayArgs {
    /// Only show attempts with this outcome (all, SUCCESS, FAILED_ATTEMPT, FAILURE)
    #[arg(short, long)]
    pub outcome: Option<OutcomeFilter>,

    /// Output format (text, json)
    #[arg(short = 'f', long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Show full details of one record
    #[arg(short, long, value_name = "RECORD_ID")]
    pub expand: Option<i64>,
}

/// Execute `logs recent`, `logs subscription` and `logs task`
pub async fn execute(api: &dyn DeliveryApi, query: LogQuery, display: DisplayArgs) -> Result<()> {
    // Nothing goes on the wire for an invalid query
    query.validate()?;

    let mut explorer = load_explorer(api).await;
    if let Some(filter) = display.outcome {
        explorer.set_filter(filter);
    }

    let outcome = explorer.fetch(api, query.clone()).await?;
    if let Some(id) = display.expand {
        explorer.toggle_expanded(id);
    }

    let view = explorer.view();
    match display.format {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Text => {
            if outcome == FetchOutcome::Empty {
                println!("{}", format!("No {} found", query.describe()).yellow());
                return Ok(());
            }
            if matches!(query, LogQuery::Task(_)) {
                print_timeline(&explorer, &view);
            } else {
                print_text(&explorer, &view);
            }
            if let Some(id) = display.expand {
                match view.rows.iter().find(|row| row.expanded) {
                    Some(row) => print_detail(&explorer, row.record),
                    None => println!(
                        "{}",
                        format!("Record {} is not in the displayed logs", id).yellow()
                    ),
                }
            }
        }
    }

    Ok(())
}

/// Execute `logs tasks`
pub async fn tasks(api: &dyn DeliveryApi, hours: Option<u32>, format: OutputFormat) -> Result<()> {
    validate_hours(hours)?;
    let mut explorer = load_explorer(api).await;
    explorer.fetch_recent(api, hours).await?;
    let summaries = explorer.task_summaries();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("{}", "No delivery tasks found".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} task(s)", summaries.len()).bold());
    for summary in summaries {
        println!("  {}  {}", summary.task_id, summary.event_type.cyan());
    }
    Ok(())
}

/// Explorer with a best-effort directory snapshot
async fn load_explorer(api: &dyn DeliveryApi) -> LogExplorer {
    let mut explorer = LogExplorer::new();
    if let Err(e) = explorer.reload_directory(api).await {
        // Lookups fall back to "Unknown"
        warn!(error = %e, "Could not load subscriptions");
    }
    explorer
}

fn print_text(explorer: &LogExplorer, view: &LogView<'_>) {
    println!("{}", view.summary().bold());
    if view.is_filtered_out() {
        println!("{}", format!("No logs match the {} filter", view.filter).yellow());
        return;
    }
    println!();

    for row in &view.rows {
        let record = row.record;
        println!(
            "{} {} {} {} {} {}",
            record.short_timestamp().dimmed(),
            format!("{}...", record.short_task_id()).cyan(),
            format!("#{}", record.attempt_number),
            outcome_colored(record.outcome),
            status_colored(record),
            explorer.directory().event_type(&record.subscription_id).dimmed(),
        );
    }
}

fn print_timeline(explorer: &LogExplorer, view: &LogView<'_>) {
    println!("{}", view.summary().bold());

    for (timeline, shown) in timeline_rows(explorer, view.filter) {
        let state = if timeline.is_settled() {
            "settled".green()
        } else {
            "retrying".yellow()
        };
        println!();
        println!(
            "{} {} ({} attempt(s), {}, {} {})",
            "Task".bold(),
            timeline.task_id,
            timeline.attempt_count(),
            explorer.directory().event_type(timeline.subscription_id()),
            state,
            outcome_colored(timeline.final_outcome())
        );
        if shown.is_empty() {
            println!("  {}", format!("No attempts match the {} filter", view.filter).dimmed());
        }
        for record in shown {
            let error = record
                .error_details
                .as_deref()
                .map(|e| format!("  {}", e).red().to_string())
                .unwrap_or_default();
            println!(
                "  #{} {} {} {}{}",
                record.attempt_number,
                record.full_timestamp().dimmed(),
                outcome_colored(record.outcome),
                status_colored(record),
                error
            );
        }
    }
}

/// Timelines over the whole batch, each paired with the attempts that pass `filter`
///
/// Task state comes from every attempt; the filter only hides attempt lines.
fn timeline_rows(
    explorer: &LogExplorer,
    filter: OutcomeFilter,
) -> Vec<(TaskTimeline<'_>, Vec<&DeliveryAttemptRecord>)> {
    TaskTimeline::all(explorer.batch())
        .into_iter()
        .map(|timeline| {
            let shown = timeline
                .attempts()
                .iter()
                .copied()
                .filter(|record| filter.matches(record))
                .collect();
            (timeline, shown)
        })
        .collect()
}

fn print_detail(explorer: &LogExplorer, record: &DeliveryAttemptRecord) {
    println!();
    println!("{}", format!("Delivery Information (record {})", record.id).bold());
    println!("  {} {}", "Target URL:".bold(), record.target_url);
    println!(
        "  {} {} ({})",
        "Subscription ID:".bold(),
        record.subscription_id,
        explorer.directory().event_type(&record.subscription_id)
    );
    println!("  {} {}", "Task ID:".bold(), record.delivery_task_id);
    println!("  {} {}", "Timestamp:".bold(), record.full_timestamp());
    println!("  {} {}", "Attempt:".bold(), record.attempt_number);
    println!("  {} {}", "Outcome:".bold(), outcome_colored(record.outcome));
    println!("  {} {}", "HTTP Status:".bold(), status_colored(record));
    if let Some(details) = &record.error_details {
        println!("  {}", "Error Details:".red().bold());
        println!("  {}", details.red());
    }
}

fn print_json(view: &LogView<'_>) -> Result<()> {
    let output = json!({
        "total": view.total,
        "visible": view.visible(),
        "filter": view.filter.label(),
        "records": view.records(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn outcome_colored(outcome: Outcome) -> ColoredString {
    match outcome {
        Outcome::Success => outcome.as_str().green(),
        Outcome::FailedAttempt => outcome.as_str().yellow(),
        Outcome::Failure => outcome.as_str().red().bold(),
    }
}

/// Colour follows the HTTP code alone, not the outcome
fn status_colored(record: &DeliveryAttemptRecord) -> ColoredString {
    if record.is_http_success() {
        record.status_display().green()
    } else {
        record.status_display().red()
    }
}
