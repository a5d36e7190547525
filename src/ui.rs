//! Terminal UI for the delivery log browser
//!
//! Application state plus ratatui rendering. Fetching is driven by the
//! `browse` command: key handling returns an [`AppAction`] and completed
//! fetches come back through [`LogsApp::apply`].

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::error::ConsoleError;
use crate::logs::{FetchOutcome, LogExplorer, LogQuery, LogRow, SearchMode};
use crate::models::{DeliveryAttemptRecord, Outcome};

const KEY_HELP: &str = "q quit | t window | / edit search | m mode | Enter search | \
                        f filter | Space details | r refresh | c clear";

/// Time-window presets offered by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPreset {
    Recent,
    Hours24,
    Hours48,
    Hours72,
}

impl WindowPreset {
    pub fn from_hours(hours: Option<u32>) -> Self {
        match hours {
            Some(24) => Self::Hours24,
            Some(48) => Self::Hours48,
            Some(72) => Self::Hours72,
            _ => Self::Recent,
        }
    }

    pub fn hours(&self) -> Option<u32> {
        match self {
            Self::Recent => None,
            Self::Hours24 => Some(24),
            Self::Hours48 => Some(48),
            Self::Hours72 => Some(72),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Recent => Self::Hours24,
            Self::Hours24 => Self::Hours48,
            Self::Hours48 => Self::Hours72,
            Self::Hours72 => Self::Recent,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Recent => "Recent",
            Self::Hours24 => "Past 24 Hours",
            Self::Hours48 => "Past 48 Hours",
            Self::Hours72 => "Past 72 Hours",
        }
    }
}

/// Single user-visible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// What the event loop should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    None,
    Quit,
    Fetch(LogQuery),
}

/// Application state for the log browser
pub struct LogsApp {
    pub explorer: LogExplorer,
    pub window: WindowPreset,
    pub selected: usize,
    /// Keystrokes go to the search box while set
    pub editing: bool,
    pub notice: Option<Notice>,
    pub last_update: Option<DateTime<Utc>>,
}

impl LogsApp {
    pub fn new(explorer: LogExplorer, window: WindowPreset) -> Self {
        Self {
            explorer,
            window,
            selected: 0,
            editing: false,
            notice: None,
            last_update: None,
        }
    }

    /// Query that loads the current window
    pub fn window_query(&self) -> LogQuery {
        LogQuery::Recent {
            hours: self.window.hours(),
        }
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if self.editing {
            return self.handle_edit_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return AppAction::Quit,
            KeyCode::Char('/') => self.editing = true,
            KeyCode::Char('t') => {
                self.window = self.window.next();
                return AppAction::Fetch(self.window_query());
            }
            KeyCode::Char('m') => self.explorer.toggle_search_mode(),
            KeyCode::Char('f') => {
                self.explorer.cycle_filter();
                self.clamp_selection();
            }
            KeyCode::Char('c') => {
                self.explorer.clear();
                self.selected = 0;
                self.notice = None;
            }
            KeyCode::Char('r') => {
                let query = self
                    .explorer
                    .last_query()
                    .cloned()
                    .unwrap_or_else(|| self.window_query());
                return AppAction::Fetch(query);
            }
            KeyCode::Enter => return AppAction::Fetch(self.explorer.search_query()),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                self.selected += 1;
                self.clamp_selection();
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_record().map(|r| r.id) {
                    self.explorer.toggle_expanded(id);
                }
            }
            _ => {}
        }
        AppAction::None
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Esc => self.editing = false,
            KeyCode::Enter => {
                self.editing = false;
                return AppAction::Fetch(self.explorer.search_query());
            }
            KeyCode::Backspace => self.explorer.pop_search_char(),
            KeyCode::Char(c) => self.explorer.push_search_char(c),
            _ => {}
        }
        AppAction::None
    }

    /// Report a query that failed validation before any request went out
    pub fn reject(&mut self, err: ConsoleError) {
        self.notice = Some(Notice::Error(err.to_string()));
    }

    /// Surface the result of a completed fetch
    pub fn apply(&mut self, query: &LogQuery, result: Result<FetchOutcome, ConsoleError>) {
        match result {
            Ok(FetchOutcome::Stale) => {}
            Ok(FetchOutcome::Empty) => {
                self.notice = Some(Notice::Info(format!("No {} found", query.describe())));
                self.selected = 0;
                self.last_update = Some(Utc::now());
            }
            Ok(FetchOutcome::Loaded(n)) => {
                self.notice = Some(Notice::Info(format!("Found {} log(s)", n)));
                self.selected = 0;
                self.last_update = Some(Utc::now());
            }
            Err(e) => {
                self.notice = Some(Notice::Error(format!("Failed to load logs: {}", e)));
            }
        }
    }

    fn selected_record(&self) -> Option<&DeliveryAttemptRecord> {
        self.explorer
            .view()
            .rows
            .get(self.selected)
            .map(|row| row.record)
    }

    fn clamp_selection(&mut self) {
        let visible = self.explorer.view().visible();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    /// Render the UI
    pub fn render(&self, f: &mut Frame) {
        let view = self.explorer.view();
        let detail = view.rows.iter().find(|row| row.expanded);

        let mut constraints = vec![
            Constraint::Length(4), // Header
            Constraint::Length(3), // Search box
            Constraint::Min(6),    // Table
        ];
        if detail.is_some() {
            constraints.push(Constraint::Length(9));
        }
        constraints.push(Constraint::Length(3)); // Footer

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_search(f, chunks[1]);
        self.render_table(f, chunks[2], &view.rows, view.is_filtered_out());
        let footer = if let Some(row) = detail {
            self.render_detail(f, chunks[3], row.record);
            chunks[4]
        } else {
            chunks[3]
        };
        self.render_footer(f, footer, &view.summary());
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let last_update = self
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "Never".to_string());

        let mut status = vec![
            Span::styled(
                "Delivery Logs",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" - Window: "),
            Span::styled(self.window.label(), Style::default().fg(Color::Yellow)),
            Span::raw("  |  Filter: "),
            Span::styled(self.explorer.filter().label(), Style::default().fg(Color::Yellow)),
            Span::raw("  |  Last update: "),
            Span::styled(last_update, Style::default().fg(Color::Green)),
        ];
        if self.explorer.is_loading() {
            status.push(Span::styled("  loading…", Style::default().fg(Color::Magenta)));
        }

        let lines = vec![
            Line::from(status),
            Line::from(Span::styled(KEY_HELP, Style::default().fg(Color::DarkGray))),
        ];

        let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_search(&self, f: &mut Frame, area: Rect) {
        let mode = self.explorer.search_mode();
        let hint = match mode {
            SearchMode::Subscription => "Select a subscription...",
            SearchMode::Task => "Select a task ID...",
        };

        let id = self.explorer.search_id();
        let content = if id.is_empty() && !self.editing {
            Span::styled(hint, Style::default().fg(Color::DarkGray))
        } else if self.editing {
            Span::styled(format!("{}_", id), Style::default().fg(Color::White))
        } else {
            Span::raw(id.to_string())
        };

        let border_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let paragraph = Paragraph::new(Line::from(content)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!("Search By: {}", mode.label())),
        );
        f.render_widget(paragraph, area);
    }

    fn render_table(&self, f: &mut Frame, area: Rect, rows: &[LogRow<'_>], filtered_out: bool) {
        let header_cells = ["Task ID", "Timestamp", "Attempt", "Status", "HTTP Code", ""]
            .iter()
            .map(|h| {
                Cell::from(*h).style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            });
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let body: Vec<Row> = if rows.is_empty() {
            let message = if filtered_out {
                "No logs match the selected filter"
            } else {
                "No logs loaded. Press 't' to load a window or '/' to search."
            };
            vec![Row::new(vec![Cell::from(message)])]
        } else {
            rows.iter()
                .map(|row| {
                    let record = row.record;
                    Row::new(vec![
                        Cell::from(format!("{}...", record.short_task_id())),
                        Cell::from(record.short_timestamp()),
                        Cell::from(record.attempt_number.to_string()),
                        Cell::from(record.outcome.as_str()).style(outcome_style(record.outcome)),
                        Cell::from(record.status_display()).style(status_style(row.http_success)),
                        Cell::from(if row.expanded { "▲ Hide" } else { "▼ View" }),
                    ])
                })
                .collect()
        };

        let table = Table::new(
            body,
            [
                Constraint::Percentage(18),
                Constraint::Percentage(22),
                Constraint::Percentage(10),
                Constraint::Percentage(20),
                Constraint::Percentage(12),
                Constraint::Percentage(18),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Attempts"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(1);

        let mut state = TableState::default();
        if !rows.is_empty() {
            state.select(Some(self.selected.min(rows.len() - 1)));
        }
        f.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(&self, f: &mut Frame, area: Rect, record: &DeliveryAttemptRecord) {
        let label = Style::default().fg(Color::DarkGray);
        let event_type = self.explorer.directory().event_type(&record.subscription_id);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Target URL:      ", label),
                Span::raw(record.target_url.clone()),
            ]),
            Line::from(vec![
                Span::styled("Subscription ID: ", label),
                Span::raw(record.subscription_id.clone()),
                Span::styled(format!("  ({})", event_type), label),
            ]),
            Line::from(vec![
                Span::styled("Task ID:         ", label),
                Span::raw(record.delivery_task_id.clone()),
            ]),
            Line::from(vec![
                Span::styled("Timestamp:       ", label),
                Span::raw(record.full_timestamp()),
            ]),
        ];
        if let Some(details) = &record.error_details {
            lines.push(Line::from(Span::styled(
                "Error Details:",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(details.clone(), Style::default().fg(Color::Red))));
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Delivery Information"));
        f.render_widget(paragraph, area);
    }

    fn render_footer(&self, f: &mut Frame, area: Rect, summary: &str) {
        let notice = match &self.notice {
            Some(Notice::Error(msg)) => Span::styled(msg.clone(), Style::default().fg(Color::Red)),
            Some(Notice::Info(msg)) => Span::styled(msg.clone(), Style::default().fg(Color::Green)),
            None => Span::raw(""),
        };

        let line = Line::from(vec![
            Span::styled(summary.to_string(), Style::default().fg(Color::Cyan)),
            Span::raw("  |  "),
            notice,
        ]);

        let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}

fn outcome_style(outcome: Outcome) -> Style {
    match outcome {
        Outcome::Success => Style::default().fg(Color::Green),
        Outcome::FailedAttempt => Style::default().fg(Color::Yellow),
        Outcome::Failure => Style::default().fg(Color::Red),
    }
}

/// Status colouring follows the HTTP code alone, not the outcome
fn status_style(http_success: bool) -> Style {
    if http_success {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn record(id: i64, outcome: Outcome) -> DeliveryAttemptRecord {
        DeliveryAttemptRecord {
            id,
            delivery_task_id: format!("task-{}", id),
            subscription_id: "sub-1".to_string(),
            target_url: "https://example.com".to_string(),
            timestamp: "2024-05-01T10:00:00".to_string(),
            attempt_number: 1,
            outcome,
            http_status_code: Some(200),
            error_details: None,
        }
    }

    fn app_with(records: Vec<DeliveryAttemptRecord>) -> LogsApp {
        let mut explorer = LogExplorer::new();
        let pending = explorer.begin(LogQuery::Recent { hours: None }).unwrap();
        explorer.complete(pending, Ok(records)).unwrap();
        LogsApp::new(explorer, WindowPreset::Recent)
    }

    #[test]
    fn test_window_preset_cycle() {
        let mut preset = WindowPreset::Recent;
        let mut seen = vec![];
        for _ in 0..4 {
            seen.push(preset.hours());
            preset = preset.next();
        }
        assert_eq!(seen, vec![None, Some(24), Some(48), Some(72)]);
        assert_eq!(preset, WindowPreset::Recent);
        assert_eq!(WindowPreset::from_hours(Some(48)), WindowPreset::Hours48);
        assert_eq!(WindowPreset::from_hours(Some(6)), WindowPreset::Recent);
    }

    #[test]
    fn test_window_key_issues_fetch() {
        let mut app = app_with(vec![]);
        let action = app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(action, AppAction::Fetch(LogQuery::Recent { hours: Some(24) }));
    }

    #[test]
    fn test_editing_search_then_enter() {
        let mut app = app_with(vec![]);
        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.explorer.search_mode(), SearchMode::Task);

        app.handle_key(key(KeyCode::Char('/')));
        for c in "T1".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        // 'q' while editing is text, not quit
        app.handle_key(key(KeyCode::Char('q')));
        app.handle_key(key(KeyCode::Backspace));

        let action = app.handle_key(key(KeyCode::Enter));
        assert_eq!(action, AppAction::Fetch(LogQuery::Task("T1".into())));
        assert!(!app.editing);
    }

    #[test]
    fn test_space_toggles_selected_detail() {
        let mut app = app_with(vec![record(1, Outcome::Success), record(2, Outcome::Failure)]);
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.explorer.expanded(), Some(1));

        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.explorer.expanded(), Some(2));
    }

    #[test]
    fn test_filter_key_clamps_selection() {
        let mut app = app_with(vec![record(1, Outcome::Success), record(2, Outcome::Failure)]);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 1);

        // all -> SUCCESS leaves one row
        app.handle_key(key(KeyCode::Char('f')));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_apply_sets_notice() {
        let mut app = app_with(vec![]);
        let query = LogQuery::Task("T9".into());

        app.apply(&query, Ok(FetchOutcome::Empty));
        assert_eq!(app.notice, Some(Notice::Info("No logs for task T9 found".into())));

        app.apply(&query, Err(ConsoleError::Transport("timed out".into())));
        assert!(matches!(app.notice, Some(Notice::Error(_))));

        let before = app.notice.clone();
        app.apply(&query, Ok(FetchOutcome::Stale));
        assert_eq!(app.notice, before);
    }
}
