// CSV exchange format for task records

use crate::error::StoreError;
use crate::models::{Task, now_ms};
use chrono::{DateTime, Utc};

pub const HEADER: &str = "Title,Description,DueDate,Priority,Status,AssignedTo";

/// Render all records as a CSV blob with a header row, in store order.
/// Absent optional fields become empty strings.
pub fn export(records: &[Task]) -> String {
    let mut csv = String::new();
    csv.push_str(HEADER);
    csv.push('\n');

    for task in records {
        let due_date = task.due_date.map(format_due_date).unwrap_or_default();
        let row = format!(
            "{},{},{},{},{},{}\n",
            escape_csv(&task.title),
            escape_csv(task.description.as_deref().unwrap_or("")),
            due_date,
            task.priority,
            task.status,
            escape_csv(task.assigned_to.as_deref().unwrap_or("")),
        );
        csv.push_str(&row);
    }

    csv
}

/// Parse a CSV blob into task records.
///
/// Columns are matched by header name, so column order does not matter.
/// Rows with an empty `Title` are dropped silently. Ids are left blank;
/// the store assigns fresh ones on `replace_all`. Signals
/// `StoreError::Import` when no valid row remains.
pub fn import(text: &str) -> Result<Vec<Task>, StoreError> {
    let mut rows = parse_rows(text).into_iter();

    let header = rows
        .next()
        .ok_or_else(|| StoreError::Import("empty file".to_string()))?;
    let columns = Columns::from_header(&header)?;

    let now = now_ms();
    let mut tasks = Vec::new();
    for row in rows {
        let title = columns.field(&row, columns.title).trim().to_string();
        if title.is_empty() {
            continue;
        }

        tasks.push(Task {
            id: String::new(),
            title,
            description: non_empty(columns.field(&row, columns.description)),
            status: columns
                .field(&row, columns.status)
                .parse()
                .unwrap_or_default(),
            priority: columns
                .field(&row, columns.priority)
                .parse()
                .unwrap_or_default(),
            due_date: parse_due_date(columns.field(&row, columns.due_date)),
            assigned_to: non_empty(columns.field(&row, columns.assigned_to)),
            created_at: now,
            updated_at: now,
        });
    }

    if tasks.is_empty() {
        return Err(StoreError::Import(
            "no rows with a non-empty Title".to_string(),
        ));
    }

    Ok(tasks)
}

/// RFC 3339 rendering of a due date, millisecond precision.
pub fn format_due_date(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        None => String::new(),
    }
}

/// Parse a due date. Accepts RFC 3339 and the offset-less
/// `YYYY-MM-DDTHH:MM[:SS]` form (assumed UTC); anything else is absent.
pub fn parse_due_date(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }

    // datetime-local form without an offset, assumed UTC
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    None
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Header-name to column-index mapping.
struct Columns {
    title: usize,
    description: Option<usize>,
    due_date: Option<usize>,
    priority: Option<usize>,
    status: Option<usize>,
    assigned_to: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, StoreError> {
        let index_of = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let title = index_of("Title")
            .ok_or_else(|| StoreError::Import("missing Title column".to_string()))?;

        Ok(Columns {
            title,
            description: index_of("Description"),
            due_date: index_of("DueDate"),
            priority: index_of("Priority"),
            status: index_of("Status"),
            assigned_to: index_of("AssignedTo"),
        })
    }

    fn field<'a>(&self, row: &'a [String], index: impl Into<Option<usize>>) -> &'a str {
        index
            .into()
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Split a CSV blob into rows of fields. Double-quoted fields may contain
/// the delimiter, escaped quotes (`""`) and newlines.
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    // Drop blank lines
    rows.retain(|r| !(r.len() == 1 && r[0].trim().is_empty()));
    rows
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
