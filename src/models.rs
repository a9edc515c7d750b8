// Data models for the task board

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single task record.
///
/// Sequence position inside the store is meaningful: it encodes the manual
/// drag-reorder position within a lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    /// Due date in milliseconds since the Unix epoch.
    #[serde(default)]
    pub due_date: Option<i64>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Lane a task lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Current,
    Pending,
    Completed,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Current, Status::Pending, Status::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Current => "current",
            Status::Pending => "pending",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(Status::Current),
            "pending" => Ok(Status::Pending),
            "completed" | "complete" | "done" => Ok(Status::Completed),
            other => Err(StoreError::Validation(format!(
                "invalid status: {other} (expected current, pending or completed)"
            ))),
        }
    }
}

/// Task priority, ordered low < medium < high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(StoreError::Validation(format!(
                "invalid priority: {other} (expected low, medium or high)"
            ))),
        }
    }
}

/// Sort key for the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    Title,
}

impl FromStr for SortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "duedate" | "due_date" | "due" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            "title" => Ok(SortKey::Title),
            other => Err(StoreError::Validation(format!(
                "invalid sort key: {other} (expected dueDate, priority or title)"
            ))),
        }
    }
}

/// Sort direction for the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(StoreError::Validation(format!(
                "invalid sort order: {other} (expected asc or desc)"
            ))),
        }
    }
}

/// Input for creating a new task. The store assigns the id and timestamps.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    pub due_date: Option<i64>,
    pub assigned_to: Option<String>,
}

/// Partial update for an existing task. `Some` overwrites the field,
/// `None` leaves it untouched. The id and sequence position never change.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub due_date: Option<i64>,
    pub assigned_to: Option<String>,
}

/// Current timestamp in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before Unix epoch")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        assert!(ts > 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&Status::Current).unwrap();
        assert_eq!(json, "\"current\"");

        let json = serde_json::to_string(&Status::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn test_sort_key_serialization() {
        let json = serde_json::to_string(&SortKey::DueDate).unwrap();
        assert_eq!(json, "\"dueDate\"");

        let parsed: SortKey = serde_json::from_str("\"priority\"").unwrap();
        assert_eq!(parsed, SortKey::Priority);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);

        // Missing priority field falls back to medium on decode
        let json = r#"{
            "id": "t1",
            "title": "demo",
            "status": "current"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert_eq!(task.assigned_to, None);
    }

    #[test]
    fn test_task_serialization_round_trip() {
        let task = Task {
            id: "task-1".to_string(),
            title: "Write report".to_string(),
            description: Some("quarterly numbers".to_string()),
            status: Status::Pending,
            priority: Priority::High,
            due_date: Some(1_700_000_000_000),
            assigned_to: Some("sam".to_string()),
            created_at: 1000,
            updated_at: 2000,
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\":1700000000000"));
        assert!(json.contains("\"assignedTo\":\"sam\""));

        let decoded: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn test_from_str_parsing() {
        assert_eq!("pending".parse::<Status>().unwrap(), Status::Pending);
        assert_eq!("DONE".parse::<Status>().unwrap(), Status::Completed);
        assert!("blocked".parse::<Status>().is_err());

        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());

        assert_eq!("dueDate".parse::<SortKey>().unwrap(), SortKey::DueDate);
        assert_eq!("title".parse::<SortKey>().unwrap(), SortKey::Title);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
    }
}
