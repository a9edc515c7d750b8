// Task store: owns the record collection and the persistence round-trip

use crate::csv;
use crate::error::StoreError;
use crate::models::{SortKey, SortOrder, Status, Task, TaskDraft, TaskPatch, now_ms};
use crate::storage::{self, StoreState};
use crate::view::{self, LaneBoard};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Emitted to subscribers after every successful mutation, once the new
/// state has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Created { id: String },
    Updated { id: String },
    Removed { id: String },
    StatusChanged { id: String, status: Status },
    Reordered { id: String },
    Replaced { count: usize },
    ViewChanged,
}

type Listener = Box<dyn Fn(&ChangeEvent)>;

/// The single writer of record state.
///
/// Every mutation validates first, applies in memory, writes the full
/// state through to disk, then notifies subscribers. A failed write rolls
/// the in-memory state back, so callers never observe a half-applied
/// mutation.
pub struct TaskStore {
    path: PathBuf,
    state: StoreState,
    listeners: Vec<Listener>,
}

impl TaskStore {
    /// Open the store backed by the file at `path`, loading any persisted
    /// state. A missing or corrupt file degrades to an empty board.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = storage::load(&path);
        debug!(file = ?path, records = state.records.len(), "Opened task store");
        Self {
            path,
            state,
            listeners: Vec::new(),
        }
    }

    /// Register a read-only observer of store changes.
    pub fn subscribe(&mut self, listener: impl Fn(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Validate and append a new task. Rejects an empty or whitespace-only
    /// title without touching the store.
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, StoreError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("title is required".to_string()));
        }

        let now = now_ms();
        let task = Task {
            id: Uuid::now_v7().to_string(),
            title: title.to_string(),
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            assigned_to: draft.assigned_to,
            created_at: now,
            updated_at: now,
        };

        let snapshot = self.state.clone();
        self.state.records.push(task.clone());
        self.commit(ChangeEvent::Created { id: task.id.clone() }, snapshot)?;

        debug!(id = %task.id, title = %task.title, "Created task");
        Ok(task)
    }

    /// Merge `patch` into the task with `id`, preserving its id and
    /// sequence position.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        if let Some(title) = patch.title.as_deref()
            && title.trim().is_empty()
        {
            return Err(StoreError::Validation("title is required".to_string()));
        }

        let index = self
            .position(id)
            .ok_or_else(|| StoreError::not_found(id))?;

        let snapshot = self.state.clone();
        let task = &mut self.state.records[index];
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(assigned_to) = patch.assigned_to {
            task.assigned_to = Some(assigned_to);
        }
        task.updated_at = now_ms();

        let updated = task.clone();
        self.commit(ChangeEvent::Updated { id: id.to_string() }, snapshot)?;

        debug!(id = %id, "Updated task");
        Ok(updated)
    }

    /// Delete the task with `id`. Absence is a benign no-op, not an
    /// error; returns whether a record was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            debug!(id = %id, "Remove of absent task, ignoring");
            return Ok(false);
        };

        let snapshot = self.state.clone();
        self.state.records.remove(index);
        self.commit(ChangeEvent::Removed { id: id.to_string() }, snapshot)?;

        debug!(id = %id, "Removed task");
        Ok(true)
    }

    /// Move the task to another lane. The record is relocated to the tail
    /// of the sequence, which places it last in its new lane's relative
    /// order.
    pub fn change_status(&mut self, id: &str, new_status: Status) -> Result<Task, StoreError> {
        let index = self
            .position(id)
            .ok_or_else(|| StoreError::not_found(id))?;

        let snapshot = self.state.clone();
        let mut task = self.state.records.remove(index);
        task.status = new_status;
        task.updated_at = now_ms();
        self.state.records.push(task.clone());

        self.commit(
            ChangeEvent::StatusChanged {
                id: id.to_string(),
                status: new_status,
            },
            snapshot,
        )?;

        debug!(id = %id, status = %new_status, "Changed task status");
        Ok(task)
    }

    /// Reinsert the task at `target_index` in the sequence, clamped to the
    /// valid range. A `None` target means the drag was cancelled and is a
    /// no-op.
    pub fn reorder(&mut self, id: &str, target_index: Option<usize>) -> Result<(), StoreError> {
        let Some(target) = target_index else {
            debug!(id = %id, "Reorder cancelled, ignoring");
            return Ok(());
        };

        let index = self
            .position(id)
            .ok_or_else(|| StoreError::not_found(id))?;

        let snapshot = self.state.clone();
        let task = self.state.records.remove(index);
        let target = target.min(self.state.records.len());
        self.state.records.insert(target, task);

        self.commit(ChangeEvent::Reordered { id: id.to_string() }, snapshot)?;

        debug!(id = %id, target, "Reordered task");
        Ok(())
    }

    /// Wholesale replace the collection. Incoming records without an id
    /// get a fresh one; records whose title trims empty are dropped.
    /// Returns the number of records accepted.
    pub fn replace_all(&mut self, records: Vec<Task>) -> Result<usize, StoreError> {
        let now = now_ms();
        let accepted: Vec<Task> = records
            .into_iter()
            .filter(|task| !task.title.trim().is_empty())
            .map(|mut task| {
                if task.id.trim().is_empty() {
                    task.id = Uuid::now_v7().to_string();
                }
                if task.created_at == 0 {
                    task.created_at = now;
                }
                if task.updated_at == 0 {
                    task.updated_at = now;
                }
                task
            })
            .collect();

        let count = accepted.len();
        let snapshot = self.state.clone();
        self.state.records = accepted;
        self.commit(ChangeEvent::Replaced { count }, snapshot)?;

        info!(count, "Replaced task collection");
        Ok(count)
    }

    /// Parse a CSV blob and swap the store contents for its rows. The
    /// store is untouched when no valid row exists.
    pub fn import_csv(&mut self, text: &str) -> Result<usize, StoreError> {
        let tasks = csv::import(text)?;
        self.replace_all(tasks)
    }

    /// Render the whole collection as a CSV blob, in store order.
    pub fn export_csv(&self) -> String {
        csv::export(&self.state.records)
    }

    // ========================================================================
    // View controls (persisted alongside the records)
    // ========================================================================

    pub fn set_search_term(&mut self, term: impl Into<String>) -> Result<(), StoreError> {
        let snapshot = self.state.clone();
        self.state.search_term = term.into();
        self.commit(ChangeEvent::ViewChanged, snapshot)
    }

    pub fn set_sort(&mut self, sort_by: SortKey, sort_order: SortOrder) -> Result<(), StoreError> {
        let snapshot = self.state.clone();
        self.state.sort_by = sort_by;
        self.state.sort_order = sort_order;
        self.commit(ChangeEvent::ViewChanged, snapshot)
    }

    // ========================================================================
    // Read-only projections
    // ========================================================================

    /// Canonical sequence, in manual order.
    pub fn records(&self) -> &[Task] {
        &self.state.records
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.state.records.iter().find(|task| task.id == id)
    }

    /// Filtered and sorted per the stored view controls.
    pub fn view(&self) -> Vec<Task> {
        view::filter_and_sort(
            &self.state.records,
            &self.state.search_term,
            self.state.sort_by,
            self.state.sort_order,
        )
    }

    /// The view partitioned into the three lanes.
    pub fn lanes(&self) -> LaneBoard {
        view::partition(self.view())
    }

    pub fn search_term(&self) -> &str {
        &self.state.search_term
    }

    pub fn sort_by(&self) -> SortKey {
        self.state.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.state.sort_order
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn position(&self, id: &str) -> Option<usize> {
        self.state.records.iter().position(|task| task.id == id)
    }

    /// Write-through step shared by every mutation: persist the new state,
    /// rolling back to `snapshot` on failure, then notify subscribers.
    fn commit(&mut self, event: ChangeEvent, snapshot: StoreState) -> Result<(), StoreError> {
        if let Err(e) = storage::save(&self.path, &self.state) {
            self.state = snapshot;
            return Err(e);
        }
        for listener in &self.listeners {
            listener(&event);
        }
        Ok(())
    }
}
