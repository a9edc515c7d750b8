// TaskBoard - persistent three-lane task board with derived views and CSV exchange

pub mod csv;
pub mod error;
pub mod models;
pub mod storage;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use error::StoreError;
pub use models::{Priority, SortKey, SortOrder, Status, Task, TaskDraft, TaskPatch, now_ms};
pub use storage::{StoreState, default_store_path};
pub use store::{ChangeEvent, TaskStore};
pub use view::LaneBoard;
