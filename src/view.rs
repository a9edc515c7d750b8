// Derived views: filtering, sorting and lane partitioning

use crate::models::{SortKey, SortOrder, Status, Task};
use std::cmp::Ordering;

/// The filtered/sorted sequence split into the three lanes, relative
/// order preserved within each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneBoard {
    pub current: Vec<Task>,
    pub pending: Vec<Task>,
    pub completed: Vec<Task>,
}

impl LaneBoard {
    pub fn lane(&self, status: Status) -> &[Task] {
        match status {
            Status::Current => &self.current,
            Status::Pending => &self.pending,
            Status::Completed => &self.completed,
        }
    }

    pub fn len(&self) -> usize {
        self.current.len() + self.pending.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pure projection of the record collection: filter by search term, then
/// sort by the selected key. Records with equal keys keep their input
/// order regardless of direction.
pub fn filter_and_sort(
    records: &[Task],
    search_term: &str,
    sort_by: SortKey,
    sort_order: SortOrder,
) -> Vec<Task> {
    let needle = search_term.trim().to_lowercase();

    let mut out: Vec<Task> = records
        .iter()
        .filter(|task| needle.is_empty() || matches_search(task, &needle))
        .cloned()
        .collect();

    // Vec::sort_by is stable, so ties preserve sequence order
    out.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    out
}

/// Group an already filtered/sorted sequence by lane.
pub fn partition(records: Vec<Task>) -> LaneBoard {
    let mut board = LaneBoard::default();
    for task in records {
        match task.status {
            Status::Current => board.current.push(task),
            Status::Pending => board.pending.push(task),
            Status::Completed => board.completed.push(task),
        }
    }
    board
}

fn matches_search(task: &Task, needle: &str) -> bool {
    if task.title.to_lowercase().contains(needle) {
        return true;
    }
    task.description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(needle))
}

fn compare(a: &Task, b: &Task, sort_by: SortKey) -> Ordering {
    match sort_by {
        // None sorts as the lowest value
        SortKey::DueDate => a.due_date.cmp(&b.due_date),
        SortKey::Priority => a.priority.cmp(&b.priority),
        SortKey::Title => a.title.cmp(&b.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn task(id: &str, title: &str, status: Status) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            status,
            priority: Priority::Medium,
            due_date: None,
            assigned_to: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_search_matches_title_case_insensitive() {
        let tasks = vec![
            task("t1", "Buy milk", Status::Current),
            task("t2", "Ship release", Status::Current),
        ];

        let view = filter_and_sort(&tasks, "MILK", SortKey::Title, SortOrder::Asc);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "t1");
    }

    #[test]
    fn test_search_matches_description() {
        let mut with_desc = task("t1", "errand", Status::Current);
        with_desc.description = Some("pick up the Groceries".to_string());
        let tasks = vec![with_desc, task("t2", "other", Status::Current)];

        let view = filter_and_sort(&tasks, "groceries", SortKey::Title, SortOrder::Asc);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "t1");
    }

    #[test]
    fn test_empty_search_passes_everything() {
        let tasks = vec![
            task("t1", "a", Status::Current),
            task("t2", "b", Status::Pending),
        ];

        let view = filter_and_sort(&tasks, "", SortKey::Title, SortOrder::Asc);
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_sort_by_due_date_ascending() {
        let mut t1 = task("t1", "later", Status::Current);
        t1.due_date = Some(1_704_153_600_000); // 2024-01-02
        let mut t2 = task("t2", "sooner", Status::Current);
        t2.due_date = Some(1_704_067_200_000); // 2024-01-01

        let view = filter_and_sort(&[t1, t2], "", SortKey::DueDate, SortOrder::Asc);
        assert_eq!(view[0].id, "t2");
        assert_eq!(view[1].id, "t1");
    }

    #[test]
    fn test_missing_due_date_sorts_lowest() {
        let mut dated = task("dated", "dated", Status::Current);
        dated.due_date = Some(1_704_067_200_000);
        let undated = task("undated", "undated", Status::Current);

        let asc = filter_and_sort(
            &[dated.clone(), undated.clone()],
            "",
            SortKey::DueDate,
            SortOrder::Asc,
        );
        assert_eq!(asc[0].id, "undated");

        let desc = filter_and_sort(&[dated, undated], "", SortKey::DueDate, SortOrder::Desc);
        assert_eq!(desc[0].id, "dated");
    }

    #[test]
    fn test_sort_by_priority_enum_order() {
        let mut high = task("high", "h", Status::Current);
        high.priority = Priority::High;
        let mut low = task("low", "l", Status::Current);
        low.priority = Priority::Low;
        let mut medium = task("medium", "m", Status::Current);
        medium.priority = Priority::Medium;

        let view = filter_and_sort(&[high, low, medium], "", SortKey::Priority, SortOrder::Asc);
        let ids: Vec<&str> = view.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["low", "medium", "high"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        // All four share the same priority; input order must survive
        // in both directions.
        let tasks: Vec<Task> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| task(id, "same", Status::Current))
            .collect();

        let asc = filter_and_sort(&tasks, "", SortKey::Priority, SortOrder::Asc);
        let asc_ids: Vec<&str> = asc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(asc_ids, vec!["a", "b", "c", "d"]);

        let desc = filter_and_sort(&tasks, "", SortKey::Priority, SortOrder::Desc);
        let desc_ids: Vec<&str> = desc.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(desc_ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_descending_reverses_title_order() {
        let tasks = vec![
            task("t1", "apple", Status::Current),
            task("t2", "banana", Status::Current),
        ];

        let view = filter_and_sort(&tasks, "", SortKey::Title, SortOrder::Desc);
        assert_eq!(view[0].id, "t2");
    }

    #[test]
    fn test_partition_groups_by_lane_preserving_order() {
        let tasks = vec![
            task("c1", "one", Status::Current),
            task("p1", "two", Status::Pending),
            task("c2", "three", Status::Current),
            task("d1", "four", Status::Completed),
        ];

        let board = partition(tasks);
        assert_eq!(board.len(), 4);
        let current_ids: Vec<&str> = board.current.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(current_ids, vec!["c1", "c2"]);
        assert_eq!(board.pending.len(), 1);
        assert_eq!(board.completed.len(), 1);
        assert_eq!(board.lane(Status::Pending)[0].id, "p1");
    }
}
