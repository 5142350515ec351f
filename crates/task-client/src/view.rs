use chrono::{Local, NaiveDate};
use db::models::task_item::TaskItem;
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Which slice of the task list is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
    Overdue,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 4] = [
        TaskFilter::All,
        TaskFilter::Active,
        TaskFilter::Completed,
        TaskFilter::Overdue,
    ];

    pub fn matches(self, task: &TaskItem, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.is_completed,
            TaskFilter::Completed => task.is_completed,
            TaskFilter::Overdue => task.is_overdue(today),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskFilter::All => "All Tasks",
            TaskFilter::Active => "Active",
            TaskFilter::Completed => "Completed",
            TaskFilter::Overdue => "Overdue",
        }
    }

    /// The statistic that counts the same tasks this filter shows.
    pub fn count(self, stats: &TaskStats) -> usize {
        match self {
            TaskFilter::All => stats.total,
            TaskFilter::Active => stats.active,
            TaskFilter::Completed => stats.completed,
            TaskFilter::Overdue => stats.overdue,
        }
    }
}

/// Keeps the relative order of `tasks`.
pub fn filter_tasks(tasks: &[TaskItem], filter: TaskFilter, today: NaiveDate) -> Vec<&TaskItem> {
    tasks
        .iter()
        .filter(|task| filter.matches(task, today))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn compute(tasks: &[TaskItem], today: NaiveDate) -> Self {
        tasks.iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            if task.is_completed {
                stats.completed += 1;
            } else {
                stats.active += 1;
            }
            if task.is_overdue(today) {
                stats.overdue += 1;
            }
            stats
        })
    }
}

/// Overdue checks compare against the local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, Utc};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn task(id: i64, is_completed: bool, due_in_days: Option<i64>) -> TaskItem {
        TaskItem {
            id,
            title: format!("task {id}"),
            description: None,
            due_date: due_in_days.map(|days| today() + Duration::days(days)),
            priority: 1,
            is_completed,
            created_date: Utc::now(),
        }
    }

    fn sample() -> Vec<TaskItem> {
        vec![
            task(1, false, None),
            task(2, true, Some(-2)),
            task(3, false, Some(-1)),
            task(4, false, Some(0)),
            task(5, true, None),
            task(6, false, Some(5)),
        ]
    }

    fn ids(tasks: Vec<&TaskItem>) -> Vec<i64> {
        tasks.into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn filters_select_expected_tasks_in_order() {
        let tasks = sample();

        assert_eq!(ids(filter_tasks(&tasks, TaskFilter::All, today())), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(ids(filter_tasks(&tasks, TaskFilter::Active, today())), vec![1, 3, 4, 6]);
        assert_eq!(ids(filter_tasks(&tasks, TaskFilter::Completed, today())), vec![2, 5]);
        assert_eq!(ids(filter_tasks(&tasks, TaskFilter::Overdue, today())), vec![3]);
    }

    #[test]
    fn task_due_today_is_not_overdue() {
        let tasks = vec![task(1, false, Some(0))];

        assert!(filter_tasks(&tasks, TaskFilter::Overdue, today()).is_empty());
        assert_eq!(TaskStats::compute(&tasks, today()).overdue, 0);
    }

    #[test]
    fn stats_partition_total_and_match_filters() {
        let tasks = sample();
        let stats = TaskStats::compute(&tasks, today());

        assert_eq!(
            stats,
            TaskStats {
                total: 6,
                active: 4,
                completed: 2,
                overdue: 1,
            }
        );
        assert_eq!(stats.active + stats.completed, stats.total);
        assert!(stats.overdue <= stats.active);

        for filter in TaskFilter::ALL {
            assert_eq!(
                filter_tasks(&tasks, filter, today()).len(),
                filter.count(&stats),
                "filter {filter} disagrees with stats"
            );
        }
    }

    #[test]
    fn empty_list_has_zero_stats() {
        assert_eq!(TaskStats::compute(&[], today()), TaskStats::default());
        assert!(filter_tasks(&[], TaskFilter::All, today()).is_empty());
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!(TaskFilter::from_str("Overdue").unwrap(), TaskFilter::Overdue);
        assert_eq!(TaskFilter::from_str("active").unwrap(), TaskFilter::Active);
        assert!(TaskFilter::from_str("someday").is_err());
        assert_eq!(TaskFilter::Completed.to_string(), "completed");
        assert_eq!(TaskFilter::default(), TaskFilter::All);
        assert_eq!(TaskFilter::All.label(), "All Tasks");
    }
}
