use chrono::NaiveDate;
use db::{
    models::task_item::{CreateTaskItem, TaskItem, UpdateTaskItem},
    types::DEFAULT_PRIORITY,
};
use thiserror::Error;

use crate::{
    api::{ClientError, TaskApi},
    view::{TaskFilter, TaskStats, filter_tasks},
};

pub const LOAD_ERROR: &str = "Error loading tasks. Please check if the backend is running.";
pub const SAVE_ERROR: &str = "Error saving task. Please try again.";
pub const DELETE_ERROR: &str = "Error deleting task. Please try again.";
pub const UPDATE_ERROR: &str = "Error updating task. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please enter a task title")]
    MissingTitle,
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("Task {0} is not on the board")]
    UnknownTask(i64),
    #[error("{message}")]
    Api {
        message: &'static str,
        #[source]
        source: ClientError,
    },
}

/// Form state for creating or editing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: i32,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            priority: DEFAULT_PRIORITY,
        }
    }
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn from_task(task: &TaskItem) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task.due_date,
            priority: task.priority,
        }
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        Ok(())
    }

    fn description(&self) -> Option<String> {
        Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    fn to_create(&self) -> CreateTaskItem {
        CreateTaskItem {
            title: self.title.trim().to_string(),
            description: self.description(),
            due_date: self.due_date,
            priority: self.priority,
            is_completed: false,
        }
    }

    fn to_update(&self, is_completed: bool) -> UpdateTaskItem {
        UpdateTaskItem {
            title: self.title.trim().to_string(),
            description: self.description(),
            due_date: self.due_date,
            priority: self.priority,
            is_completed,
        }
    }
}

/// Client-side task list with its filter, the task under edit and the error
/// banner. Every successful mutation is followed by a full reload.
pub struct TaskBoard<A: TaskApi> {
    api: A,
    tasks: Vec<TaskItem>,
    filter: TaskFilter,
    editing: Option<TaskItem>,
    error: Option<&'static str>,
}

impl<A: TaskApi> TaskBoard<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            filter: TaskFilter::default(),
            editing: None,
            error: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tasks(&self) -> &[TaskItem] {
        &self.tasks
    }

    pub fn task(&self, id: i64) -> Option<&TaskItem> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn editing(&self) -> Option<&TaskItem> {
        self.editing.as_ref()
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn visible_tasks(&self, today: NaiveDate) -> Vec<&TaskItem> {
        filter_tasks(&self.tasks, self.filter, today)
    }

    /// Always computed over the full list, regardless of the active filter.
    pub fn stats(&self, today: NaiveDate) -> TaskStats {
        TaskStats::compute(&self.tasks, today)
    }

    pub async fn load(&mut self) -> Result<(), BoardError> {
        self.error = None;
        self.reload().await
    }

    /// Creates a task, or replaces the one under edit. The edited task keeps
    /// its completion flag.
    pub async fn submit(&mut self, draft: &TaskDraft) -> Result<TaskItem, BoardError> {
        draft.validate()?;
        self.error = None;

        let result = match &self.editing {
            Some(existing) => {
                self.api
                    .update_task(existing.id, &draft.to_update(existing.is_completed))
                    .await
            }
            None => self.api.create_task(&draft.to_create()).await,
        };
        let task = self.check(result, SAVE_ERROR)?;

        self.editing = None;
        self.reload().await?;
        Ok(task)
    }

    /// Selects a task for editing and returns the prefilled draft.
    pub fn begin_edit(&mut self, id: i64) -> Result<TaskDraft, BoardError> {
        let task = self.task(id).cloned().ok_or(BoardError::UnknownTask(id))?;
        let draft = TaskDraft::from_task(&task);
        self.editing = Some(task);
        Ok(draft)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), BoardError> {
        self.error = None;

        let result = self.api.delete_task(id).await;
        self.check(result, DELETE_ERROR)?;

        if self.editing.as_ref().is_some_and(|task| task.id == id) {
            self.editing = None;
        }
        self.reload().await
    }

    /// Sends a full update of the task with `isCompleted` flipped.
    pub async fn toggle_complete(&mut self, id: i64) -> Result<TaskItem, BoardError> {
        let task = self.task(id).ok_or(BoardError::UnknownTask(id))?;
        let mut payload = UpdateTaskItem::from(task);
        payload.is_completed = !payload.is_completed;
        self.error = None;

        let result = self.api.update_task(id, &payload).await;
        let updated = self.check(result, UPDATE_ERROR)?;

        self.reload().await?;
        Ok(updated)
    }

    async fn reload(&mut self) -> Result<(), BoardError> {
        let result = self.api.list_tasks().await;
        self.tasks = self.check(result, LOAD_ERROR)?;
        Ok(())
    }

    fn check<T>(
        &mut self,
        result: Result<T, ClientError>,
        message: &'static str,
    ) -> Result<T, BoardError> {
        result.map_err(|source| {
            tracing::warn!("{message} ({source})");
            self.error = Some(message);
            BoardError::Api { message, source }
        })
    }
}
