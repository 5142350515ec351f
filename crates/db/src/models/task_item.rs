use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};

use crate::{
    entities::task_item,
    types::{DEFAULT_PRIORITY, due_date},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "due_date::deserialize")]
    pub due_date: Option<NaiveDate>,
    pub priority: i32,
    pub is_completed: bool,
    pub created_date: DateTime<Utc>,
}

/// Body of `POST /tasks`. Any `id` or `createdDate` sent along is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "due_date::deserialize")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub is_completed: bool,
}

/// Body of `PUT /tasks/{id}`: a full replacement of every mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "due_date::deserialize")]
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub is_completed: bool,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

// Empty string = no description
fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .filter(|d| !d.trim().is_empty())
        .map(str::to_string)
}

impl CreateTaskItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            priority: DEFAULT_PRIORITY,
            is_completed: false,
        }
    }
}

impl From<&TaskItem> for UpdateTaskItem {
    fn from(task: &TaskItem) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            priority: task.priority,
            is_completed: task.is_completed,
        }
    }
}

impl From<task_item::Model> for TaskItem {
    fn from(model: task_item::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            due_date: model.due_date,
            priority: model.priority,
            is_completed: model.is_completed,
            created_date: model.created_date,
        }
    }
}

impl TaskItem {
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < today)
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = task_item::Entity::find()
            .order_by_asc(task_item::Column::Id)
            .all(db)
            .await?;

        Ok(models.into_iter().map(Self::from).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Self>, DbErr> {
        let record = task_item::Entity::find_by_id(id).one(db).await?;
        Ok(record.map(Self::from))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateTaskItem) -> Result<Self, DbErr> {
        let active = task_item::ActiveModel {
            title: Set(data.title.clone()),
            description: Set(normalize_description(data.description.as_deref())),
            due_date: Set(data.due_date),
            priority: Set(data.priority),
            is_completed: Set(data.is_completed),
            created_date: Set(Utc::now()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        tracing::debug!(task_id = model.id, "Created task");
        Ok(model.into())
    }

    /// Returns `None` when no row has this id, including a row deleted
    /// concurrently.
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: i64,
        data: &UpdateTaskItem,
    ) -> Result<Option<Self>, DbErr> {
        let active = task_item::ActiveModel {
            title: Set(data.title.clone()),
            description: Set(normalize_description(data.description.as_deref())),
            due_date: Set(data.due_date),
            priority: Set(data.priority),
            is_completed: Set(data.is_completed),
            ..Default::default()
        };

        let result = task_item::Entity::update_many()
            .set(active)
            .filter(task_item::Column::Id.eq(id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        Self::find_by_id(db, id).await
    }

    /// Returns the number of rows removed; zero means the id was unknown.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: i64) -> Result<u64, DbErr> {
        let result = task_item::Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_and_lists_them() {
        let db = setup_db().await;

        let first = TaskItem::create(&db, &CreateTaskItem::new("first")).await.unwrap();
        let second = TaskItem::create(&db, &CreateTaskItem::new("second")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(!first.is_completed);
        assert_eq!(first.priority, DEFAULT_PRIORITY);

        let tasks = TaskItem::find_all(&db).await.unwrap();
        let ids: HashSet<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(tasks.len(), 2);
        assert!(ids.contains(&first.id) && ids.contains(&second.id));
        assert_eq!(tasks[0].title, "first");
    }

    #[tokio::test]
    async fn create_stores_blank_description_as_none() {
        let db = setup_db().await;
        let mut data = CreateTaskItem::new("with blank description");
        data.description = Some("   ".to_string());

        let task = TaskItem::create(&db, &data).await.unwrap();

        assert_eq!(task.description, None);
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields_and_keeps_identity() {
        let db = setup_db().await;
        let created = TaskItem::create(&db, &CreateTaskItem::new("draft")).await.unwrap();

        let payload = UpdateTaskItem {
            title: "final".to_string(),
            description: Some("details".to_string()),
            due_date: Some(today()),
            priority: 3,
            is_completed: true,
        };
        let updated = TaskItem::update(&db, created.id, &payload)
            .await
            .unwrap()
            .expect("task exists");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_date, created.created_date);
        assert_eq!(updated.title, "final");
        assert_eq!(updated.description.as_deref(), Some("details"));
        assert_eq!(updated.due_date, Some(today()));
        assert_eq!(updated.priority, 3);
        assert!(updated.is_completed);

        let reloaded = TaskItem::find_by_id(&db, created.id).await.unwrap().unwrap();
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let db = setup_db().await;
        let payload = UpdateTaskItem::from(
            &TaskItem::create(&db, &CreateTaskItem::new("only")).await.unwrap(),
        );

        assert!(TaskItem::update(&db, 999, &payload).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_after_delete_returns_none() {
        let db = setup_db().await;
        let task = TaskItem::create(&db, &CreateTaskItem::new("vanishing")).await.unwrap();
        let payload = UpdateTaskItem::from(&task);
        TaskItem::delete(&db, task.id).await.unwrap();

        assert!(TaskItem::update(&db, task.id, &payload).await.unwrap().is_none());
        assert!(TaskItem::find_all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_row_once() {
        let db = setup_db().await;
        let task = TaskItem::create(&db, &CreateTaskItem::new("doomed")).await.unwrap();

        assert_eq!(TaskItem::delete(&db, task.id).await.unwrap(), 1);
        assert!(TaskItem::find_all(&db).await.unwrap().is_empty());
        assert_eq!(TaskItem::delete(&db, task.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_by_id_on_empty_store_is_none() {
        let db = setup_db().await;

        assert!(TaskItem::find_by_id(&db, 999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn out_of_range_priority_is_stored_as_given() {
        let db = setup_db().await;
        let mut data = CreateTaskItem::new("odd priority");
        data.priority = 42;

        let task = TaskItem::create(&db, &data).await.unwrap();

        assert_eq!(task.priority, 42);
    }

    #[test]
    fn is_overdue_requires_past_due_date_and_open_task() {
        let mut task = TaskItem {
            id: 1,
            title: "t".to_string(),
            description: None,
            due_date: Some(today() - Duration::days(1)),
            priority: 1,
            is_completed: false,
            created_date: Utc::now(),
        };
        assert!(task.is_overdue(today()));

        task.due_date = Some(today());
        assert!(!task.is_overdue(today()));

        task.due_date = Some(today() - Duration::days(3));
        task.is_completed = true;
        assert!(!task.is_overdue(today()));

        task.is_completed = false;
        task.due_date = None;
        assert!(!task.is_overdue(today()));
    }

    #[test]
    fn create_payload_accepts_form_style_json() {
        let payload: CreateTaskItem = serde_json::from_str(
            r#"{"id":0,"title":"Write spec","description":"","dueDate":"","priority":2,"isCompleted":false}"#,
        )
        .unwrap();

        assert_eq!(payload.title, "Write spec");
        assert_eq!(payload.due_date, None);
        assert_eq!(payload.priority, 2);

        let payload: CreateTaskItem =
            serde_json::from_str(r#"{"title":"minimal","dueDate":"2024-05-01T00:00:00"}"#).unwrap();
        assert_eq!(payload.priority, DEFAULT_PRIORITY);
        assert_eq!(payload.due_date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn task_item_serializes_camel_case_with_plain_dates() {
        let task = TaskItem {
            id: 7,
            title: "t".to_string(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            priority: 2,
            is_completed: false,
            created_date: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2024-05-01");
        assert_eq!(json["isCompleted"], false);
        assert!(json.get("createdDate").is_some());
        assert!(json["description"].is_null());
    }
}
