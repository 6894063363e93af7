use crate::entities::*;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::sync::Arc;

pub use crate::entities::sea_orm_active_enums::TaskStatus;

pub mod api;

/// A unit of work tracked by the service.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    pub id: i32,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task {
            id: model.id,
            description: model.description,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Caller-supplied fields of a task that does not exist yet.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct NewTask {
    pub description: String,
    pub status: TaskStatus,
}

/// Replacement values for an existing task. A `None` status keeps the stored one.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct TaskChanges {
    pub description: String,
    pub status: Option<TaskStatus>,
}

/// Error type for TaskRepository operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskRepositoryError {
    /// No row matched the given ID.
    #[error("Task with ID {0} not found")]
    NotFound(i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Storage capability for tasks.
///
/// Handlers only talk to this trait, so they can be exercised against
/// `MockTaskRepository` in unit tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task and returns it with the server-generated ID and timestamps.
    async fn create(&self, new_task: NewTask) -> Result<Task, TaskRepositoryError>;

    /// Returns every task ordered by ascending ID.
    async fn list(&self) -> Result<Vec<Task>, TaskRepositoryError>;

    /// Returns the task with the given ID.
    async fn get_by_id(&self, id: i32) -> Result<Task, TaskRepositoryError>;

    /// Overwrites description (and status, when given) and refreshes `updated_at`.
    async fn update(&self, id: i32, changes: TaskChanges) -> Result<Task, TaskRepositoryError>;

    /// Overwrites only the status and refreshes `updated_at`.
    async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<Task, TaskRepositoryError>;

    /// Removes the task with the given ID.
    async fn delete(&self, id: i32) -> Result<(), TaskRepositoryError>;
}

/// `TaskRepository` backed by the `tasks` table.
pub struct SeaOrmTaskRepository {
    db: Arc<sea_orm::DatabaseConnection>,
}

impl SeaOrmTaskRepository {
    pub fn new(db: Arc<sea_orm::DatabaseConnection>) -> Self {
        SeaOrmTaskRepository { db }
    }

    /// Runs a single `UPDATE ... RETURNING` against one row and maps an empty
    /// result to `NotFound`.
    async fn update_returning(
        &self,
        id: i32,
        update: UpdateMany<task::Entity>,
    ) -> Result<Task, TaskRepositoryError> {
        let updated = update
            .col_expr(task::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(task::Column::Id.eq(id))
            .exec_with_returning(self.db.as_ref())
            .await?;

        match updated.into_iter().next() {
            Some(model) => Ok(Task::from(model)),
            None => {
                tracing::debug!("No task with ID {} to update", id);
                Err(TaskRepositoryError::NotFound(id))
            }
        }
    }
}

#[async_trait]
impl TaskRepository for SeaOrmTaskRepository {
    #[tracing::instrument(skip(self))]
    async fn create(&self, new_task: NewTask) -> Result<Task, TaskRepositoryError> {
        let active_model = task::ActiveModel {
            description: ActiveValue::Set(new_task.description),
            status: ActiveValue::Set(new_task.status),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db.as_ref()).await?;
        Ok(Task::from(created_model))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Task>, TaskRepositoryError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::Id)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: i32) -> Result<Task, TaskRepositoryError> {
        let model = task::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or(TaskRepositoryError::NotFound(id))?;
        Ok(Task::from(model))
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: i32, changes: TaskChanges) -> Result<Task, TaskRepositoryError> {
        let mut update = task::Entity::update_many()
            .col_expr(task::Column::Description, Expr::value(changes.description));
        if let Some(status) = changes.status {
            update = update.col_expr(task::Column::Status, Expr::value(status.as_str()));
        }
        self.update_returning(id, update).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_status(
        &self,
        id: i32,
        status: TaskStatus,
    ) -> Result<Task, TaskRepositoryError> {
        let update = task::Entity::update_many()
            .col_expr(task::Column::Status, Expr::value(status.as_str()));
        self.update_returning(id, update).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<(), TaskRepositoryError> {
        let result = task::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            tracing::debug!("No task with ID {} to delete", id);
            return Err(TaskRepositoryError::NotFound(id));
        }
        Ok(())
    }
}
