use crate::task::{NewTask, Task, TaskChanges, TaskRepository, TaskRepositoryError, TaskStatus};
use crate::web::api::ErrorResponse;
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct TaskState {
    pub repository: Arc<dyn TaskRepository>,
}

impl TaskState {
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Server-generated identifier
    pub id: i32,
    /// What needs to be done
    pub description: String,
    /// Current lifecycle state
    pub status: TaskStatus,
    /// When the task was created
    pub created_at: NaiveDateTime,
    /// When the task was last changed
    pub updated_at: NaiveDateTime,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            description: task.description,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    /// Must not be blank
    #[serde(default)]
    pub description: String,
    /// Defaults to `new` when missing or empty
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for replacing a task's description and status.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    /// Must not be blank
    #[serde(default)]
    pub description: String,
    /// Keeps the stored status when missing or empty
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for changing only the status of a task.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Error type for task handler operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    #[error("Invalid task ID")]
    InvalidId,
    #[error("{0}")]
    InvalidBody(String),
    #[error("Description is required")]
    EmptyDescription,
    #[error("Invalid status '{0}', expected one of: new, in progress, done")]
    InvalidStatus(String),
    #[error("Task not found")]
    NotFound(i32),
    #[error("{0}")]
    Storage(String),
}

impl TaskApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            TaskApiError::InvalidId
            | TaskApiError::InvalidBody(_)
            | TaskApiError::EmptyDescription
            | TaskApiError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            TaskApiError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            TaskApiError::InvalidId => "INVALID_TASK_ID",
            TaskApiError::InvalidBody(_) => "INVALID_BODY",
            TaskApiError::EmptyDescription => "EMPTY_DESCRIPTION",
            TaskApiError::InvalidStatus(_) => "INVALID_STATUS",
            TaskApiError::NotFound(_) => "TASK_NOT_FOUND",
            TaskApiError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status_code(), Json(error_response)).into_response()
    }
}

impl From<TaskRepositoryError> for TaskApiError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => TaskApiError::NotFound(id),
            TaskRepositoryError::Database(db_err) => {
                tracing::error!("Task storage failure: {}", db_err);
                TaskApiError::Storage(db_err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for TaskApiError {
    fn from(rejection: JsonRejection) -> Self {
        TaskApiError::InvalidBody(rejection.body_text())
    }
}

impl From<PathRejection> for TaskApiError {
    fn from(_: PathRejection) -> Self {
        TaskApiError::InvalidId
    }
}

fn require_description(description: String) -> Result<String, TaskApiError> {
    if description.trim().is_empty() {
        return Err(TaskApiError::EmptyDescription);
    }
    Ok(description)
}

/// Missing and empty statuses are both treated as "not given".
fn parse_optional_status(status: Option<String>) -> Result<Option<TaskStatus>, TaskApiError> {
    match status.as_deref() {
        None | Some("") => Ok(None),
        Some(value) => parse_status(value).map(Some),
    }
}

fn parse_status(value: &str) -> Result<TaskStatus, TaskApiError> {
    TaskStatus::parse(value).ok_or_else(|| TaskApiError::InvalidStatus(value.to_string()))
}

/// Handler for POST /tasks.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Malformed body, blank description or invalid status", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<TaskState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), TaskApiError> {
    let Json(payload) = payload?;
    let description = require_description(payload.description)?;
    let status = parse_optional_status(payload.status)?.unwrap_or_default();

    let task = state
        .repository
        .create(NewTask {
            description,
            status,
        })
        .await?;
    tracing::info!("Created task {}", task.id);
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for GET /tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "All tasks ordered by ID", body = [TaskJson]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<TaskState>,
) -> Result<Json<Vec<TaskJson>>, TaskApiError> {
    let tasks = state.repository.list().await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /tasks/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The task", body = TaskJson),
        (status = 400, description = "ID is not an integer", body = ErrorResponse),
        (status = 404, description = "No task with this ID", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<TaskState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(id) = id?;
    let task = state.repository.get_by_id(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PUT /tasks/{id}.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "The updated task", body = TaskJson),
        (status = 400, description = "Bad ID, malformed body or failed validation", body = ErrorResponse),
        (status = 404, description = "No task with this ID", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<TaskState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let description = require_description(payload.description)?;
    let status = parse_optional_status(payload.status)?;

    let task = state
        .repository
        .update(
            id,
            TaskChanges {
                description,
                status,
            },
        )
        .await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /tasks/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = i32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 400, description = "ID is not an integer", body = ErrorResponse),
        (status = 404, description = "No task with this ID", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<TaskState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, TaskApiError> {
    let Path(id) = id?;
    state.repository.delete(id).await?;
    tracing::info!("Deleted task {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for PATCH /tasks/{id}/status.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    patch,
    path = "/tasks/{id}/status",
    params(("id" = i32, Path, description = "Task ID")),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "The updated task", body = TaskJson),
        (status = 400, description = "Bad ID, malformed body or invalid status", body = ErrorResponse),
        (status = 404, description = "No task with this ID", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_status_handler(
    State(state): State<TaskState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let status = parse_status(&payload.status)?;

    let task = state.repository.update_status(id, status).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Creates and returns the tasks router.
pub fn create_task_router(state: TaskState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/tasks/{id}/status", patch(update_task_status_handler))
        .with_state(state)
}
