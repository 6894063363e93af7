use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use crate::task::api::{CreateTaskRequest, StatusUpdateRequest, TaskJson, UpdateTaskRequest};
use crate::task::TaskStatus;

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable explanation
    pub message: String,
}

/// JSON response of the `/hello` probe.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    pub hello: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::hello_handler,
        crate::task::api::create_task_handler,
        crate::task::api::list_tasks_handler,
        crate::task::api::get_task_handler,
        crate::task::api::update_task_handler,
        crate::task::api::delete_task_handler,
        crate::task::api::update_task_status_handler,
    ),
    components(schemas(
        TaskJson,
        TaskStatus,
        CreateTaskRequest,
        UpdateTaskRequest,
        StatusUpdateRequest,
        ErrorResponse,
        HelloResponse,
    )),
    tags(
        (name = "Tasks", description = "Task CRUD operations"),
        (name = "Health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;
