//! Task HTTP handlers.
//!
//! ```text
//! POST   /api/{owner_id}/tasks
//! GET    /api/{owner_id}/tasks[?completed=true|false]
//! GET    /api/{owner_id}/tasks/{id}
//! PUT    /api/{owner_id}/tasks/{id}
//! PATCH  /api/{owner_id}/tasks/{id}/complete
//! DELETE /api/{owner_id}/tasks/{id}
//! ```
//!
//! Every handler authenticates the bearer token, checks the path owner, and
//! only then reaches the task ports. Bodies arrive as raw bytes and are decoded
//! after the owner check, so a stranger never learns anything from a 400. The
//! domain validator is the single gate for field rules.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DomainError, OwnerId};
use crate::domain::ports::{CreateTaskRequest, ToggleCompletionRequest, UpdateTaskRequest};
use crate::domain::tasks::{Task, TaskId, TaskListFilter};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerOwner;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, decode_json_body, missing_field_error, parse_task_id,
};

#[derive(Debug, Deserialize)]
struct OwnerPath {
    owner_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskPath {
    owner_id: String,
    id: String,
}

/// Body for creating or replacing a task.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TaskPayload {
    /// Required; 1 to 200 characters once trimmed.
    #[schema(example = "Buy groceries")]
    pub title: Option<String>,
    /// Optional; up to 1000 characters once trimmed. Omitted means empty.
    #[schema(example = "Milk, eggs")]
    pub description: Option<String>,
}

/// Body for `PATCH …/complete`. An empty body marks the task completed.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CompletionPayload {
    /// Desired completion state; defaults to `true`.
    pub completed: Option<bool>,
}

/// Query string for listing tasks.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTasksQuery {
    /// Only return tasks with this completion state.
    pub completed: Option<bool>,
}

/// Task as returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TaskResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "user-42")]
    pub owner_id: String,
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[schema(example = "Milk, eggs")]
    pub description: String,
    pub completed: bool,
    /// RFC 3339 UTC timestamp.
    #[schema(example = "2026-03-01T09:00:00.000000Z")]
    pub created_at: String,
    /// RFC 3339 UTC timestamp; strictly increases on every change.
    #[schema(example = "2026-03-01T09:05:00.000000Z")]
    pub updated_at: String,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id().get(),
            owner_id: task.owner_id().to_string(),
            title: task.title().to_owned(),
            description: task.description().to_owned(),
            completed: task.completed(),
            created_at: timestamp(task.created_at()),
            updated_at: timestamp(task.updated_at()),
        }
    }
}

struct ParsedTaskPayload {
    title: String,
    description: Option<String>,
}

fn parse_task_payload(body: &[u8]) -> Result<ParsedTaskPayload, DomainError> {
    let payload: TaskPayload = decode_json_body(body)?;
    let title = payload
        .title
        .ok_or_else(|| missing_field_error(FieldName::new("title")))?;
    Ok(ParsedTaskPayload {
        title,
        description: payload.description,
    })
}

/// Decode the optional `PATCH …/complete` body.
///
/// Absent, empty or `{}` bodies mean "mark completed".
fn parse_completion_body(body: &[u8]) -> Result<bool, DomainError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(true);
    }
    let payload: CompletionPayload = decode_json_body(body)?;
    Ok(payload.completed.unwrap_or(true))
}

fn task_location(task: &TaskResponse) -> String {
    format!("/api/{}/tasks/{}", task.owner_id, task.id)
}

fn resolve_task(owner: &BearerOwner, path: &TaskPath) -> ApiResult<(OwnerId, TaskId)> {
    let owner_id = owner.require_path_owner(&path.owner_id)?;
    let task_id = parse_task_id(&path.id)?;
    Ok((owner_id, task_id))
}

/// Map malformed query strings onto the error envelope.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        DomainError::invalid_request(format!("invalid query string: {err}")).into()
    })
}

/// Create a task for the authenticated owner.
#[utoipa::path(
    post,
    path = "/api/{owner_id}/tasks",
    request_body = TaskPayload,
    params(("owner_id" = String, Path, description = "Owner the task belongs to")),
    responses(
        (
            status = 201,
            description = "Task created",
            headers(("Location" = String, description = "URL of the new task")),
            body = TaskResponse
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "createTask"
)]
#[post("/{owner_id}/tasks")]
pub async fn create_task(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<OwnerPath>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let owner_id = owner.require_path_owner(&path.owner_id)?;
    let parsed = parse_task_payload(&body)?;
    let task = state
        .tasks
        .create_task(CreateTaskRequest {
            owner_id,
            title: parsed.title,
            description: parsed.description,
        })
        .await?;
    let body = TaskResponse::from(task);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, task_location(&body)))
        .json(body))
}

/// List the owner's tasks, oldest first.
#[utoipa::path(
    get,
    path = "/api/{owner_id}/tasks",
    params(
        ("owner_id" = String, Path, description = "Owner whose tasks to list"),
        ListTasksQuery
    ),
    responses(
        (status = 200, description = "Tasks ordered by creation time", body = [TaskResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "listTasks"
)]
#[get("/{owner_id}/tasks")]
pub async fn list_tasks(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<OwnerPath>,
    query: web::Query<ListTasksQuery>,
) -> ApiResult<web::Json<Vec<TaskResponse>>> {
    let owner_id = owner.require_path_owner(&path.owner_id)?;
    let filter = TaskListFilter {
        completed: query.completed,
    };
    let tasks = state.tasks_query.list_tasks(&owner_id, filter).await?;
    Ok(web::Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Fetch one task.
#[utoipa::path(
    get,
    path = "/api/{owner_id}/tasks/{id}",
    params(
        ("owner_id" = String, Path, description = "Owner of the task"),
        ("id" = i64, Path, description = "Task identifier")
    ),
    responses(
        (status = 200, description = "The task", body = TaskResponse),
        (status = 400, description = "Invalid task id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "getTask"
)]
#[get("/{owner_id}/tasks/{id}")]
pub async fn get_task(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<TaskPath>,
) -> ApiResult<web::Json<TaskResponse>> {
    let (owner_id, task_id) = resolve_task(&owner, &path)?;
    let task = state.tasks_query.get_task(&owner_id, task_id).await?;
    Ok(web::Json(TaskResponse::from(task)))
}

/// Replace a task's title and description. Completion is left unchanged.
#[utoipa::path(
    put,
    path = "/api/{owner_id}/tasks/{id}",
    request_body = TaskPayload,
    params(
        ("owner_id" = String, Path, description = "Owner of the task"),
        ("id" = i64, Path, description = "Task identifier")
    ),
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "updateTask"
)]
#[put("/{owner_id}/tasks/{id}")]
pub async fn update_task(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<TaskPath>,
    body: web::Bytes,
) -> ApiResult<web::Json<TaskResponse>> {
    let (owner_id, task_id) = resolve_task(&owner, &path)?;
    let parsed = parse_task_payload(&body)?;
    let task = state
        .tasks
        .update_task(UpdateTaskRequest {
            owner_id,
            task_id,
            title: parsed.title,
            description: parsed.description,
        })
        .await?;
    Ok(web::Json(TaskResponse::from(task)))
}

/// Set a task's completion flag.
#[utoipa::path(
    patch,
    path = "/api/{owner_id}/tasks/{id}/complete",
    request_body(content = CompletionPayload, description = "Omit to mark the task completed"),
    params(
        ("owner_id" = String, Path, description = "Owner of the task"),
        ("id" = i64, Path, description = "Task identifier")
    ),
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "toggleTaskCompletion"
)]
#[patch("/{owner_id}/tasks/{id}/complete")]
pub async fn toggle_completion(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<TaskPath>,
    body: web::Bytes,
) -> ApiResult<web::Json<TaskResponse>> {
    let (owner_id, task_id) = resolve_task(&owner, &path)?;
    let completed = parse_completion_body(&body)?;
    let task = state
        .tasks
        .toggle_completion(ToggleCompletionRequest {
            owner_id,
            task_id,
            completed,
        })
        .await?;
    Ok(web::Json(TaskResponse::from(task)))
}

/// Delete a task. Answers 204 whether or not anything was removed.
#[utoipa::path(
    delete,
    path = "/api/{owner_id}/tasks/{id}",
    params(
        ("owner_id" = String, Path, description = "Owner of the task"),
        ("id" = i64, Path, description = "Task identifier")
    ),
    responses(
        (status = 204, description = "Task deleted or already absent"),
        (status = 400, description = "Invalid task id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["tasks"],
    operation_id = "deleteTask"
)]
#[delete("/{owner_id}/tasks/{id}")]
pub async fn delete_task(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<TaskPath>,
) -> ApiResult<HttpResponse> {
    let (owner_id, task_id) = resolve_task(&owner, &path)?;
    state.tasks.delete_task(&owner_id, task_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register every task handler on a service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_task)
        .service(list_tasks)
        .service(get_task)
        .service(update_task)
        .service(toggle_completion)
        .service(delete_task);
}

#[cfg(test)]
#[path = "tasks_tests.rs"]
mod tests;
