/// Task endpoints
///
/// - `POST   /api/v1/tasks` - Create in a column the caller owns
/// - `GET    /api/v1/tasks/:id` - Task with labels, comments and attachments
/// - `PUT    /api/v1/tasks/:id` - Partial update
/// - `DELETE /api/v1/tasks/:id`
/// - `PUT    /api/v1/tasks/:id/move` - Move to another column of the same board
/// - `GET    /api/v1/tasks/column/:column_id?title=&page=&limit=`
/// - `GET    /api/v1/tasks/search?board_id=&keyword=&page=&limit=`

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::{
        deserialize_some,
        task::{NewTask, Task, TaskChanges, TaskDetails},
    },
    pagination::PageParams,
    validation::not_blank,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{uuid_field, ValidJson, ValidPath, ValidQuery},
    response::{ApiResponse, Message},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub column_id: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "title is required"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// RFC 3339
    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update
///
/// `deadline: null` clears the deadline; leaving the key out keeps it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub deadline: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MoveTaskRequest {
    #[serde(default)]
    pub column_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TitleFilter {
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub board_id: Option<String>,
    pub keyword: Option<String>,
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let column_id = uuid_field("column_id", &req.column_id)?;
    let task = state
        .services
        .tasks
        .create(
            auth.user_id,
            NewTask {
                column_id,
                title: req.title.trim().to_string(),
                description: req.description,
                deadline: req.deadline,
            },
        )
        .await?;

    Ok(ApiResponse::ok(task))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<TaskDetails>>> {
    let task_id = uuid_field("id", &id)?;
    let task = state.services.tasks.details(task_id, auth.user_id).await?;
    Ok(ApiResponse::ok(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let task_id = uuid_field("id", &id)?;
    let task = state
        .services
        .tasks
        .update(
            task_id,
            auth.user_id,
            TaskChanges {
                title: req.title,
                description: req.description,
                deadline: req.deadline,
            },
        )
        .await?;

    Ok(ApiResponse::ok(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let task_id = uuid_field("id", &id)?;
    state.services.tasks.delete(task_id, auth.user_id).await?;
    Ok(ApiResponse::message("task deleted"))
}

/// Cross-board moves answer 400
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
    ValidJson(req): ValidJson<MoveTaskRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let task_id = uuid_field("id", &id)?;
    let column_id = uuid_field("column_id", &req.column_id)?;

    let task = state
        .services
        .tasks
        .move_task(task_id, column_id, auth.user_id)
        .await?;

    Ok(ApiResponse::ok(task))
}

pub async fn list_column_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(column_id): ValidPath<String>,
    ValidQuery(filter): ValidQuery<TitleFilter>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Task>>>> {
    let column_id = uuid_field("column_id", &column_id)?;
    let tasks = state
        .services
        .tasks
        .find_by_column_with_filters(
            column_id,
            auth.user_id,
            filter.title.as_deref(),
            params.page(),
        )
        .await?;

    Ok(ApiResponse::paginated(tasks))
}

pub async fn search_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidQuery(query): ValidQuery<SearchQuery>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Task>>>> {
    let board_id = uuid_field("board_id", query.board_id.as_deref().unwrap_or_default())?;
    let tasks = state
        .services
        .tasks
        .search(
            board_id,
            auth.user_id,
            query.keyword.as_deref().unwrap_or_default(),
            params.page(),
        )
        .await?;

    Ok(ApiResponse::paginated(tasks))
}
