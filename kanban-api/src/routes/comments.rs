/// Comment endpoints
///
/// - `POST   /api/v1/comments` - `{task_id, content}`
/// - `GET    /api/v1/comments/:id`
/// - `PUT    /api/v1/comments/:id` - `{content}`; empty leaves it unchanged
/// - `DELETE /api/v1/comments/:id`
/// - `GET    /api/v1/comments/task/:task_id?page=&limit=`

use axum::{extract::State, Extension, Json};
use kanban_shared::{
    auth::middleware::AuthContext, models::comment::Comment, pagination::PageParams,
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
pub struct CreateCommentRequest {
    #[serde(default)]
    pub task_id: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateCommentRequest>,
) -> ApiResult<Json<ApiResponse<Comment>>> {
    let task_id = uuid_field("task_id", &req.task_id)?;
    let comment = state
        .services
        .comments
        .create(auth.user_id, task_id, &req.content)
        .await?;

    Ok(ApiResponse::ok(comment))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Comment>>> {
    let comment_id = uuid_field("id", &id)?;
    let comment = state.services.comments.find_by_id(comment_id, auth.user_id).await?;
    Ok(ApiResponse::ok(comment))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
    ValidJson(req): ValidJson<UpdateCommentRequest>,
) -> ApiResult<Json<ApiResponse<Comment>>> {
    let comment_id = uuid_field("id", &id)?;
    let comment = state
        .services
        .comments
        .update(comment_id, auth.user_id, req.content)
        .await?;

    Ok(ApiResponse::ok(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let comment_id = uuid_field("id", &id)?;
    state.services.comments.delete(comment_id, auth.user_id).await?;
    Ok(ApiResponse::message("comment deleted"))
}

pub async fn list_task_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(task_id): ValidPath<String>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Comment>>>> {
    let task_id = uuid_field("task_id", &task_id)?;
    let comments = state
        .services
        .comments
        .find_by_task(task_id, auth.user_id, params.page())
        .await?;

    Ok(ApiResponse::paginated(comments))
}
