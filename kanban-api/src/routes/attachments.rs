/// Attachment endpoints
///
/// - `POST   /api/v1/attachments` - `{task_id, file_name, file_url, file_size}`
/// - `GET    /api/v1/attachments/:id`
/// - `PUT    /api/v1/attachments/:id` - empty strings and `file_size <= 0` leave fields unchanged
/// - `DELETE /api/v1/attachments/:id`
/// - `GET    /api/v1/attachments/task/:task_id?page=&limit=`

use axum::{extract::State, Extension, Json};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::attachment::{Attachment, AttachmentChanges, NewAttachment},
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
pub struct CreateAttachmentRequest {
    #[serde(default)]
    pub task_id: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "file_name is required"))]
    pub file_name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "file_url is required"))]
    pub file_url: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "file_size must not be negative"))]
    pub file_size: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAttachmentRequest {
    pub file_name: Option<String>,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
}

pub async fn create_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateAttachmentRequest>,
) -> ApiResult<Json<ApiResponse<Attachment>>> {
    let task_id = uuid_field("task_id", &req.task_id)?;
    let attachment = state
        .services
        .attachments
        .create(
            auth.user_id,
            NewAttachment {
                task_id,
                file_name: req.file_name.trim().to_string(),
                file_url: req.file_url.trim().to_string(),
                file_size: req.file_size,
            },
        )
        .await?;

    Ok(ApiResponse::ok(attachment))
}

pub async fn get_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Attachment>>> {
    let attachment_id = uuid_field("id", &id)?;
    let attachment = state
        .services
        .attachments
        .find_by_id(attachment_id, auth.user_id)
        .await?;

    Ok(ApiResponse::ok(attachment))
}

pub async fn update_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
    ValidJson(req): ValidJson<UpdateAttachmentRequest>,
) -> ApiResult<Json<ApiResponse<Attachment>>> {
    let attachment_id = uuid_field("id", &id)?;
    let attachment = state
        .services
        .attachments
        .update(
            attachment_id,
            auth.user_id,
            AttachmentChanges {
                file_name: req.file_name,
                file_url: req.file_url,
                file_size: req.file_size,
            },
        )
        .await?;

    Ok(ApiResponse::ok(attachment))
}

pub async fn delete_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let attachment_id = uuid_field("id", &id)?;
    state.services.attachments.delete(attachment_id, auth.user_id).await?;
    Ok(ApiResponse::message("attachment deleted"))
}

pub async fn list_task_attachments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(task_id): ValidPath<String>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Attachment>>>> {
    let task_id = uuid_field("task_id", &task_id)?;
    let attachments = state
        .services
        .attachments
        .find_by_task(task_id, auth.user_id, params.page())
        .await?;

    Ok(ApiResponse::paginated(attachments))
}
