/// Label endpoints
///
/// Labels are shared by all users; any authenticated caller may manage them.
/// Attaching to or detaching from a task requires owning the task.
///
/// - `GET    /api/v1/labels?page=&limit=`
/// - `POST   /api/v1/labels` - `{name, color}`; names are unique
/// - `GET    /api/v1/labels/:id`
/// - `PUT    /api/v1/labels/:id`
/// - `DELETE /api/v1/labels/:id`
/// - `GET    /api/v1/tasks/:id/labels`
/// - `POST   /api/v1/tasks/:id/labels/:label_id` - idempotent
/// - `DELETE /api/v1/tasks/:id/labels/:label_id` - idempotent

use axum::{extract::State, Extension, Json};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::label::{Label, LabelChanges},
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
pub struct CreateLabelRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "name is required"))]
    pub name: String,

    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLabelRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

pub async fn list_labels(
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Label>>>> {
    let labels = state.services.labels.find_all(params.page()).await?;
    Ok(ApiResponse::paginated(labels))
}

pub async fn create_label(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateLabelRequest>,
) -> ApiResult<Json<ApiResponse<Label>>> {
    let label = state
        .services
        .labels
        .create(req.name.trim(), req.color.trim())
        .await?;

    Ok(ApiResponse::ok(label))
}

pub async fn get_label(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Label>>> {
    let label_id = uuid_field("id", &id)?;
    let label = state.services.labels.find_by_id(label_id).await?;
    Ok(ApiResponse::ok(label))
}

pub async fn update_label(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<String>,
    ValidJson(req): ValidJson<UpdateLabelRequest>,
) -> ApiResult<Json<ApiResponse<Label>>> {
    let label_id = uuid_field("id", &id)?;
    let label = state
        .services
        .labels
        .update(
            label_id,
            LabelChanges {
                name: req.name,
                color: req.color,
            },
        )
        .await?;

    Ok(ApiResponse::ok(label))
}

pub async fn delete_label(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let label_id = uuid_field("id", &id)?;
    state.services.labels.delete(label_id).await?;
    Ok(ApiResponse::message("label deleted"))
}

pub async fn list_task_labels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Vec<Label>>>> {
    let task_id = uuid_field("id", &id)?;
    let labels = state.services.labels.find_by_task(task_id, auth.user_id).await?;
    Ok(ApiResponse::ok(labels))
}

pub async fn add_label_to_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath((id, label_id)): ValidPath<(String, String)>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let task_id = uuid_field("id", &id)?;
    let label_id = uuid_field("label_id", &label_id)?;

    state
        .services
        .labels
        .add_to_task(task_id, label_id, auth.user_id)
        .await?;

    Ok(ApiResponse::message("label added to task"))
}

pub async fn remove_label_from_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath((id, label_id)): ValidPath<(String, String)>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let task_id = uuid_field("id", &id)?;
    let label_id = uuid_field("label_id", &label_id)?;

    state
        .services
        .labels
        .remove_from_task(task_id, label_id, auth.user_id)
        .await?;

    Ok(ApiResponse::message("label removed from task"))
}
