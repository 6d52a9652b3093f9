/// Column endpoints
///
/// - `GET    /api/v1/boards/:id/columns` - A board's columns in order
/// - `POST   /api/v1/columns` - Add a column; `order` defaults to after the last one
/// - `GET    /api/v1/columns/:id`
/// - `PUT    /api/v1/columns/:id` - Rename and/or reorder
/// - `DELETE /api/v1/columns/:id`

use axum::{extract::State, Extension, Json};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::column::{Column, ColumnChanges},
    validation::not_blank,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{uuid_field, ValidJson, ValidPath},
    response::{ApiResponse, Message},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateColumnRequest {
    #[serde(default)]
    pub board_id: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "title is required"))]
    pub title: String,

    pub order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateColumnRequest {
    pub title: Option<String>,
    pub order: Option<i32>,
}

pub async fn list_board_columns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Vec<Column>>>> {
    let board_id = uuid_field("id", &id)?;
    let columns = state
        .services
        .columns
        .list_by_board(board_id, auth.user_id)
        .await?;

    Ok(ApiResponse::ok(columns))
}

pub async fn create_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateColumnRequest>,
) -> ApiResult<Json<ApiResponse<Column>>> {
    let board_id = uuid_field("board_id", &req.board_id)?;
    let column = state
        .services
        .columns
        .create(auth.user_id, board_id, req.title.trim(), req.order)
        .await?;

    Ok(ApiResponse::ok(column))
}

pub async fn get_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Column>>> {
    let column_id = uuid_field("id", &id)?;
    let column = state.services.columns.find_by_id(column_id, auth.user_id).await?;
    Ok(ApiResponse::ok(column))
}

pub async fn update_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
    ValidJson(req): ValidJson<UpdateColumnRequest>,
) -> ApiResult<Json<ApiResponse<Column>>> {
    let column_id = uuid_field("id", &id)?;
    let column = state
        .services
        .columns
        .update(
            column_id,
            auth.user_id,
            ColumnChanges {
                title: req.title,
                order: req.order,
            },
        )
        .await?;

    Ok(ApiResponse::ok(column))
}

pub async fn delete_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let column_id = uuid_field("id", &id)?;
    state.services.columns.delete(column_id, auth.user_id).await?;
    Ok(ApiResponse::message("column deleted"))
}
