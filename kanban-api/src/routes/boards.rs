/// Board endpoints
///
/// # Endpoints
///
/// - `GET    /api/v1/boards?page=&limit=` - The caller's boards, newest first
/// - `POST   /api/v1/boards` - Create a board with its three default columns
/// - `GET    /api/v1/boards/:id` - One board with its columns
/// - `PUT    /api/v1/boards/:id` - Change title and/or color
/// - `DELETE /api/v1/boards/:id` - Soft-delete
///
/// Another user's board answers 401, a missing one 404.

use axum::{extract::State, Extension, Json};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::board::{Board, BoardChanges, BoardWithColumns},
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
pub struct CreateBoardRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "title is required"))]
    pub title: String,

    #[serde(default)]
    pub color: String,
}

/// Absent or empty fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    pub title: Option<String>,
    pub color: Option<String>,
}

pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidQuery(params): ValidQuery<PageParams>,
) -> ApiResult<Json<ApiResponse<Vec<Board>>>> {
    let boards = state
        .services
        .boards
        .find_by_user(auth.user_id, params.page())
        .await?;

    Ok(ApiResponse::paginated(boards))
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateBoardRequest>,
) -> ApiResult<Json<ApiResponse<BoardWithColumns>>> {
    let board = state
        .services
        .boards
        .create(auth.user_id, req.title.trim(), req.color.trim())
        .await?;

    Ok(ApiResponse::ok(board))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<BoardWithColumns>>> {
    let board_id = uuid_field("id", &id)?;
    let board = state.services.boards.find_by_id(board_id, auth.user_id).await?;
    Ok(ApiResponse::ok(board))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
    ValidJson(req): ValidJson<UpdateBoardRequest>,
) -> ApiResult<Json<ApiResponse<Board>>> {
    let board_id = uuid_field("id", &id)?;
    let board = state
        .services
        .boards
        .update(
            board_id,
            auth.user_id,
            BoardChanges {
                title: req.title,
                color: req.color,
            },
        )
        .await?;

    Ok(ApiResponse::ok(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidPath(id): ValidPath<String>,
) -> ApiResult<Json<ApiResponse<Message>>> {
    let board_id = uuid_field("id", &id)?;
    state.services.boards.delete(board_id, auth.user_id).await?;
    Ok(ApiResponse::message("board deleted"))
}
