//! Group API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use rand::Rng;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateGroupRequest, Group, JoinGroupRequest, RenameGroupRequest};
use crate::AppState;

const GROUP_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GROUP_CODE_LEN: usize = 6;

/// Generate a random 6-character uppercase alphanumeric group code.
fn generate_group_code() -> String {
    let mut rng = rand::rng();
    (0..GROUP_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..GROUP_CODE_CHARSET.len());
            GROUP_CODE_CHARSET[idx] as char
        })
        .collect()
}

/// POST /api/groups - Create a new group with a unique code.
pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> ApiResult<Group> {
    if request.group_name.trim().is_empty() {
        return Err(AppError::Validation("Group name is required".to_string()));
    }

    // Regenerate on the (unlikely) code collision
    let mut group_code = generate_group_code();
    while state.repo.find_group_by_code(&group_code).await?.is_some() {
        group_code = generate_group_code();
    }

    let group = state
        .repo
        .create_group(request.group_name.trim(), &group_code)
        .await?;

    tracing::info!(group_id = %group.id, group_code = %group.group_code, "group created");
    success(group)
}

/// POST /api/groups/join - Join an existing group using its code.
pub async fn join_group(
    State(state): State<AppState>,
    Json(request): Json<JoinGroupRequest>,
) -> ApiResult<Group> {
    match state.repo.find_group_by_code(&request.group_code).await? {
        Some(group) => success(group),
        None => Err(AppError::NotFound("Group not found".to_string())),
    }
}

/// GET /api/groups/:id - Get group details by ID.
pub async fn get_group(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Group> {
    match state.repo.get_group(&id).await? {
        Some(group) => success(group),
        None => Err(AppError::NotFound(format!("Group {} not found", id))),
    }
}

/// PUT /api/groups/:id - Rename a group.
pub async fn rename_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RenameGroupRequest>,
) -> ApiResult<Group> {
    if request.group_name.trim().is_empty() {
        return Err(AppError::Validation("Group name is required".to_string()));
    }

    let group = state
        .repo
        .rename_group(&id, request.group_name.trim())
        .await?;
    success(group)
}
