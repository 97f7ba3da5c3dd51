use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::store::UserChanges;
use crate::users::dto::{PaginationQuery, UpdateStatusRequest, UpdateUserRequest, UserPage};
use crate::users::service;
use crate::validate::base64_decoded_len;

/// Every route here sits behind the `AuthUser` extractor. The `/:id`
/// routes are open to any authenticated caller, mirroring the `/me`
/// routes with the identity taken from the path instead of the token.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/me",
            get(get_my_profile)
                .put(update_my_profile)
                .delete(delete_my_profile),
        )
        .route("/users/me/status", patch(update_my_status))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn check_pagination(q: &PaginationQuery) -> Result<(i64, i64), ApiError> {
    let page = q.page.unwrap_or(1);
    let limit = q.limit.unwrap_or(10);
    if page < 1 {
        return Err(ApiError::field("page", "Page must be greater than 0"));
    }
    if !(1..=100).contains(&limit) {
        return Err(ApiError::field("limit", "Limit must be between 1 and 100"));
    }
    Ok((page, limit))
}

fn check_update(payload: &UpdateUserRequest, max_avatar_bytes: usize) -> Result<(), ApiError> {
    if let Some(name) = &payload.name {
        if name.trim().len() < 2 {
            return Err(ApiError::field(
                "name",
                "Name must be at least 2 characters",
            ));
        }
    }
    if let Some(avatar) = &payload.avatar {
        if base64_decoded_len(avatar) > max_avatar_bytes {
            return Err(ApiError::field("avatar", "Avatar exceeds the size limit"));
        }
    }
    Ok(())
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            avatar: req.avatar,
            dni: req.dni,
            active: req.active,
        }
    }
}

#[instrument(skip(state, _auth))]
async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<UserPage>, ApiError> {
    let (page, limit) = check_pagination(&query)?;
    let (users, pagination) = service::find_all(state.store.as_ref(), page, limit).await?;
    Ok(Json(UserPage {
        success: true,
        message: "Users retrieved successfully".into(),
        data: users,
        pagination,
    }))
}

#[instrument(skip(state, auth))]
async fn get_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let user = service::find_by_id(state.store.as_ref(), auth.id).await?;
    Ok(Json(ApiResponse::with("Profile retrieved successfully", user)))
}

#[instrument(skip(state, _auth))]
async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let user = service::find_by_id(state.store.as_ref(), id).await?;
    Ok(Json(ApiResponse::with("User retrieved successfully", user)))
}

#[instrument(skip(state, auth, payload))]
async fn update_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    check_update(&payload, state.config.max_avatar_bytes())?;
    let user = service::update(state.store.as_ref(), auth.id, payload.into()).await?;
    Ok(Json(ApiResponse::with("Profile updated successfully", user)))
}

#[instrument(skip(state, _auth, payload))]
async fn update_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    check_update(&payload, state.config.max_avatar_bytes())?;
    let user = service::update(state.store.as_ref(), id, payload.into()).await?;
    Ok(Json(ApiResponse::with("User updated successfully", user)))
}

#[instrument(skip(state, auth, payload))]
async fn update_my_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let user = service::update_status(state.store.as_ref(), auth.id, payload.active).await?;
    Ok(Json(ApiResponse::with("Status updated successfully", user)))
}

#[instrument(skip(state, auth))]
async fn delete_my_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    service::delete(state.store.as_ref(), auth.id).await?;
    Ok(Json(ApiResponse::message("Profile deleted successfully")))
}

#[instrument(skip(state, _auth))]
async fn delete_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    service::delete(state.store.as_ref(), id).await?;
    Ok(Json(ApiResponse::message("User deleted successfully")))
}
