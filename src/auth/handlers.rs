use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::{LoginData, LoginRequest, PublicUser, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::service;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validate::{base64_decoded_len, is_valid_email};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

fn check_registration(payload: &RegisterRequest, max_avatar_bytes: usize) -> Result<(), ApiError> {
    if payload.name.trim().len() < 2 {
        return Err(ApiError::field(
            "name",
            "Name must be at least 2 characters",
        ));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::field("email", "Invalid email address"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::field(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if payload.password != payload.password_confirmation {
        return Err(ApiError::field(
            "passwordConfirmation",
            "Passwords do not match",
        ));
    }
    if let Some(avatar) = &payload.avatar {
        if base64_decoded_len(avatar) > max_avatar_bytes {
            return Err(ApiError::field("avatar", "Avatar exceeds the size limit"));
        }
    }
    Ok(())
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PublicUser>>), ApiError> {
    check_registration(&payload, state.config.max_avatar_bytes())?;

    let user = service::register(state.store.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with("User registered successfully", user)),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    if !is_valid_email(&payload.email) {
        return Err(ApiError::field("email", "Invalid email address"));
    }

    let keys = JwtKeys::from_ref(&state);
    let (token, user) =
        service::login(state.store.as_ref(), &keys, &payload.email, &payload.password).await?;
    Ok(Json(ApiResponse::with(
        "Login successful",
        LoginData { token, user },
    )))
}
