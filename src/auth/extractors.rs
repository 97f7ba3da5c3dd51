use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::{JwtKeys, TokenError};
use crate::error::ApiError;

/// Authenticated identity attached to a request after its bearer token
/// verified. Claims are trusted as-is for the token lifetime; no store
/// lookup happens here.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "bearer token rejected");
            match e {
                TokenError::Expired => ApiError::Unauthorized("Token expired".into()),
                TokenError::Invalid => ApiError::Unauthorized("Invalid token".into()),
            }
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use jsonwebtoken::{encode, Header};
    use time::OffsetDateTime;

    use super::*;
    use crate::auth::jwt::Claims;
    use crate::state::AppState;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/me");
        if let Some(v) = value {
            builder = builder.header("Authorization", v);
        }
        let (parts, _) = builder.body(()).expect("request").into_parts();
        parts
    }

    async fn extract(value: Option<&str>) -> Result<AuthUser, ApiError> {
        let state = AppState::fake();
        let mut parts = parts_with_auth(value);
        AuthUser::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let err = extract(None).await.unwrap_err();
        match err {
            ApiError::Unauthorized(msg) => assert!(msg.contains("Missing")),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let err = extract(Some("Basic dXNlcjpwYXNz")).await.unwrap_err();
        match err {
            ApiError::Unauthorized(msg) => assert!(msg.contains("Invalid Authorization")),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign(Uuid::new_v4(), "a@x.com").expect("sign");
        let truncated = &token[..token.len() - 2];

        let err = extract(Some(&format!("Bearer {truncated}")))
            .await
            .unwrap_err();
        match err {
            ApiError::Unauthorized(msg) => assert_eq!(msg, "Invalid token"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_token_gets_distinct_wording() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");

        let err = extract(Some(&format!("Bearer {token}"))).await.unwrap_err();
        match err {
            ApiError::Unauthorized(msg) => assert_eq!(msg, "Token expired"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_token_populates_identity() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "ana@x.com").expect("sign");

        let user = extract(Some(&format!("Bearer {token}")))
            .await
            .expect("extract");
        assert_eq!(user.id, user_id);
        assert_eq!(user.email, "ana@x.com");
    }
}
