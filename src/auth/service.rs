use tracing::{info, warn};

use crate::auth::dto::{PublicUser, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::store::{NewUser, UserStore};

/// Identical wording for unknown email and wrong password, so a failed
/// login never reveals whether the account exists.
const BAD_CREDENTIALS: &str = "Invalid credentials";

pub async fn register(
    store: &dyn UserStore,
    req: RegisterRequest,
) -> Result<PublicUser, ApiError> {
    // Early check for a friendlier error; the store's unique index is
    // what actually closes the race between concurrent registrations.
    if store.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "registration with existing email");
        return Err(ApiError::Conflict("Email already in use".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = store
        .create(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            avatar: req.avatar,
            dni: req.dni,
            active: req.active.unwrap_or(true),
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user.into())
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<(String, PublicUser), ApiError> {
    let user = match store.find_by_email(email).await? {
        Some(u) => u,
        None => {
            warn!("login with unknown email");
            return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
        }
    };

    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    // Checked only after the password verified, so a disabled account is
    // not discoverable without its credentials.
    if !user.active {
        warn!(user_id = %user.id, "login on disabled account");
        return Err(ApiError::Forbidden("Account is disabled".into()));
    }

    let token = keys.sign(user.id, &user.email)?;
    info!(user_id = %user.id, "user logged in");
    Ok((token, user.into()))
}
