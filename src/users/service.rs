use tracing::info;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::error::ApiError;
use crate::store::{UserChanges, UserStore};
use crate::users::dto::PageMeta;

const USER_NOT_FOUND: &str = "User not found";

pub async fn find_all(
    store: &dyn UserStore,
    page: i64,
    limit: i64,
) -> Result<(Vec<PublicUser>, PageMeta), ApiError> {
    let total = store.count().await?;
    let offset = (page - 1) * limit;
    let users = store.list(offset, limit).await?;
    let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
    Ok((
        users.into_iter().map(Into::into).collect(),
        PageMeta {
            total,
            page,
            limit,
            pages,
        },
    ))
}

pub async fn find_by_id(store: &dyn UserStore, id: Uuid) -> Result<PublicUser, ApiError> {
    let user = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.into()))?;
    Ok(user.into())
}

pub async fn update(
    store: &dyn UserStore,
    id: Uuid,
    changes: UserChanges,
) -> Result<PublicUser, ApiError> {
    let user = store
        .update(id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.into()))?;
    info!(user_id = %user.id, "user updated");
    Ok(user.into())
}

pub async fn update_status(
    store: &dyn UserStore,
    id: Uuid,
    active: bool,
) -> Result<PublicUser, ApiError> {
    let user = store
        .update(
            id,
            UserChanges {
                active: Some(active),
                ..Default::default()
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.into()))?;
    info!(user_id = %user.id, active, "user status updated");
    Ok(user.into())
}

pub async fn delete(store: &dyn UserStore, id: Uuid) -> Result<(), ApiError> {
    if !store.delete(id).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.into()));
    }
    info!(user_id = %id, "user deleted");
    Ok(())
}
