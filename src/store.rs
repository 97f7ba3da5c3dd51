use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record as persisted. The password hash is excluded from any
/// serialized form; clients only ever see `PublicUser`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub dni: Option<String>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields for inserting a new user. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub dni: Option<String>,
    pub active: bool,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub dni: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already in use")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            _ => StoreError::Backend(err.into()),
        }
    }
}

/// Abstract user record store. The application owns a single handle,
/// constructed at startup and injected into every operation; uniqueness
/// of the email column is enforced by the store at write time, so the
/// service-level existence check is an optimization, not the guarantee.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;
    async fn create(&self, fields: NewUser) -> Result<UserRecord, StoreError>;
    async fn update(&self, id: Uuid, changes: UserChanges)
        -> Result<Option<UserRecord>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError>;
}

/// Postgres-backed store.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, avatar, dni, active, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, avatar, dni, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, fields: NewUser) -> Result<UserRecord, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (name, email, password_hash, avatar, dni, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, avatar, dni, active, created_at, updated_at
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.email)
        .bind(&fields.password_hash)
        .bind(&fields.avatar)
        .bind(&fields.dni)
        .bind(fields.active)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                avatar = COALESCE($3, avatar),
                dni = COALESCE($4, dni),
                active = COALESCE($5, active),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, avatar, dni, active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.avatar)
        .bind(&changes.dni)
        .bind(changes.active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, avatar, dni, active, created_at, updated_at
            FROM users
            ORDER BY created_at
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

/// In-process store used by tests. Enforces the same email-uniqueness
/// invariant at write time as the Postgres schema.
#[derive(Default)]
pub struct MemoryStore {
    users: std::sync::Mutex<Vec<UserRecord>>,
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().expect("store lock");
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().expect("store lock");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, fields: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.lock().expect("store lock");
        if users.iter().any(|u| u.email == fields.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: fields.name,
            email: fields.email,
            password_hash: fields.password_hash,
            avatar: fields.avatar,
            dni: fields.dni,
            active: fields.active,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.lock().expect("store lock");
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(dni) = changes.dni {
            user.dni = Some(dni);
        }
        if let Some(active) = changes.active {
            user.active = active;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.lock().expect("store lock");
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let users = self.users.lock().expect("store lock");
        Ok(users.len() as i64)
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.lock().expect("store lock");
        Ok(users
            .iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
            avatar: None,
            dni: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn create_enforces_unique_email() {
        let store = MemoryStore::default();
        store.create(new_user("a@x.com")).await.expect("first insert");
        let err = store.create(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn update_applies_only_provided_fields() {
        let store = MemoryStore::default();
        let user = store.create(new_user("a@x.com")).await.expect("insert");
        let updated = store
            .update(
                user.id,
                UserChanges {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .expect("update")
            .expect("exists");
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "a@x.com");
        assert!(updated.active);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_records() {
        let store = MemoryStore::default();
        let missing = Uuid::new_v4();
        assert!(store
            .update(missing, UserChanges::default())
            .await
            .expect("update")
            .is_none());
        assert!(!store.delete(missing).await.expect("delete"));
    }

    #[tokio::test]
    async fn list_pages_through_records() {
        let store = MemoryStore::default();
        for i in 0..5 {
            store
                .create(new_user(&format!("u{i}@x.com")))
                .await
                .expect("insert");
        }
        assert_eq!(store.count().await.expect("count"), 5);
        let page = store.list(2, 2).await.expect("list");
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].email, "u2@x.com");
    }

    #[test]
    fn password_hash_never_serialized() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "a@x.com".into(),
            password_hash: "super-secret-hash".into(),
            avatar: None,
            dni: None,
            active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("password"));
    }
}
