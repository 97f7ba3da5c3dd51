use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub max_avatar_size_mb: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            // No fallback here: serving traffic with an ad hoc signing key
            // would silently invalidate every issued token on restart.
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let max_avatar_size_mb = std::env::var("MAX_AVATAR_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(2);
        Ok(Self {
            database_url,
            jwt,
            max_avatar_size_mb,
        })
    }

    pub fn max_avatar_bytes(&self) -> usize {
        (self.max_avatar_size_mb as usize) * 1024 * 1024
    }
}
