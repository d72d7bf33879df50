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
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => database_url_from_parts()?,
        };
        let secret = std::env::var("API_SECRET")
            .or_else(|_| std::env::var("JWT_SECRET"))
            .context("API_SECRET (or JWT_SECRET) must be set")?;
        anyhow::ensure!(!secret.is_empty(), "API_SECRET must not be empty");

        let jwt = JwtConfig {
            secret,
            ttl_minutes: parse_var("JWT_TTL_MINUTES").unwrap_or(60),
        };
        Ok(Self {
            database_url,
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT")
                .or_else(|| parse_var("APP_PORT"))
                .unwrap_or(8080),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

/// Builds a postgres URL from the `DB_*` variables used by older deployments.
fn database_url_from_parts() -> anyhow::Result<String> {
    let var = |key: &str| std::env::var(key).with_context(|| format!("{key} must be set"));
    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        var("DB_USER")?,
        var("DB_PASSWORD")?,
        var("DB_HOST")?,
        std::env::var("DB_PORT").unwrap_or_else(|_| "5432".into()),
        var("DB_NAME")?,
    ))
}
