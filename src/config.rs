use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

/// Upper bound on token lifetime regardless of what the environment asks for.
pub const MAX_TTL_MINUTES: i64 = 24 * 60;
pub const MAX_HASH_MEMORY_KIB: u32 = 256 * 1024;
pub const MAX_HASH_ITERATIONS: u32 = 10;
pub const MAX_HASH_PARALLELISM: u32 = 8;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// When unset the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub hasher: HasherConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set and non-empty")?;

        let ttl_minutes = parsed(&lookup, "JWT_TTL_MINUTES", 60i64);
        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "userhub".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "userhub-users".into()),
            ttl_minutes: clamped("JWT_TTL_MINUTES", ttl_minutes, 1, MAX_TTL_MINUTES),
        };

        let defaults = HasherConfig::default();
        let hasher = HasherConfig {
            memory_kib: clamped(
                "HASH_MEMORY_KIB",
                parsed(&lookup, "HASH_MEMORY_KIB", defaults.memory_kib),
                argon2::Params::MIN_M_COST,
                MAX_HASH_MEMORY_KIB,
            ),
            iterations: clamped(
                "HASH_ITERATIONS",
                parsed(&lookup, "HASH_ITERATIONS", defaults.iterations),
                1,
                MAX_HASH_ITERATIONS,
            ),
            parallelism: clamped(
                "HASH_PARALLELISM",
                parsed(&lookup, "HASH_PARALLELISM", defaults.parallelism),
                1,
                MAX_HASH_PARALLELISM,
            ),
        };

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(&lookup, "APP_PORT", 8080u16),
            database_url: lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()),
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", 10u32).max(1),
            jwt,
            hasher,
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn clamped<T>(key: &str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    if value < min {
        warn!(key = %key, %value, %min, "config value below minimum, clamping");
        min
    } else if value > max {
        warn!(key = %key, %value, %max, "config value above maximum, clamping");
        max
    } else {
        value
    }
}
