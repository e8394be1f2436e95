use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use tracing::{info, warn};

use crate::utils::error::{AppError, AppResult};

const DEFAULT_SESSION_SECRET: &str = "default-secret-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreKind::Mongo),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub mongo_uri: String,
    pub db_name: String,
    pub server_addr: SocketAddr,
    pub cors_origin: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub rp_id: String,
    pub rp_origin: String,
    pub rp_name: String,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let store: StoreKind = try_load("STORE", "mongo")?;

        // The database settings only matter for the mongo backend.
        let (mongo_uri, db_name) = match store {
            StoreKind::Mongo => (required("MONGO_URI")?, required("DB_NAME")?),
            StoreKind::Memory => (String::new(), String::new()),
        };

        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set, using an insecure default");
            DEFAULT_SESSION_SECRET.to_string()
        });

        Ok(Self {
            store,
            mongo_uri,
            db_name,
            server_addr: try_load("SERVER_ADDR", "0.0.0.0:8000")?,
            cors_origin: try_load("CORS_ORIGIN", "http://localhost:3000")?,
            session_secret,
            session_ttl_hours: try_load("SESSION_TTL_HOURS", "24")?,
            cookie_secure: try_load("COOKIE_SECURE", "true")?,
            rp_id: try_load("RP_ID", "localhost")?,
            rp_origin: try_load("RP_ORIGIN", "http://localhost:3000")?,
            rp_name: try_load("RP_NAME", "Polls")?,
        })
    }
}

fn required(key: &str) -> AppResult<String> {
    env::var(key).map_err(|_| AppError::InternalError(format!("{key} must be set in .env")))
}

fn try_load<T: FromStr>(key: &str, default: &str) -> AppResult<T>
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| AppError::InternalError(format!("Invalid {key} value: {e}")))
}
