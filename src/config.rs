//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::db;

pub const DEFAULT_PORT: u16 = 5555;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Database file (from SUPERHEROES_DB). Falls back to the user data directory.
    pub db_path: Option<PathBuf>,
    /// Listen port (from SUPERHEROES_PORT)
    pub port: u16,
    /// Allowed CORS origins (from SUPERHEROES_CORS_ORIGINS, comma-separated)
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("SUPERHEROES_DB")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let port = lookup("SUPERHEROES_PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = lookup("SUPERHEROES_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Self {
            db_path,
            port,
            cors_origins,
        }
    }

    pub fn db_path(&self) -> anyhow::Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => db::default_path(),
        }
    }

    /// Permissive unless origins were configured.
    pub fn cors_layer(&self) -> CorsLayer {
        match self.allowed_origins() {
            None => CorsLayer::permissive(),
            Some(origins) => CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        }
    }

    /// The configured origins that are valid header values.
    fn allowed_origins(&self) -> Option<Vec<HeaderValue>> {
        let origins = self.cors_origins.as_ref()?;
        let origins = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {:?}", origin);
                    None
                }
            })
            .collect();
        Some(origins)
    }
}
