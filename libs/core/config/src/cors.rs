use crate::{ConfigError, FromEnv};
use std::env;

/// Allowed browser origins, read from `CORS_ALLOWED_ORIGIN`
///
/// The variable holds a comma-separated list. An unset variable yields an
/// empty list; what that means is up to the environment (see
/// `axum_helpers::http::cors_layer`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_configured(&self) -> bool {
        !self.allowed_origins.is_empty()
    }
}

impl FromEnv for CorsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let Ok(raw) = env::var("CORS_ALLOWED_ORIGIN") else {
            return Ok(Self::default());
        };

        let allowed_origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if allowed_origins.is_empty() {
            return Err(ConfigError::ParseError {
                key: "CORS_ALLOWED_ORIGIN".to_string(),
                details: "set but contains no origins".to_string(),
            });
        }

        Ok(Self { allowed_origins })
    }
}
