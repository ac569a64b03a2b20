use core_config::{
    AppInfo, ConfigError, Environment, FromEnv, app_info, cors::CorsConfig, env_parse_or,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use std::time::Duration;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    /// `None` when `DATABASE_URL` is unset: tasks live in memory
    pub database: Option<PostgresConfig>,
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database = match PostgresConfig::from_env() {
            Ok(config) => Some(config),
            Err(ConfigError::MissingEnvVar(key)) if key == "DATABASE_URL" => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            cors: CorsConfig::from_env()?,
            database,
            shutdown_timeout: Duration::from_secs(env_parse_or("SHUTDOWN_TIMEOUT_SECS", 30)?),
        })
    }
}
