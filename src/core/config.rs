use config::{Config, Environment};
use serde::Deserialize;

use crate::core::error::ConfigError;

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) database_host: String,
    pub(crate) database_port: u16,
    pub(crate) database_name: String,
    pub(crate) database_user: String,
    pub(crate) database_password: String,
    pub(crate) max_connections: u32,
    pub(crate) log_level: String,
    pub(crate) port: u16,
    pub(crate) secret: String,
    pub(crate) bcrypt_cost: u32,
    pub(crate) secure_cookies: bool,
}

impl Args {
    /// Reads `feedback.toml` if present, then `FEEDBACK_*` environment variables.
    pub(crate) fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix("FEEDBACK"))
    }

    fn load_from(environment: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("database_host", "localhost")?
            .set_default("database_port", 5432)?
            .set_default("database_name", "user_feedback")?
            .set_default("database_user", "postgres")?
            .set_default("database_password", "")?
            .set_default("max_connections", 5)?
            .set_default("log_level", "info")?
            .set_default("port", 3000)?
            .set_default("bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("secure_cookies", false)?
            .add_source(config::File::with_name("feedback").required(false))
            .add_source(environment)
            .build()?;

        let args = config.try_deserialize::<Args>()?;

        if args.secret.len() < 32 {
            return Err(ConfigError::SecretTooShort);
        }

        Ok(args)
    }

    pub(crate) fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.database_user,
            self.database_password,
            self.database_host,
            self.database_port,
            self.database_name
        )
    }
}
