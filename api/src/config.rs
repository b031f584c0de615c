use std::path::PathBuf;

use clap::Parser;
use tower_cookies::Key;
use url::Url;

/// Directory of bundled assets, used when no `--static-dir` is given.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

const MIN_SECRET_KEY_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be at least {MIN_SECRET_KEY_LEN} bytes, got {0}")]
    ShortSecretKey(usize),
    #[error("cannot build a database URL from the given credentials")]
    DatabaseCredentials,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "blogly", version, about = "A small blog with HTML pages and a JSON API")]
pub struct Config {
    /// Full database URL; takes precedence over the credential flags
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Postgres user; without it a local SQLite file is used
    #[arg(long, env = "BLOGLY_DB_USER")]
    pub db_user: Option<String>,

    #[arg(long, env = "BLOGLY_DB_PASSWORD")]
    pub db_password: Option<String>,

    #[arg(long, env = "BLOGLY_DB_NAME", default_value = "blogly")]
    pub db_name: String,

    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Signs the flash cookie; a random key is generated when unset
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Log every SQL statement at debug level
    #[arg(long, env = "BLOGLY_ECHO_SQL")]
    pub echo_sql: bool,

    #[arg(long, env = "BLOGLY_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }

        let Some(user) = &self.db_user else {
            return Ok(format!("sqlite://{}.db?mode=rwc", self.db_name));
        };

        let mut url =
            Url::parse("postgres://localhost/").map_err(|_| ConfigError::DatabaseCredentials)?;
        url.set_username(user)
            .map_err(|_| ConfigError::DatabaseCredentials)?;
        url.set_password(self.db_password.as_deref())
            .map_err(|_| ConfigError::DatabaseCredentials)?;
        url.set_path(&self.db_name);

        Ok(url.into())
    }

    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        match &self.secret_key {
            None => Ok(Key::generate()),
            Some(secret) if secret.len() < MIN_SECRET_KEY_LEN => {
                Err(ConfigError::ShortSecretKey(secret.len()))
            }
            Some(secret) => Ok(Key::from(secret.as_bytes())),
        }
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn static_dir(&self) -> PathBuf {
        self.static_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
    }
}
