//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` (or the file passed with
//! `--config` / `FINTRACK_CONFIG`) and are overlaid by `FINTRACK_*`
//! environment variables, e.g. `FINTRACK_SERVER__MULTI_TENANT=true`.
//! A plain `PORT` variable wins over everything else for the port.
use clap::Parser;
use config::{
    Config, ConfigError, Environment, File,
    builder::{ConfigBuilder, DefaultState},
};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("auth.jwt_secret must not be empty")]
    EmptySecret,
}

#[derive(Debug, Parser)]
#[command(name = "fintrack", version)]
struct Args {
    /// Optional settings file path (TOML).
    #[arg(long, env = "FINTRACK_CONFIG")]
    config: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub multi_tenant: bool,
    pub lenient_dates: bool,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: None,
            port: DEFAULT_PORT,
            database: Database::Memory,
            multi_tenant: false,
            lenient_dates: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub jwt_secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Option<Auth>,
}

impl Settings {
    pub fn new() -> Result<Self, SettingsError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(environment());

        Self::from_builder(builder, std::env::var("PORT").ok())
    }

    fn from_builder(
        builder: ConfigBuilder<DefaultState>,
        port: Option<String>,
    ) -> Result<Self, SettingsError> {
        let port = port.filter(|port| !port.trim().is_empty());
        let settings: Settings = builder
            .set_override_option("server.port", port)?
            .build()?
            .try_deserialize()?;

        if settings
            .auth
            .as_ref()
            .is_some_and(|auth| auth.jwt_secret.trim().is_empty())
        {
            return Err(SettingsError::EmptySecret);
        }
        Ok(settings)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("FINTRACK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
