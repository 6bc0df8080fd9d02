//! Handles settings for the application.
//!
//! Sources, later ones winning: `settings.toml` (or the file named by
//! `EXPENSES_CONFIG`), `EXPENSES__SECTION__KEY` environment variables, then
//! the plain `DATABASE_URL` and `PORT` variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    url: Option<String>,
}

#[derive(Debug)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Export {
    pub currency_symbol: String,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    app: App,
    server: Server,
    #[serde(default)]
    database: RawDatabase,
    export: Export,
}

#[derive(Debug)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub export: Export,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let path = std::env::var("EXPENSES_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load(
            &path,
            std::env::var("DATABASE_URL").ok(),
            std::env::var("PORT").ok(),
        )
    }

    fn load(
        path: &str,
        database_url: Option<String>,
        port: Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .set_default("export.currency_symbol", "₹")?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("EXPENSES").separator("__"))
            .set_override_option("database.url", database_url)?
            .set_override_option("server.port", port)?
            .build()?
            .try_deserialize()?;

        let url = raw
            .database
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                ConfigError::Message(
                    "database.url is not set (use DATABASE_URL or EXPENSES__DATABASE__URL)"
                        .to_string(),
                )
            })?;

        Ok(Self {
            app: raw.app,
            server: raw.server,
            database: Database { url },
            export: raw.export,
        })
    }
}
