//! # ophir-config
//!
//! Layered settings for the Ophir Estate server.
//!
//! Precedence, lowest first: built-in defaults, `config/default.toml`,
//! `config/{OPHIR_ENV}.toml`, then `OPHIR__SECTION__KEY` environment
//! variables. A `.env` file is loaded into the environment beforehand with
//! [`DotenvSource::load`]; its outcome is logged once tracing is set up.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use ophir_core::models::Role;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Marks the session cookie `Secure`.
    pub production: bool,
    /// CORS origins allowed to call the API with credentials.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted REST backend + object store
    Rest,
    /// In-process maps, for local runs
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct BackendSettings {
    pub kind: BackendKind,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: Option<SecretString>,
    pub bucket: String,
}

/// Credentials seeded into the memory backend.
#[derive(Debug, Default, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub credentials: Vec<SeedCredential>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCredential {
    pub email: String,
    pub password: SecretString,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

/// Outcome of reading `.env`, kept until a subscriber can record it.
#[derive(Debug)]
pub enum DotenvSource {
    File(PathBuf),
    NotLoaded(String),
}

impl DotenvSource {
    /// Loads `.env` from the working directory or one of its parents.
    pub fn load() -> Self {
        dotenvy::dotenv().into()
    }

    pub fn log(&self) {
        match self {
            DotenvSource::File(path) => info!("Loaded environment from {}", path.display()),
            DotenvSource::NotLoaded(reason) => debug!("No .env file loaded: {reason}"),
        }
    }
}

impl From<dotenvy::Result<PathBuf>> for DotenvSource {
    fn from(result: dotenvy::Result<PathBuf>) -> Self {
        match result {
            Ok(path) => DotenvSource::File(path),
            Err(e) => DotenvSource::NotLoaded(e.to_string()),
        }
    }
}

impl Settings {
    /// Reads the config files and the environment. Call
    /// [`DotenvSource::load`] first for `.env` values to apply.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("OPHIR_ENV").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                Environment::with_prefix("OPHIR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins"),
            );

        Self::from_builder(builder)
    }

    /// Applies defaults under whatever sources `builder` already carries.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.production", false)?
            .set_default("backend.kind", "memory")?
            .set_default("storage.bucket", "property-images")?
            .set_default("log.format", "pretty")?
            .set_default("log.filter", "info")?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let unset = |key: &Option<SecretString>| key.as_ref().map_or(true, |k| k.expose_secret().is_empty());

        if self.backend.kind != BackendKind::Rest {
            return Ok(());
        }

        let mut missing = Vec::new();
        if self.backend.url.trim().is_empty() {
            missing.push("backend.url");
        }
        if unset(&self.backend.service_key) {
            missing.push("backend.service_key");
        }
        if self.storage.url.trim().is_empty() {
            missing.push("storage.url");
        }
        if unset(&self.storage.service_key) {
            missing.push("storage.service_key");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "rest backend requires {}",
                missing.join(", ")
            )))
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn dotenv_outcome_is_kept_for_later() {
        let missing = DotenvSource::from(dotenvy::from_filename("ophir-no-such-file.env"));
        assert!(matches!(missing, DotenvSource::NotLoaded(_)));

        let found = DotenvSource::from(Ok(PathBuf::from("/srv/ophir/.env")));
        let DotenvSource::File(path) = found else {
            panic!("expected a file, got {found:?}");
        };
        assert_eq!(path, PathBuf::from("/srv/ophir/.env"));
    }

    #[test]
    fn defaults_describe_a_local_memory_server() {
        let settings = from_toml("").unwrap();
        assert_eq!(settings.bind_address(), "0.0.0.0:3000");
        assert!(!settings.server.production);
        assert_eq!(settings.backend.kind, BackendKind::Memory);
        assert_eq!(settings.storage.bucket, "property-images");
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert!(settings.auth.credentials.is_empty());
    }

    #[test]
    fn rest_backend_requires_urls_and_keys() {
        let err = from_toml("[backend]\nkind = \"rest\"\nurl = \"https://db.example\"\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("backend.service_key"));
        assert!(message.contains("storage.url"));
        assert!(!message.contains("backend.url,"));
    }

    #[test]
    fn full_rest_configuration() {
        let settings = from_toml(
            r#"
            [server]
            port = 8080
            production = true
            allowed_origins = ["https://ophirestate.com"]

            [backend]
            kind = "rest"
            url = "https://db.example"
            service_key = "svc"

            [storage]
            url = "https://db.example"
            service_key = "svc"

            [[auth.credentials]]
            email = "dev@ophirestate.com"
            password = "pw"
            role = "dev"
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert!(settings.server.production);
        assert_eq!(settings.backend.service_key.unwrap().expose_secret(), "svc");
        assert_eq!(settings.auth.credentials[0].role, Role::Dev);
        assert_eq!(settings.auth.credentials[0].password.expose_secret(), "pw");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let settings = from_toml(
            "[backend]\nkind = \"memory\"\nservice_key = \"super-secret\"\n",
        )
        .unwrap();
        assert!(!format!("{settings:?}").contains("super-secret"));
    }
}
