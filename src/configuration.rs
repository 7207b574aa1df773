use std::time::Duration;

use reqwest::Url;
use secrecy::Secret;
use serde::Deserialize;

use crate::repository::{BackendError, SupabaseClient};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub backend: BackendSettings,
    pub threads: ThreadSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub name: String,
    pub log_level: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
    pub timeout_milliseconds: u64,
}

impl BackendSettings {
    pub fn base_url(&self) -> Result<Url, BackendError> {
        Ok(Url::parse(&self.base_url)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn client(&self) -> Result<SupabaseClient, BackendError> {
        SupabaseClient::new(self.base_url()?, self.api_key.clone(), self.timeout())
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ThreadSettings {
    pub max_concurrent_fetches: usize,
}

impl Default for ThreadSettings {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
        }
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| config::ConfigError::Foreign(e.into()))?;
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment, default to `local` if unspecified
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // e.g. `APP_BACKEND__BASE_URL=https://xyz.supabase.co` sets `Settings.backend.base_url`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
