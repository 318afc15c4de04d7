use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use config::ConfigError;
use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

const DEFAULT_CSV_PATH: &str = "data/database.csv";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub storage: StorageSettings,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    /// Backing CSV file holding the user table.
    pub csv_path: PathBuf,
    pub static_dir: PathBuf,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_upload_bytes: usize,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn read_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|err| ConfigError::Message(format!("failed to read current dir: {err}")))?;

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .map_err(|err| ConfigError::Message(format!("failed to parse APP_ENVIRONMENT: {err}")))?;

    build_settings(
        &base_path.join("config"),
        &environment,
        std::env::var("CSV_PATH").ok(),
    )
}

/// Layers defaults, `base.yaml`, `<environment>.yaml`, `USERS_*` variables
/// and finally `csv_path_override`.
pub fn build_settings(
    config_directory: &Path,
    environment: &Environment,
    csv_path_override: Option<String>,
) -> Result<Settings, ConfigError> {
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", "8000")?
        .set_default("storage.csv_path", DEFAULT_CSV_PATH)?
        .set_default("storage.static_dir", "static")?
        .set_default("storage.max_upload_bytes", "10485760")?
        .add_source(config::File::from(config_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("USERS")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("storage.csv_path", csv_path_override)?
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}
