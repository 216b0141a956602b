use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Values that win over both the configuration file and `APP_` variables.
/// A `None` leaves whatever the lower layers provided untouched.
pub type Overrides = Vec<(&'static str, Option<config::Value>)>;

pub fn default_configuration_file() -> anyhow::Result<PathBuf> {
    let base_path = std::env::current_dir().context("Failed to determine the current directory")?;
    let configuration_directory = base_path.join("configuration");
    let file = if cfg!(test) { "test.yaml" } else { "base.yaml" };
    Ok(configuration_directory.join(file))
}

pub fn config<Settings: DeserializeOwned>(
    file: &Path,
    overrides: Overrides,
) -> anyhow::Result<Settings> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from(file))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );

    for (key, value) in overrides {
        builder = builder
            .set_override_option(key, value)
            .with_context(|| format!("Failed to override {key}"))?;
    }

    let settings = builder
        .build()
        .with_context(|| format!("Failed to build configuration from {}", file.display()))?;

    settings
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")
}
