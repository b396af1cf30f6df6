use std::path::PathBuf;

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use nebula_provider::config::ProvidersConfig;

const ENV_PREFIX: &str = "NEBULA_PROVIDER";

/// Loads the provider configuration from `path` (TOML) and `NEBULA_PROVIDER__*` environment variables.
///
/// `NEBULA_PROVIDER__USER__BASE_URL=http://...` overrides `user.base_url`.
pub(crate) fn load_config(path: Option<PathBuf>) -> anyhow::Result<ProvidersConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml));
    }

    build_config(builder)
}

fn build_config(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<ProvidersConfig> {
    let config = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()?
        .try_deserialize()?;

    Ok(config)
}
