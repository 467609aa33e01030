#[macro_export]
/// Load configuration with compiled-in defaults baked from a JSON file, given
/// as a path relative to the workspace root. File, environment, and override
/// sources still take precedence over the defaults.
/// Meant for services and tests where the defaults file must resolve no matter
/// the working directory.
///
/// # Example
/// ```ignore
/// let cfg: AmConfig = drover_library::load_config_default!(
///     "drover_am_library/src/am.json",
///     config_fpath,
///     overrides,
///     "DROVER_AM"
/// )?;
/// ```
macro_rules! load_config_default {
    ($defaults_json_file:literal, $overrides_config_fpath:ident, $overrides:ident, $env_prefix:expr) => {{
        let defaults = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../", $defaults_json_file));
        $crate::config::load_config(Some(defaults), $overrides_config_fpath, $overrides, $env_prefix)
    }};
}

/// Build a `T` by layering configuration sources, lowest priority first:
/// compiled-in defaults, an optional file, environment variables under
/// `env_prefix` (nested keys separated by `__`), then programmatic overrides.
pub fn load_config<T>(
    default_json: Option<&str>,
    overrides_config_fpath: Option<&str>,
    overrides: Option<Vec<(String, String)>>,
    env_prefix: &str,
) -> anyhow::Result<T>
where
    T: for<'a> serde::Deserialize<'a>,
{
    let mut builder = config::Config::builder();
    if let Some(default_json) = default_json {
        builder = builder.add_source(config::File::from_str(default_json, config::FileFormat::Json));
    }
    if let Some(config_fpath) = overrides_config_fpath {
        if std::path::Path::new(config_fpath).exists() {
            builder = builder.add_source(config::File::with_name(config_fpath));
        }
    }
    builder = builder.add_source(
        config::Environment::with_prefix(env_prefix)
            .try_parsing(true)
            .separator("__")
            .prefix_separator("__"),
    );
    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            builder = builder
                .set_override(&key, value.clone())
                .map_err(|e| anyhow::anyhow!("Failed to set override '{}' to '{}' because {}", key, value, e))?;
        }
    }
    let built = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build configuration because '{}'", e))?;
    built
        .try_deserialize()
        .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration because '{}'", e))
}
