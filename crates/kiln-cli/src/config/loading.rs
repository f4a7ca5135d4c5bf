use crate::cli::StartArgs;
use crate::config::{KilnConfig, CONFIG_FILE};
use crate::error::{ConfigError, Result, ResultExt};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    value::Uncased,
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// CLI values that override the other sources. Unset flags are skipped so
/// they do not mask the file or the environment.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port_start: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port_end: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quiet: Option<bool>,
}

impl CliOverrides {
    fn from_start_args(args: &StartArgs, quiet: bool) -> Self {
        Self {
            root: args.root.clone(),
            host: args.host.clone(),
            port_start: args.port,
            port_end: args.port_end,
            quiet: quiet.then_some(true),
        }
    }
}

impl KilnConfig {
    /// Load configuration relative to the current directory.
    pub fn load(args: &StartArgs, quiet: bool) -> Result<Self> {
        let cwd = std::env::current_dir().context("Cannot read the working directory")?;
        Self::load_from(args, quiet, &cwd)
    }

    /// Load configuration, resolving the default config file and a relative
    /// `root` against `cwd`.
    ///
    /// An explicit `--config` path must exist; the default file is optional.
    pub fn load_from(args: &StartArgs, quiet: bool, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match &args.config {
            Some(path) => {
                let path = resolve(cwd, path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!("loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        // KILN_PORT_START -> portStart
        figment = figment.merge(
            Env::prefixed("KILN_").map(|key| Uncased::from_owned(camel_case(key.as_str()))),
        );

        figment = figment.merge(Serialized::defaults(CliOverrides::from_start_args(
            args, quiet,
        )));

        let mut config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: "configuration".to_string(),
            value: e.to_string(),
            hint: format!("Check {} syntax and field types", CONFIG_FILE),
        })?;

        config.root = resolve(cwd, &config.root);
        Ok(config)
    }
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// `port_start` -> `portStart`. Figment hands env keys over lowercased.
pub(crate) fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
