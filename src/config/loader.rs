//! Configuration sources and precedence.
//!
//! Each field is taken from the first source that sets it:
//! command-line flag, then `SGPT_*` environment variable, then the YAML
//! config file, then the built-in default.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use secrecy::SecretString;
use serde::Deserialize;

use super::{Config, DEFAULT_SEPARATOR, DEFAULT_TEMPERATURE, ProviderKind};
use crate::error::SgptError;

const ENV_PREFIX: &str = "SGPT_";
const CONFIG_FILE_NAME: &str = "sgpt.yaml";

/// Command-line flags. Every value is optional so that an absent flag can
/// fall through to the environment and the config file.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "sgpt",
    version,
    about = "Send stdin to a hosted language model and print the reply"
)]
pub struct CliArgs {
    /// API key for the selected provider
    #[arg(short = 'k', long = "api_key")]
    pub api_key: Option<String>,

    /// Provider to use (openai, anthropic, google)
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Model to use for the API
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Instruction for the model
    #[arg(short = 'i', long)]
    pub instruction: Option<String>,

    /// Temperature setting for the model [default: 0.5]
    #[arg(short = 't', long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,

    /// Separator splitting stdin into independent requests [default: newline]
    #[arg(short = 's', long)]
    pub separator: Option<String>,

    /// Enable debug output
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Path or URL to an image file
    #[arg(short = 'g', long = "image")]
    pub image: Option<String>,

    /// Path to an audio file
    #[arg(short = 'a', long = "audio")]
    pub audio: Option<String>,

    /// Explicit config file (defaults to ./sgpt.yaml, then ~/sgpt.yaml)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Text to send instead of reading stdin
    #[arg(trailing_var_arg = true)]
    pub input: Vec<String>,
}

/// `SGPT_*` environment variables. Empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshot the process environment.
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars().filter(|(k, _)| k.starts_with(ENV_PREFIX)))
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `SGPT_<KEY>`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(&format!("{ENV_PREFIX}{}", key.to_ascii_uppercase()))
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, SgptError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    SgptError::config(format!(
                        "invalid value {raw:?} for {ENV_PREFIX}{}: {e}",
                        key.to_ascii_uppercase()
                    ))
                })
            })
            .transpose()
    }
}

/// Contents of `sgpt.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub instruction: Option<String>,
    pub temperature: Option<f64>,
    pub separator: Option<String>,
    pub debug: Option<bool>,
    pub image: Option<String>,
    pub audio: Option<String>,
}

impl FileConfig {
    pub fn from_yaml(text: &str) -> Result<Self, SgptError> {
        // An empty document deserializes as unit, not as a mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
            .map_err(|e| SgptError::config(format!("error reading config file: {e}")))
    }

    pub fn from_path(path: &Path) -> Result<Self, SgptError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SgptError::config(format!(
                "error reading config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&text)
    }

    /// Find and parse the config file.
    ///
    /// An explicit path must exist. Otherwise `./sgpt.yaml` and then
    /// `~/sgpt.yaml` are tried; finding neither is not an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>, SgptError> {
        if let Some(path) = explicit {
            return Self::from_path(path).map(Some);
        }

        let candidates = std::iter::once(PathBuf::from(CONFIG_FILE_NAME))
            .chain(dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME)));
        for candidate in candidates {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "using config file");
                return Self::from_path(&candidate).map(Some);
            }
        }
        Ok(None)
    }
}

/// Merge the three sources. The result is not validated.
pub fn resolve(
    args: &CliArgs,
    env: &EnvSource,
    file: Option<&FileConfig>,
) -> Result<Config, SgptError> {
    let file = file.cloned().unwrap_or_default();

    let pick = |flag: &Option<String>, key: &str, file_value: Option<String>| {
        flag.clone()
            .filter(|v| !v.is_empty())
            .or_else(|| env.get(key))
            .or(file_value.filter(|v| !v.is_empty()))
    };

    let api_key = pick(&args.api_key, "api_key", file.api_key).unwrap_or_default();
    let provider = pick(&args.provider, "provider", file.provider)
        .unwrap_or_else(|| ProviderKind::OpenAi.as_str().to_string());
    let model = pick(&args.model, "model", file.model);
    let instruction = pick(&args.instruction, "instruction", file.instruction).unwrap_or_default();
    let separator = pick(&args.separator, "separator", file.separator)
        .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
    let image_path = pick(&args.image, "image", file.image);
    let audio_path = pick(&args.audio, "audio", file.audio);

    let temperature = match args.temperature {
        Some(t) => t,
        None => env
            .parse::<f64>("temperature")?
            .or(file.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE),
    };

    let debug = if args.debug {
        true
    } else {
        env.parse::<bool>("debug")?
            .or(file.debug)
            .unwrap_or(false)
    };

    Ok(Config {
        api_key: SecretString::from(api_key),
        provider,
        model,
        instruction,
        temperature,
        separator,
        image_path,
        audio_path,
        debug,
        remaining_args: args.input.clone(),
        ..Config::default()
    })
}

/// Resolve from the real environment and config file, then validate.
pub fn load(args: &CliArgs) -> Result<Config, SgptError> {
    let file = FileConfig::discover(args.config.as_deref())?;
    let mut config = resolve(args, &EnvSource::from_process(), file.as_ref())?;
    config.validate()?;
    Ok(config)
}
