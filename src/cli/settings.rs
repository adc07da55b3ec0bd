//! `set` and `unset`: edit `config.toml` from the command line.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use crate::cli::context::lookup_provider;
use crate::core::config::data::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::core::config::{path_display, Config, CredentialBackend};

const KEYS: [&str; 6] = [
    "default-provider",
    "detailed",
    "request-timeout",
    "credential-backend",
    "data-dir",
    "endpoint",
];

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq, Eq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided provider identifier was not found.
    UnknownProvider { input: String },
    /// The value does not fit the setting.
    InvalidValue {
        key: &'static str,
        input: String,
        expected: &'static str,
    },
    /// Required arguments are missing.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                write!(f, "Unknown config key: {key} (known: {})", KEYS.join(", "))
            }
            SettingError::UnknownProvider { input } => write!(
                f,
                "Unknown provider: {input}. Run 'chitchat providers' to list them."
            ),
            SettingError::InvalidValue {
                key,
                input,
                expected,
            } => write!(f, "Invalid value for {key}: {input} (expected {expected})"),
            SettingError::MissingArgs { hint, example } => write!(f, "{hint}\nExample: {example}"),
        }
    }
}

impl Error for SettingError {}

pub fn run_set(key: Option<String>, value: Vec<String>) -> Result<(), Box<dyn Error>> {
    let path = config_file()?;
    let mut config = Config::load_from_path(&path)?;

    let Some(key) = key else {
        println!("Settings in {}:", path_display(&path));
        print!("{}", format_settings(&config));
        return Ok(());
    };

    let message = apply_set(&mut config, &key, &value)?;
    config.save_to_path(&path)?;
    println!("✅ {message}");
    Ok(())
}

pub fn run_unset(key: String, value: Option<String>) -> Result<(), Box<dyn Error>> {
    let path = config_file()?;
    let mut config = Config::load_from_path(&path)?;
    let message = apply_unset(&mut config, &key, value.as_deref())?;
    config.save_to_path(&path)?;
    println!("✅ {message}");
    Ok(())
}

fn config_file() -> Result<PathBuf, Box<dyn Error>> {
    Config::config_path().ok_or_else(|| "Could not determine the config directory".into())
}

pub fn apply_set(config: &mut Config, key: &str, args: &[String]) -> Result<String, SettingError> {
    match key {
        "default-provider" => {
            let input = required(
                args,
                "To set the default provider, give its id:",
                "chitchat set default-provider groq",
            )?;
            let profile = lookup_provider(&input).map_err(|_| SettingError::UnknownProvider {
                input: input.clone(),
            })?;
            config.default_provider = Some(profile.id.clone());
            Ok(format!("Set default-provider to: {}", profile.id))
        }
        "detailed" => {
            let input = required(
                args,
                "To set the default reply length, specify on or off:",
                "chitchat set detailed on",
            )?;
            let value = parse_bool(&input).ok_or(SettingError::InvalidValue {
                key: "detailed",
                input,
                expected: "on or off",
            })?;
            config.detailed = Some(value);
            Ok(format!("Set detailed to: {}", format_bool(value)))
        }
        "request-timeout" => {
            let input = required(
                args,
                "To set the request timeout, give it in seconds:",
                "chitchat set request-timeout 30",
            )?;
            let secs = input
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(SettingError::InvalidValue {
                    key: "request-timeout",
                    input,
                    expected: "a positive number of seconds",
                })?;
            config.request_timeout_secs = Some(secs);
            Ok(format!("Set request-timeout to: {secs}s"))
        }
        "credential-backend" => {
            let input = required(
                args,
                "To choose where API keys are kept, specify file or keyring:",
                "chitchat set credential-backend keyring",
            )?;
            let backend = match input.to_lowercase().as_str() {
                "file" => CredentialBackend::File,
                "keyring" => CredentialBackend::Keyring,
                _ => {
                    return Err(SettingError::InvalidValue {
                        key: "credential-backend",
                        input,
                        expected: "file or keyring",
                    })
                }
            };
            config.credential_backend = Some(backend);
            Ok(format!("Set credential-backend to: {}", backend_label(backend)))
        }
        "data-dir" => {
            let input = required(
                args,
                "To move the conversation store, give a directory:",
                "chitchat set data-dir ~/chitchat-data",
            )?;
            config.data_dir = Some(PathBuf::from(&input));
            Ok(format!("Set data-dir to: {input}"))
        }
        "endpoint" => {
            let missing = SettingError::MissingArgs {
                hint: "To override a provider's endpoint, give the provider and a URL:",
                example: "chitchat set endpoint groq http://localhost:8080/v1/chat/completions",
            };
            let [provider, url] = args else {
                return Err(missing);
            };
            let profile = lookup_provider(provider).map_err(|_| SettingError::UnknownProvider {
                input: provider.clone(),
            })?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SettingError::InvalidValue {
                    key: "endpoint",
                    input: url.clone(),
                    expected: "an http:// or https:// URL",
                });
            }
            config.set_endpoint_override(&profile.id, url.clone());
            Ok(format!("Set endpoint for {} to: {url}", profile.id))
        }
        other => Err(SettingError::UnknownKey(other.to_string())),
    }
}

pub fn apply_unset(
    config: &mut Config,
    key: &str,
    value: Option<&str>,
) -> Result<String, SettingError> {
    match key {
        "default-provider" => config.default_provider = None,
        "detailed" => config.detailed = None,
        "request-timeout" => config.request_timeout_secs = None,
        "credential-backend" => config.credential_backend = None,
        "data-dir" => config.data_dir = None,
        "endpoint" => {
            let provider = value.ok_or(SettingError::MissingArgs {
                hint: "To remove an endpoint override, specify the provider:",
                example: "chitchat unset endpoint groq",
            })?;
            if !config.remove_endpoint_override(provider) {
                return Ok(format!("No endpoint override for {provider}"));
            }
            return Ok(format!("Unset endpoint for {provider}"));
        }
        other => return Err(SettingError::UnknownKey(other.to_string())),
    }
    Ok(format!("Unset {key}"))
}

pub fn format_settings(config: &Config) -> String {
    let mut out = String::new();
    let mut line = |key: &str, value: Option<String>, default: &str| {
        let shown = value.unwrap_or_else(|| format!("(unset, default: {default})"));
        out.push_str(&format!("  {key}: {shown}\n"));
    };

    line(
        "default-provider",
        config.default_provider.clone(),
        crate::core::builtin_providers::DEFAULT_PROVIDER,
    );
    line("detailed", config.detailed.map(format_bool), "off");
    line(
        "request-timeout",
        config.request_timeout_secs.map(|secs| format!("{secs}s")),
        &format!("{DEFAULT_REQUEST_TIMEOUT_SECS}s"),
    );
    line(
        "credential-backend",
        config
            .credential_backend
            .map(|backend| backend_label(backend).to_string()),
        "file",
    );
    line(
        "data-dir",
        config.data_dir.as_ref().map(path_display),
        "platform data directory",
    );

    let mut endpoints: Vec<_> = config.endpoint_overrides().into_iter().collect();
    endpoints.sort();
    for (provider, url) in endpoints {
        out.push_str(&format!("  endpoint {provider}: {url}\n"));
    }
    out
}

fn required(
    args: &[String],
    hint: &'static str,
    example: &'static str,
) -> Result<String, SettingError> {
    let joined = args.join(" ");
    if joined.trim().is_empty() {
        return Err(SettingError::MissingArgs { hint, example });
    }
    Ok(joined.trim().to_string())
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn format_bool(value: bool) -> String {
    let label = if value { "on" } else { "off" };
    label.to_string()
}

fn backend_label(backend: CredentialBackend) -> &'static str {
    match backend {
        CredentialBackend::File => "file",
        CredentialBackend::Keyring => "keyring",
    }
}
