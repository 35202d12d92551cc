use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Language;

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub language: LanguageConfig,
    pub sentiment: SentimentConfig,
    pub intent: IntentConfig,
    pub history: HistoryConfig,
    pub api: ApiConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LanguageConfig {
    pub supported: Vec<Language>,
    pub default: Language,
}

#[derive(Clone, Debug)]
pub struct SentimentConfig {
    pub positive_threshold: f64,
    pub negative_threshold: f64,
}

#[derive(Clone, Debug)]
pub struct IntentConfig {
    pub confidence_threshold: f64,
}

#[derive(Clone, Debug)]
pub struct HistoryConfig {
    pub cap: usize,
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            language: LanguageConfig {
                supported: vec![Language::En, Language::Es],
                default: Language::En,
            },
            sentiment: SentimentConfig { positive_threshold: 0.1, negative_threshold: -0.1 },
            intent: IntentConfig { confidence_threshold: 0.6 },
            history: HistoryConfig { cap: 50 },
            api: ApiConfig { timeout_secs: 30 },
            server: ServerConfig { bind_address: "0.0.0.0".to_string(), port: 5000 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl BotConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("helply.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(language) = patch.language {
            if let Some(supported) = language.supported {
                self.language.supported = supported;
            }
            if let Some(default) = language.default {
                self.language.default = default;
            }
        }

        if let Some(sentiment) = patch.sentiment {
            if let Some(positive_threshold) = sentiment.positive_threshold {
                self.sentiment.positive_threshold = positive_threshold;
            }
            if let Some(negative_threshold) = sentiment.negative_threshold {
                self.sentiment.negative_threshold = negative_threshold;
            }
        }

        if let Some(intent) = patch.intent {
            if let Some(confidence_threshold) = intent.confidence_threshold {
                self.intent.confidence_threshold = confidence_threshold;
            }
        }

        if let Some(history) = patch.history {
            if let Some(cap) = history.cap {
                self.history.cap = cap;
            }
        }

        if let Some(api) = patch.api {
            if let Some(timeout_secs) = api.timeout_secs {
                self.api.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HELPLY_SUPPORTED_LANGUAGES") {
            self.language.supported = parse_language_list("HELPLY_SUPPORTED_LANGUAGES", &value)?;
        }
        if let Some(value) = read_env("HELPLY_DEFAULT_LANGUAGE") {
            self.language.default = parse_language("HELPLY_DEFAULT_LANGUAGE", &value)?;
        }

        if let Some(value) = read_env("HELPLY_SENTIMENT_POSITIVE_THRESHOLD") {
            self.sentiment.positive_threshold =
                parse_f64("HELPLY_SENTIMENT_POSITIVE_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("HELPLY_SENTIMENT_NEGATIVE_THRESHOLD") {
            self.sentiment.negative_threshold =
                parse_f64("HELPLY_SENTIMENT_NEGATIVE_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("HELPLY_INTENT_CONFIDENCE_THRESHOLD") {
            self.intent.confidence_threshold =
                parse_f64("HELPLY_INTENT_CONFIDENCE_THRESHOLD", &value)?;
        }

        if let Some(value) = read_env("HELPLY_HISTORY_CAP") {
            self.history.cap = parse_usize("HELPLY_HISTORY_CAP", &value)?;
        }

        if let Some(value) = read_env("HELPLY_API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_u64("HELPLY_API_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("HELPLY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("HELPLY_SERVER_PORT") {
            self.server.port = parse_u16("HELPLY_SERVER_PORT", &value)?;
        }

        let log_level = read_env("HELPLY_LOGGING_LEVEL").or_else(|| read_env("HELPLY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("HELPLY_LOGGING_FORMAT").or_else(|| read_env("HELPLY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_language(&self.language)?;
        validate_sentiment(&self.sentiment)?;
        validate_intent(&self.intent)?;
        validate_history(&self.history)?;
        validate_api(&self.api)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("helply.toml"), PathBuf::from("config/helply.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn validate_language(language: &LanguageConfig) -> Result<(), ConfigError> {
    if language.supported.is_empty() {
        return Err(ConfigError::Validation(
            "language.supported must list at least one language".to_string(),
        ));
    }

    if !language.supported.contains(&language.default) {
        return Err(ConfigError::Validation(format!(
            "language.default `{}` must be listed in language.supported",
            language.default
        )));
    }

    Ok(())
}

fn validate_sentiment(sentiment: &SentimentConfig) -> Result<(), ConfigError> {
    let in_range = |value: f64| (-1.0..=1.0).contains(&value);

    if !in_range(sentiment.positive_threshold) || !in_range(sentiment.negative_threshold) {
        return Err(ConfigError::Validation(
            "sentiment thresholds must lie within -1.0..=1.0".to_string(),
        ));
    }

    if sentiment.negative_threshold >= sentiment.positive_threshold {
        return Err(ConfigError::Validation(
            "sentiment.negative_threshold must be below sentiment.positive_threshold".to_string(),
        ));
    }

    Ok(())
}

fn validate_intent(intent: &IntentConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&intent.confidence_threshold) {
        return Err(ConfigError::Validation(
            "intent.confidence_threshold must lie within 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_history(history: &HistoryConfig) -> Result<(), ConfigError> {
    if history.cap == 0 {
        return Err(ConfigError::Validation(
            "history.cap must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_api(api: &ApiConfig) -> Result<(), ConfigError> {
    if api.timeout_secs == 0 || api.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "api.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server.bind_address must not be empty".to_string(),
        ));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_language(key: &str, value: &str) -> Result<Language, ConfigError> {
    value.parse::<Language>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_language_list(key: &str, value: &str) -> Result<Vec<Language>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| parse_language(key, part))
        .collect()
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    language: Option<LanguagePatch>,
    sentiment: Option<SentimentPatch>,
    intent: Option<IntentPatch>,
    history: Option<HistoryPatch>,
    api: Option<ApiPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LanguagePatch {
    supported: Option<Vec<Language>>,
    default: Option<Language>,
}

#[derive(Debug, Default, Deserialize)]
struct SentimentPatch {
    positive_threshold: Option<f64>,
    negative_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct IntentPatch {
    confidence_threshold: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryPatch {
    cap: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiPatch {
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use crate::domain::Language;

    use super::{BotConfig, ConfigError, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_cleanly() {
        let config = BotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.language.default, Language::En);
        assert_eq!(config.history.cap, 50);
        assert_eq!(config.intent.confidence_threshold, 0.6);
        assert_eq!(config.sentiment.negative_threshold, -0.1);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn file_patch_overrides_defaults() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["HELPLY_DEFAULT_LANGUAGE", "HELPLY_HISTORY_CAP"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("helply.toml");
        fs::write(
            &path,
            r#"
[language]
default = "es"

[history]
cap = 10

[logging]
level = "debug"
format = "json"
"#,
        )
        .map_err(|err| err.to_string())?;

        let config =
            BotConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.language.default == Language::Es, "default language should come from file")?;
        ensure(config.history.cap == 10, "history cap should come from file")?;
        ensure(config.logging.level == "debug", "log level should come from file")?;
        ensure(
            matches!(config.logging.format, LogFormat::Json),
            "log format should come from file",
        )
    }

    #[test]
    fn env_overrides_win_over_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("HELPLY_DEFAULT_LANGUAGE", "es");
        env::set_var("HELPLY_INTENT_CONFIDENCE_THRESHOLD", "0.4");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("helply.toml");
            fs::write(
                &path,
                r#"
[language]
default = "en"

[intent]
confidence_threshold = 0.9
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                BotConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.language.default == Language::Es,
                "env default language should win over file",
            )?;
            ensure(
                (config.intent.confidence_threshold - 0.4).abs() < f64::EPSILON,
                "env confidence threshold should win over file",
            )
        })();

        clear_vars(&["HELPLY_DEFAULT_LANGUAGE", "HELPLY_INTENT_CONFIDENCE_THRESHOLD"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("HELPLY_LOG_LEVEL", "warn");
        env::set_var("HELPLY_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = BotConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "log level should be set from alias var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "log format should be set from alias var",
            )
        })();

        clear_vars(&["HELPLY_LOG_LEVEL", "HELPLY_LOG_FORMAT"]);
        result
    }

    #[test]
    fn malformed_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("HELPLY_HISTORY_CAP", "plenty");

        let result = (|| -> Result<(), String> {
            let error = match BotConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. } if key == "HELPLY_HISTORY_CAP"
                ),
                "error should name the offending variable",
            )
        })();

        clear_vars(&["HELPLY_HISTORY_CAP"]);
        result
    }

    #[test]
    fn inverted_sentiment_thresholds_fail_validation() {
        let mut config = BotConfig::default();
        config.sentiment.positive_threshold = -0.5;
        config.sentiment.negative_threshold = 0.5;

        let error = config.validate().expect_err("validation should fail");
        assert!(matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("negative_threshold")
        ));
    }

    #[test]
    fn default_language_must_be_supported() {
        let mut config = BotConfig::default();
        config.language.supported = vec![Language::En];
        config.language.default = Language::Es;

        let error = config.validate().expect_err("validation should fail");
        assert!(matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("language.default")
        ));
    }

    #[test]
    fn zero_history_cap_fails_validation() {
        let mut config = BotConfig::default();
        config.history.cap = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let error = BotConfig::load(LoadOptions {
            config_path: Some(std::path::PathBuf::from("/definitely/not/here.toml")),
            require_file: true,
        })
        .expect_err("load should fail");

        assert!(matches!(error, ConfigError::MissingConfigFile(_)));
    }
}
