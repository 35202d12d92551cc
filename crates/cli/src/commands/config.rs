use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use helply_core::{BotConfig, Language, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match BotConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let supported = config
        .language
        .supported
        .iter()
        .map(Language::as_str)
        .collect::<Vec<_>>()
        .join(",");
    lines.push(render_line(
        "language.supported",
        &supported,
        field_source(
            "language.supported",
            &["HELPLY_SUPPORTED_LANGUAGES"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "language.default",
        config.language.default.as_str(),
        field_source(
            "language.default",
            &["HELPLY_DEFAULT_LANGUAGE"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "sentiment.positive_threshold",
        &config.sentiment.positive_threshold.to_string(),
        field_source(
            "sentiment.positive_threshold",
            &["HELPLY_SENTIMENT_POSITIVE_THRESHOLD"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "sentiment.negative_threshold",
        &config.sentiment.negative_threshold.to_string(),
        field_source(
            "sentiment.negative_threshold",
            &["HELPLY_SENTIMENT_NEGATIVE_THRESHOLD"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "intent.confidence_threshold",
        &config.intent.confidence_threshold.to_string(),
        field_source(
            "intent.confidence_threshold",
            &["HELPLY_INTENT_CONFIDENCE_THRESHOLD"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "history.cap",
        &config.history.cap.to_string(),
        field_source(
            "history.cap",
            &["HELPLY_HISTORY_CAP"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "api.timeout_secs",
        &config.api.timeout_secs.to_string(),
        field_source(
            "api.timeout_secs",
            &["HELPLY_API_TIMEOUT_SECS"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        field_source(
            "server.bind_address",
            &["HELPLY_SERVER_BIND_ADDRESS"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        field_source(
            "server.port",
            &["HELPLY_SERVER_PORT"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            &["HELPLY_LOGGING_LEVEL", "HELPLY_LOG_LEVEL"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        field_source(
            "logging.format",
            &["HELPLY_LOGGING_FORMAT", "HELPLY_LOG_FORMAT"],
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        ),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("helply.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/helply.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    // Keys are listed in loader precedence order, primary before alias.
    for env_key in env_keys {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
