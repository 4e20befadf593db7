use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value as JsonValue};
use shopfront_core::config::AppConfig;
use toml::Value;

use crate::commands::{load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let sources = Sources { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        Some(JsonValue::Object(effective_fields(&config, &sources))),
    )
}

struct Sources<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

fn effective_fields(config: &AppConfig, sources: &Sources<'_>) -> Map<String, JsonValue> {
    let admin_token = if config.admin_enabled() { "<redacted>" } else { "<unset>" };
    let rows = vec![
        row("database.url", &["SHOPFRONT_DATABASE_URL"], config.database.url.clone()),
        row(
            "database.max_connections",
            &["SHOPFRONT_DATABASE_MAX_CONNECTIONS"],
            config.database.max_connections.to_string(),
        ),
        row(
            "database.timeout_secs",
            &["SHOPFRONT_DATABASE_TIMEOUT_SECS"],
            config.database.timeout_secs.to_string(),
        ),
        row(
            "server.bind_address",
            &["SHOPFRONT_SERVER_BIND_ADDRESS"],
            config.server.bind_address.clone(),
        ),
        row("server.port", &["SHOPFRONT_SERVER_PORT"], config.server.port.to_string()),
        row(
            "server.graceful_shutdown_secs",
            &["SHOPFRONT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        row("auth.admin_token", &["SHOPFRONT_AUTH_ADMIN_TOKEN"], admin_token.to_string()),
        row(
            "logging.level",
            &["SHOPFRONT_LOGGING_LEVEL", "SHOPFRONT_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        row(
            "logging.format",
            &["SHOPFRONT_LOGGING_FORMAT", "SHOPFRONT_LOG_FORMAT"],
            format!("{:?}", config.logging.format).to_lowercase(),
        ),
        row("admin_routes", &[], if config.admin_enabled() { "enabled" } else { "disabled" }.into()),
    ];

    rows.into_iter()
        .map(|(key, env_keys, value)| {
            let source = field_source(key, env_keys, sources);
            (key.to_string(), json!({ "value": value, "source": source }))
        })
        .collect()
}

type Row = (&'static str, &'static [&'static str], String);

fn row(key: &'static str, env_keys: &'static [&'static str], value: String) -> Row {
    (key, env_keys, value)
}

fn detect_config_path() -> Option<PathBuf> {
    ["shopfront.toml", "config/shopfront.toml"].into_iter().map(PathBuf::from).find(|p| p.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(key_path: &str, env_keys: &[&str], sources: &Sources<'_>) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = sources.doc {
        if contains_path(doc, key_path) {
            let file_path = sources
                .path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    if env_keys.is_empty() {
        return "derived".to_string();
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

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{contains_path, field_source, Sources};

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: Value = "[server]\nport = 9000\n".parse().expect("toml");

        assert!(contains_path(&doc, "server.port"));
        assert!(!contains_path(&doc, "server.bind_address"));
        assert!(!contains_path(&doc, "database.url"));
    }

    #[test]
    fn file_values_are_attributed_to_the_file() {
        let doc: Value = "[logging]\nlevel = \"debug\"\n".parse().expect("toml");
        let sources = Sources { doc: Some(&doc), path: Some(Path::new("shopfront.toml")) };

        let source = field_source("logging.level", &["SHOPFRONT_TEST_UNSET_LEVEL"], &sources);

        assert_eq!(source, "file (shopfront.toml)");
    }

    #[test]
    fn missing_values_fall_back_to_default() {
        let sources = Sources { doc: None, path: None };

        assert_eq!(field_source("server.port", &["SHOPFRONT_TEST_UNSET_PORT"], &sources), "default");
        assert_eq!(field_source("admin_routes", &[], &sources), "derived");
    }
}
