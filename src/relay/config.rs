use std::path::Path;

use serde::Deserialize;

use crate::core::RelievoError;

/// Upload size ceiling enforced before anything is forwarded upstream.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// Relay service configuration, loadable from a TOML file. Every field
/// has a default so an empty file (or none at all) yields a working
/// development setup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the HTTP server binds to.
    pub bind: String,
    /// The only `Origin` header value accepted; everything else gets a
    /// flat 403 before any session or nonce work happens.
    pub allowed_origin: String,
    /// External file host endpoint uploads are forwarded to.
    pub upstream_url: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8700".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
            upstream_url: "https://catbox.moe/user/api.php".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from a TOML or JSON file, picked by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RelievoError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "json" => serde_json::from_str(&text).map_err(|e| {
                RelievoError::config_error(format!("failed to parse {}: {e}", path.display()))
            }),
            "toml" | "" => toml::from_str(&text).map_err(|e| {
                RelievoError::config_error(format!("failed to parse {}: {e}", path.display()))
            }),
            other => Err(RelievoError::config_error(format!(
                "unsupported config format .{other} ({})",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_complete() {
        let config = RelayConfig::default();
        assert_eq!(config.max_upload_bytes, 200 * 1024 * 1024);
        assert!(!config.bind.is_empty());
    }

    fn temp_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let file = temp_config(".toml", "allowed_origin = \"https://photos.example\"\n");

        let config = RelayConfig::load(file.path()).unwrap();
        assert_eq!(config.allowed_origin, "https://photos.example");
        assert_eq!(config.upstream_url, RelayConfig::default().upstream_url);
    }

    #[test]
    fn json_is_detected_by_extension() {
        let file = temp_config(".json", r#"{"bind": "0.0.0.0:9000"}"#);

        let config = RelayConfig::load(file.path()).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
    }

    #[test]
    fn unknown_extension_is_a_config_error() {
        let file = temp_config(".yaml", "bind: nope");

        assert!(matches!(
            RelayConfig::load(file.path()),
            Err(RelievoError::ConfigError { .. })
        ));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let file = temp_config(".toml", "allowed_origin = [not toml\n");

        assert!(matches!(
            RelayConfig::load(file.path()),
            Err(RelievoError::ConfigError { .. })
        ));
    }
}
