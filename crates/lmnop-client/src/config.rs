//! Configuration for the LMNOP client.
//!
//! Settings live in an optional `lmnop.json` in the working directory. Every
//! field has a default, so a missing file yields a working configuration
//! pointed at a backend on `localhost:8080`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LmsError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "lmnop.json";

/// Default backend base address.
fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Default location of the persisted session.
fn default_session_file() -> String {
    ".lmnop/session.json".to_string()
}

/// Default login entry point.
fn default_login_path() -> String {
    "/login".to_string()
}

/// Default landing page after a role mismatch or a public-page visit.
fn default_landing_path() -> String {
    "/".to_string()
}

/// Default per-request timeout in seconds.
const fn default_request_timeout() -> u64 {
    30
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base address of the backend REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// File holding the persisted session entries.
    #[serde(default = "default_session_file")]
    pub session_file: String,

    /// Path of the login entry point.
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Path users are sent to when they may not view a page.
    #[serde(default = "default_landing_path")]
    pub landing_path: String,

    /// Timeout applied to every backend call, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_file: default_session_file(),
            login_path: default_login_path(),
            landing_path: default_landing_path(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `lmnop.json`; returns defaults if it is absent.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            LmsError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `lmnop.json` in a specific directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the default configuration. The result is
    /// validated either way.
    ///
    /// # Errors
    ///
    /// Returns `LmsError::ConfigParseError` if the file cannot be read or is
    /// not valid JSON, and `LmsError::ConfigValidationError` if a value is out
    /// of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(LmsError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| LmsError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `apiBaseUrl` must be an absolute `http` or `https` address
    /// - `sessionFile` must not be empty
    /// - `loginPath` and `landingPath` must start with `/`
    /// - `requestTimeoutSecs` must be greater than 0
    pub fn validate(&self) -> Result<()> {
        match reqwest::Url::parse(&self.api_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => {
                return Err(LmsError::config_validation(
                    format!("apiBaseUrl '{}' is not an http(s) address", self.api_base_url),
                    "Set apiBaseUrl to something like \"http://localhost:8080\" in your lmnop.json",
                ));
            }
        }

        if self.session_file.trim().is_empty() {
            return Err(LmsError::config_validation(
                "sessionFile must not be empty",
                "Provide a session file path in your lmnop.json",
            ));
        }

        if !self.login_path.starts_with('/') {
            return Err(LmsError::config_validation(
                format!("loginPath '{}' must start with '/'", self.login_path),
                "Use an absolute page path such as \"/login\" for loginPath",
            ));
        }

        if !self.landing_path.starts_with('/') {
            return Err(LmsError::config_validation(
                format!("landingPath '{}' must start with '/'", self.landing_path),
                "Use an absolute page path such as \"/\" for landingPath",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(LmsError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Set requestTimeoutSecs to at least 1 in your lmnop.json",
            ));
        }

        Ok(())
    }

    /// Base address with any trailing `/` removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.session_file, ".lmnop/session.json");
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.landing_path, "/");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization_with_overrides() {
        let json = r#"{
            "apiBaseUrl": "https://lms.example.edu/backend/",
            "requestTimeoutSecs": 5
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.api_base_url, "https://lms.example.edu/backend/");
        assert_eq!(config.base_url(), "https://lms.example.edu/backend");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        // Defaults for the rest
        assert_eq!(config.login_path, "/login");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"apiBaseUrl": "http://api:9000", "theme": "dark"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_base_url, "http://api:9000");
    }

    #[test]
    fn test_load_from_file_nonexistent_returns_default() {
        let config = Config::load_from_file(&PathBuf::from("/nonexistent/lmnop.json")).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let config_path = std::env::temp_dir().join("test_lmnop_invalid.json");
        std::fs::write(&config_path, b"{ nope }").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(
            matches!(&err, LmsError::ConfigParseError { path, message } if *path == config_path && !message.is_empty()),
            "Expected ConfigParseError, got: {err:?}"
        );

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_load_from_dir_finds_lmnop_json() {
        let temp_dir = std::env::temp_dir().join("test_lmnop_dir");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let config_path = temp_dir.join("lmnop.json");
        std::fs::write(&config_path, r#"{"loginPath": "/signin"}"#).unwrap();

        let config = Config::load_from_dir(&temp_dir).unwrap();
        assert_eq!(config.login_path, "/signin");

        std::fs::remove_file(&config_path).ok();
        std::fs::remove_dir(&temp_dir).ok();
    }

    #[test]
    fn test_load_from_file_validates_after_parsing() {
        let config_path = std::env::temp_dir().join("test_lmnop_validation.json");
        std::fs::write(&config_path, r#"{"requestTimeoutSecs": 0}"#).unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(
            matches!(&err, LmsError::ConfigValidationError { message, .. } if message.contains("requestTimeoutSecs")),
            "Expected ConfigValidationError, got: {err:?}"
        );

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        for bad in ["localhost:8080", "ftp://files.example.com", "", "not a url"] {
            let config = Config {
                api_base_url: bad.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(LmsError::ConfigValidationError { .. })),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_validation_rejects_relative_paths() {
        let config = Config {
            login_path: "login".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            landing_path: "home".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_empty_session_file() {
        let config = Config {
            session_file: "  ".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(&err, LmsError::ConfigValidationError { message, .. } if message.contains("sessionFile")));
    }
}
