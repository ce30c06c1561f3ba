//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML and carries the
//! server, signing, store, and stream sections. Every section defaults
//! sensibly so a completely empty file is valid, except that the server
//! refuses to start without a signing secret.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable that overrides `signing.secret`.
pub const SECRET_ENV: &str = "STREAMGATE_SIGNING_SECRET";

/// Locations searched when no explicit config path is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "./streamgate.toml",
    "~/.config/streamgate/config.toml",
    "/etc/streamgate/config.toml",
];

const MIN_RECOMMENDED_SECRET_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub signing: SigningConfig,
    pub store: StoreConfig,
    pub stream: StreamConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from `path`, or from the first default location
    /// that exists when `path` is `None`.
    ///
    /// An explicit path that does not exist falls back to defaults; a file
    /// that exists but cannot be read or parsed is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
                .find(|p| p.exists()),
        };

        let Some(path) = path else {
            tracing::info!("No config file found; using defaults");
            return Ok(Self::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let config = Self::from_toml(&contents)?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))),
        }
    }

    /// Apply environment overrides. Currently only the signing secret, so
    /// it can be kept out of files on disk.
    pub fn apply_env(&mut self) {
        self.apply_secret_override(std::env::var(SECRET_ENV).ok());
    }

    fn apply_secret_override(&mut self, secret: Option<String>) {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.signing.secret = Some(secret);
        }
    }

    /// Return the signing secret bytes, or an error when none is configured.
    pub fn signing_secret(&self) -> Result<&[u8]> {
        match self.signing.secret.as_deref() {
            Some(s) if !s.is_empty() => Ok(s.as_bytes()),
            _ => Err(Error::Config(format!(
                "signing.secret is not set (configure it or export {SECRET_ENV})"
            ))),
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        match self.signing.secret.as_deref() {
            None | Some("") => warnings.push("signing.secret is not set".into()),
            Some(s) if s.len() < MIN_RECOMMENDED_SECRET_LEN => warnings.push(format!(
                "signing.secret is shorter than {MIN_RECOMMENDED_SECRET_LEN} bytes"
            )),
            Some(_) => {}
        }

        if self.signing.ttl_secs == 0 {
            warnings.push("signing.ttl_secs is 0; issued URLs expire immediately".into());
        }

        if !self.store.root.is_dir() {
            warnings.push(format!(
                "store.root {} is not a directory",
                self.store.root.display()
            ));
        }

        if self.store.extensions.is_empty() {
            warnings.push("store.extensions is empty; nothing will be served".into());
        }

        if self.stream.chunk_size == 0 {
            warnings.push(format!(
                "stream.chunk_size is 0; using {}",
                default_chunk_size()
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Access-token signing settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Opaque HMAC secret shared by issuance and validation.
    pub secret: Option<String>,
    /// Lifetime of issued access URLs, in seconds.
    pub ttl_secs: u64,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

/// Media store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the media files.
    pub root: PathBuf,
    /// File extensions (without dot) that are listed and streamable.
    pub extensions: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./videos"),
            extensions: vec!["mp4".into()],
        }
    }
}

/// Streaming transfer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Upper bound, in bytes, on a single body frame read from storage.
    pub chunk_size: usize,
}

impl StreamConfig {
    /// Chunk size with the zero case replaced by the default.
    pub fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            default_chunk_size()
        } else {
            self.chunk_size
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    64 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.signing.ttl_secs, 86_400);
        assert_eq!(config.store.extensions, vec!["mp4".to_string()]);
        assert_eq!(config.stream.chunk_size, 64 * 1024);
        assert!(config.signing.secret.is_none());
    }

    #[test]
    fn parses_sections() {
        let config = Config::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8088

            [signing]
            secret = "s3cret"
            ttl_secs = 60

            [store]
            root = "/srv/media"
            extensions = ["mp4", "mkv"]

            [stream]
            chunk_size = 4096
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.signing_secret().unwrap(), b"s3cret");
        assert_eq!(config.signing.ttl_secs, 60);
        assert_eq!(config.store.root, PathBuf::from("/srv/media"));
        assert_eq!(config.store.extensions.len(), 2);
        assert_eq!(config.stream.effective_chunk_size(), 4096);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = Config::from_toml("[server\nport = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let config = Config::default();
        assert!(config.signing_secret().is_err());

        let mut config = Config::default();
        config.signing.secret = Some(String::new());
        assert!(config.signing_secret().is_err());
    }

    #[test]
    fn secret_override_replaces_file_value() {
        let mut config = Config::default();
        config.signing.secret = Some("from-file".into());
        config.apply_secret_override(Some("from-env".into()));
        assert_eq!(config.signing_secret().unwrap(), b"from-env");

        config.apply_secret_override(Some(String::new()));
        assert_eq!(config.signing_secret().unwrap(), b"from-env");

        config.apply_secret_override(None);
        assert_eq!(config.signing_secret().unwrap(), b"from-env");
    }

    #[test]
    fn debug_redacts_secret() {
        let mut config = Config::default();
        config.signing.secret = Some("do-not-print".into());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("do-not-print"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn validate_flags_weak_settings() {
        let mut config = Config::default();
        config.server.port = 0;
        config.signing.secret = Some("short".into());
        config.stream.chunk_size = 0;
        config.store.root = PathBuf::from("/definitely/not/here");

        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.contains("server.port")));
        assert!(warnings.iter().any(|w| w.contains("shorter than")));
        assert!(warnings.iter().any(|w| w.contains("chunk_size")));
        assert!(warnings.iter().any(|w| w.contains("store.root")));
        assert_eq!(config.stream.effective_chunk_size(), 64 * 1024);
    }

    #[test]
    fn load_reads_file_and_falls_back_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streamgate.toml");
        std::fs::write(&path, "[server]\nport = 9001\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9001);

        let missing = dir.path().join("absent.toml");
        let config = Config::load(Some(&missing)).unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
