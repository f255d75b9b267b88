// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FramewerkError, Result};

/// Environment variable overriding [`ServiceConfig::port`].
pub const ENV_PORT: &str = "FRAMEWERK_PORT";
/// Environment variable overriding [`ServiceConfig::bind_address`].
pub const ENV_BIND: &str = "FRAMEWERK_BIND";
/// Environment variable overriding [`ServiceConfig::storage_root`].
pub const ENV_STORAGE_ROOT: &str = "FRAMEWERK_STORAGE_ROOT";

/// Settings for the editor/resize HTTP service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interface the HTTP listener binds to.
    pub bind_address: IpAddr,
    /// Port for the HTTP listener (default 8080).
    pub port: u16,
    /// Directory whose subdirectories act as buckets.
    pub storage_root: PathBuf,
    /// Requests larger than this are rejected with 413.
    pub max_request_bytes: usize,
    /// Largest resize target, in pixels, a request may ask for.
    pub max_output_pixels: u64,
    /// JPEG quality for encoded output (1-100).
    pub jpeg_quality: u8,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
            storage_root: PathBuf::from("./data"),
            max_request_bytes: 64 * 1024 * 1024,
            max_output_pixels: 50_000_000,
            jpeg_quality: 75,
        }
    }
}

impl ServiceConfig {
    /// Load settings from a JSON file, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used. A file that exists
    /// but does not parse is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let data = std::fs::read_to_string(path)?;
                serde_json::from_str::<ServiceConfig>(&data)?
            }
            _ => ServiceConfig::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.jpeg_quality = config.jpeg_quality.clamp(1, 100);
        Ok(config)
    }

    /// Apply `FRAMEWERK_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| {
                FramewerkError::InvalidRequest(format!("{ENV_PORT} is not a port: {port}"))
            })?;
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind_address = bind.trim().parse().map_err(|_| {
                FramewerkError::InvalidRequest(format!("{ENV_BIND} is not an IP address: {bind}"))
            })?;
        }
        if let Some(root) = lookup(ENV_STORAGE_ROOT) {
            self.storage_root = PathBuf::from(root);
        }
        Ok(())
    }

    /// Socket address the listener binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Persist the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_conventions() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.jpeg_quality, 75);
        assert_eq!(config.max_output_pixels, 50_000_000);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ServiceConfig::load(Some(&dir.path().join("absent.json")))
            .expect("load defaults");
        assert_eq!(config.max_request_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "jpeg_quality": 90, "storage_root": "/srv/buckets" }"#)
            .expect("write config");

        let config = ServiceConfig::load(Some(&path)).expect("load");
        assert_eq!(config.jpeg_quality, 90);
        assert_eq!(config.storage_root, PathBuf::from("/srv/buckets"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        let config = ServiceConfig {
            port: 9000,
            ..Default::default()
        };
        config.save(&path).expect("save");
        let loaded: ServiceConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(loaded, config);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ port: ").expect("write config");
        assert!(ServiceConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn overrides_replace_fields() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|key| match key {
                ENV_PORT => Some("9090".into()),
                ENV_BIND => Some("127.0.0.1".into()),
                ENV_STORAGE_ROOT => Some("/tmp/objects".into()),
                _ => None,
            })
            .expect("overrides");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9090");
        assert_eq!(config.storage_root, PathBuf::from("/tmp/objects"));
    }

    #[test]
    fn bad_port_override_is_rejected() {
        let mut config = ServiceConfig::default();
        let result = config.apply_overrides(|key| (key == ENV_PORT).then(|| "http".to_string()));
        assert!(matches!(result, Err(FramewerkError::InvalidRequest(_))));
    }
}
