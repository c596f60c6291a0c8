//! Configuration parsing – reads a KEY=VALUE file (`hydrowatch.conf`).
//!
//! The server loads it once at startup and hands the result to the browser
//! through a server function, so the WASM bundle never hard-codes a host.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::notification::NotificationScope;

/// Environment variable that overrides [`ClientConfig::default_path`].
pub const CONF_ENV: &str = "HYDROWATCH_CONF";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    // ── backend ──────────────────────────────────────────────────────
    /// REST base, e.g. `http://localhost:5000`.
    pub backend_url: String,
    /// Socket.IO host.  Same as `backend_url` unless set.
    pub socket_url: String,

    // ── polling ──────────────────────────────────────────────────────
    /// Admin and Super Admin inbox refresh (seconds).
    pub notification_poll_secs: u64,
    /// User inbox refresh (seconds).
    pub user_notification_poll_secs: u64,

    /// Fetch `/api/sensors/latest` before the first socket message.
    pub sensor_backfill: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".into(),
            socket_url: "http://localhost:5000".into(),
            notification_poll_secs: 30,
            user_notification_poll_secs: 5,
            sensor_backfill: true,
        }
    }
}

impl ClientConfig {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/hydrowatch/hydrowatch.conf"
    }

    /// Config path from the first CLI argument, then `HYDROWATCH_CONF`,
    /// then the default.
    pub fn resolve_path(arg: Option<String>, env: Option<String>) -> PathBuf {
        arg.or(env)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::default_path()))
    }

    pub fn poll_interval(&self, scope: &NotificationScope) -> Duration {
        let secs = match scope {
            NotificationScope::User(_) => self.user_notification_poll_secs,
            NotificationScope::Admin | NotificationScope::SuperAdmin => {
                self.notification_poll_secs
            }
        };
        Duration::from_secs(secs.max(1))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| -> Option<String> {
            map.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        let get_u64 = |key: &str, default: u64| -> u64 {
            get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        };

        let backend_url = get("BACKEND_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or(defaults.backend_url);
        let socket_url = get("SOCKET_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| backend_url.clone());

        Self {
            backend_url,
            socket_url,
            notification_poll_secs: get_u64("NOTIFICATION_POLL_SECS", defaults.notification_poll_secs),
            user_notification_poll_secs: get_u64(
                "USER_NOTIFICATION_POLL_SECS",
                defaults.user_notification_poll_secs,
            ),
            sensor_backfill: get("SENSOR_BACKFILL")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.sensor_backfill),
        }
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored.  A missing file
/// yields the defaults.
pub fn load(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(ClientConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let config = ClientConfig::from_map(&parse_conf(&text));
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conf() {
        let text = r#"
# comment
BACKEND_URL="https://water.example.org/"
NOTIFICATION_POLL_SECS=45
SENSOR_BACKFILL=0
UNRELATED=1
"#;
        let map = parse_conf(text);
        assert_eq!(map["BACKEND_URL"], "https://water.example.org/");
        let c = ClientConfig::from_map(&map);
        assert_eq!(c.backend_url, "https://water.example.org");
        assert_eq!(c.socket_url, c.backend_url);
        assert_eq!(c.notification_poll_secs, 45);
        assert_eq!(c.user_notification_poll_secs, 5);
        assert!(!c.sensor_backfill);
    }

    #[test]
    fn test_poll_intervals() {
        let c = ClientConfig::default();
        assert_eq!(c.poll_interval(&NotificationScope::Admin), Duration::from_secs(30));
        assert_eq!(c.poll_interval(&NotificationScope::SuperAdmin), Duration::from_secs(30));
        assert_eq!(
            c.poll_interval(&NotificationScope::User("1".into())),
            Duration::from_secs(5)
        );
        let zero = ClientConfig { user_notification_poll_secs: 0, ..c };
        assert_eq!(zero.poll_interval(&NotificationScope::User("1".into())), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let c = load(Path::new("/nonexistent/hydrowatch.conf")).unwrap();
        assert_eq!(c, ClientConfig::default());
    }

    #[test]
    fn test_load_file() {
        let path = tempfile("SOCKET_URL=http://sockets:5001\n");
        let c = load(&path).unwrap();
        assert_eq!(c.socket_url, "http://sockets:5001");
        assert_eq!(c.backend_url, "http://localhost:5000");
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ClientConfig::resolve_path(Some("a.conf".into()), Some("b.conf".into())),
            PathBuf::from("a.conf")
        );
        assert_eq!(ClientConfig::resolve_path(None, Some("b.conf".into())), PathBuf::from("b.conf"));
        assert_eq!(
            ClientConfig::resolve_path(None, None),
            PathBuf::from(ClientConfig::default_path())
        );
    }

    fn tempfile(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("hydrowatch_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.conf");
        std::fs::write(&path, content).unwrap();
        path
    }
}
