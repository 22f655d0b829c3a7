// Gateway — Configuration
// GatewayConfig, from_env / from_lookup, browser profile path

use crate::atoms::constants::{
    BIND_ADDRESS, CLIENT_ID, DEFAULT_PORT, LOCAL_SESSION_DIR, TEMP_SESSION_DIR,
};
use crate::engine::whatsapp::browser::BrowserOptions;
use crate::engine::whatsapp::reconnect::ReconnectPolicy;
use log::warn;
use std::path::PathBuf;

// ── Environment keys ───────────────────────────────────────────────────

const ENV_PORT: &str = "PORT";
const ENV_TEMP: &str = "TEMP";
const ENV_BROWSER_PATH: &str = "PUPPETEER_EXECUTABLE_PATH";

// ── Config Struct ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// HTTP listen port (default: 3001)
    pub port: u16,
    /// Address to bind — all interfaces by default
    pub bind_address: String,
    /// Root directory the WhatsApp session profile is stored under
    pub session_path: PathBuf,
    /// Identifies the browser profile inside `session_path`
    pub client_id: String,
    /// Chrome/Chromium binary override; autodetected when unset
    pub browser_executable: Option<PathBuf>,
    pub reconnect: ReconnectPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            port: DEFAULT_PORT,
            bind_address: BIND_ADDRESS.into(),
            session_path: local_session_path(),
            client_id: CLIENT_ID.into(),
            browser_executable: None,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Read `PORT`, `TEMP` and `PUPPETEER_EXECUTABLE_PATH` from the process
    /// environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get(ENV_PORT) {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|e| {
                warn!("[config] Ignoring {}={:?} ({}), using {}", ENV_PORT, raw, e, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let session_path = match get(ENV_TEMP) {
            Some(temp) => PathBuf::from(temp).join(TEMP_SESSION_DIR),
            None => local_session_path(),
        };

        GatewayConfig {
            port,
            session_path,
            browser_executable: get(ENV_BROWSER_PATH).map(PathBuf::from),
            ..GatewayConfig::default()
        }
    }

    /// `host:port` string for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Browser profile directory for this client: `<session>/session-<id>`.
    pub fn profile_dir(&self) -> PathBuf {
        self.session_path.join(format!("session-{}", self.client_id))
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            profile_dir: self.profile_dir(),
            executable: self.browser_executable.clone(),
        }
    }
}

fn local_session_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(LOCAL_SESSION_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> GatewayConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_with(&[]);
        assert_eq!(config.port, 3001);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert!(config.session_path.ends_with(".wwebjs_auth"));
        assert!(config.browser_executable.is_none());
    }

    #[test]
    fn port_is_read_from_env() {
        assert_eq!(config_with(&[("PORT", "8080")]).port, 8080);
        assert_eq!(config_with(&[("PORT", "")]).port, 3001);
    }

    #[test]
    fn malformed_port_falls_back_to_default() {
        assert_eq!(config_with(&[("PORT", "eighty")]).port, 3001);
        assert_eq!(config_with(&[("PORT", "70000")]).port, 3001);
    }

    #[test]
    fn temp_dir_hosts_the_session() {
        let config = config_with(&[("TEMP", "/var/tmp")]);
        assert_eq!(config.session_path, PathBuf::from("/var/tmp/ssi_whatsapp_auth"));
        assert_eq!(
            config.profile_dir(),
            PathBuf::from("/var/tmp/ssi_whatsapp_auth/session-ssi-session")
        );
    }

    #[test]
    fn browser_override_is_passed_through() {
        let config = config_with(&[("PUPPETEER_EXECUTABLE_PATH", "/usr/bin/chromium")]);
        let options = config.browser_options();
        assert_eq!(options.executable, Some(PathBuf::from("/usr/bin/chromium")));
        assert!(options.profile_dir.ends_with("session-ssi-session"));
    }

    #[test]
    fn listen_addr_joins_host_and_port() {
        let config = config_with(&[("PORT", "4000")]);
        assert_eq!(config.listen_addr(), "0.0.0.0:4000");
    }
}
