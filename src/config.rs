use std::net::SocketAddr;

/// Values shipped in `.env` templates that must never be sent to the provider.
pub const PLACEHOLDER_KEYS: &[&str] = &["tu_api_key_aqui", "your_api_key_here", "DEMO_KEY"];

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Provider credential as read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Configured(String),
    Unconfigured,
}

impl Credential {
    /// Treats absent, blank and placeholder values alike.
    pub fn from_raw(raw: Option<String>) -> Self {
        match raw {
            Some(key) => {
                let key = key.trim();
                if key.is_empty() || PLACEHOLDER_KEYS.contains(&key) {
                    Credential::Unconfigured
                } else {
                    Credential::Configured(key.to_string())
                }
            }
            None => Credential::Unconfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Credential::Configured(_))
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Credential::Configured(key) => Some(key),
            Credential::Unconfigured => None,
        }
    }

    /// First few characters only, for start-up logs.
    pub fn masked(&self) -> String {
        match self {
            Credential::Configured(key) => {
                let prefix: String = key.chars().take(10).collect();
                format!("{}...", prefix)
            }
            Credential::Unconfigured => "<unconfigured>".to_string(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&self.masked()).finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    pub api_base: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = Credential::from_raw(lookup("ANTHROPIC_API_KEY"));
        let api_base = lookup("ANTHROPIC_API_BASE")
            .map(|v| v.trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let port = lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080);
        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Self { credential, api_base, port, max_upload_bytes }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
