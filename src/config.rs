use log::{info, warn};
use std::env;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://api.prepmate.app/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Runtime configuration for the backend gateway, loaded from the
/// environment. A `.env` file is honored when present.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Best-effort .env load for development; ignored when absent.
        let _ = dotenvy::dotenv();

        let api_base_url = env::var("PREPMATE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let auth_token = env::var("PREPMATE_AUTH_TOKEN").ok().filter(|t| !t.is_empty());
        if auth_token.is_none() {
            warn!("PREPMATE_AUTH_TOKEN not set - authenticated operations will be rejected by the backend");
        }

        let request_timeout = read_secs("PREPMATE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS);
        let connect_timeout = read_secs("PREPMATE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS);

        info!(
            "Configuration loaded: api_base_url={} request_timeout={}s",
            api_base_url,
            request_timeout.as_secs()
        );

        AppConfig {
            api_base_url,
            auth_token,
            request_timeout,
            connect_timeout,
        }
    }

    pub fn with_auth_token(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

fn read_secs(key: &str, default: u64) -> Duration {
    match env::var(key) {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!("Ignoring invalid {}: {:?}", key, raw);
                Duration::from_secs(default)
            }
        },
        Err(_) => Duration::from_secs(default),
    }
}
