use onslip_client::ClientConfig;
use onslip_client::config::DEFAULT_BASE_URL;
use shared::naming::TABLE_NAME_PREFIX;

/// Editor configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ONSLIP_BASE_URL | https://test.onslip360.com/v1/ | API root |
/// | ONSLIP_REALM | (empty) | account realm |
/// | ONSLIP_KEY_ID | (empty) | Hawk key identifier |
/// | ONSLIP_KEY | (empty) | base64 Hawk key |
/// | ONSLIP_USER_AGENT | floor-editor/<version> | user agent |
/// | REQUEST_TIMEOUT_SECS | 30 | request timeout |
/// | LOG_LEVEL | info | max log level |
/// | LOG_DIR | (unset) | rolling log directory |
/// | TABLE_NAME_PREFIX | T- | prefix of generated table names |
///
/// # Example
///
/// ```ignore
/// ONSLIP_REALM=demo ONSLIP_KEY_ID=key:admin@demo ONSLIP_KEY=... floor states list
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub realm: String,
    pub key_id: String,
    pub key: String,
    pub user_agent: String,
    /// Request timeout (seconds)
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub table_name_prefix: String,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ONSLIP_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            realm: std::env::var("ONSLIP_REALM").unwrap_or_default(),
            key_id: std::env::var("ONSLIP_KEY_ID").unwrap_or_default(),
            key: std::env::var("ONSLIP_KEY").unwrap_or_default(),
            user_agent: std::env::var("ONSLIP_USER_AGENT")
                .unwrap_or_else(|_| format!("floor-editor/{}", env!("CARGO_PKG_VERSION"))),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            table_name_prefix: std::env::var("TABLE_NAME_PREFIX")
                .unwrap_or_else(|_| TABLE_NAME_PREFIX.into()),
        }
    }

    /// Whether realm and Hawk credentials are all set
    pub fn has_credentials(&self) -> bool {
        self.client_config().has_credentials()
    }

    /// Client settings for the POS connection
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone())
            .with_credentials(self.realm.clone(), self.key_id.clone(), self.key.clone())
            .with_timeout(self.request_timeout_secs)
            .with_user_agent(self.user_agent.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
