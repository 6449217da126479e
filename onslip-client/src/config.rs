//! Client configuration

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://test.onslip360.com/v1/";

/// Client configuration for connecting to the Onslip 360 API
#[derive(Clone)]
pub struct ClientConfig {
    /// API root (e.g., "https://test.onslip360.com/v1/")
    pub base_url: String,

    /// Account realm, the first path segment of every resource
    pub realm: String,

    /// Hawk key identifier
    pub key_id: String,

    /// Hawk key, base64 encoded
    pub key: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client configuration without credentials
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            realm: String::new(),
            key_id: String::new(),
            key: String::new(),
            timeout: 30,
            user_agent: format!("onslip-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set realm and Hawk credentials
    pub fn with_credentials(
        mut self,
        realm: impl Into<String>,
        key_id: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        self.realm = realm.into();
        self.key_id = key_id.into();
        self.key = key.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Whether realm and key are set
    pub fn has_credentials(&self) -> bool {
        !self.realm.is_empty() && !self.key_id.is_empty() && !self.key.is_empty()
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> crate::ClientResult<super::HttpClient> {
        super::HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

// Keep the key out of logs
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("realm", &self.realm)
            .field("key_id", &self.key_id)
            .field("key", &"***")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
