use crate::error::{MtError, MtResult};
use std::fmt;
use std::time::Duration;
use tree_translate::Dialect;

pub const APPID_VAR: &str = "TREE_TRANSLATE_APPID";
pub const API_KEY_VAR: &str = "TREE_TRANSLATE_API_KEY";
pub const PROXY_URL_VAR: &str = "TREE_TRANSLATE_PROXY_URL";
pub const TIMEOUT_VAR: &str = "TREE_TRANSLATE_TIMEOUT_MS";

/// Connection settings for the translation proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub appid: String,
    pub api_key: String,
    pub proxy_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub const DEFAULT_PROXY_URL: &'static str = "http://localhost:4500/api/translation/translate";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

    /// Create a config for the default proxy.
    ///
    /// Both credentials must be non-blank.
    pub fn new(appid: impl Into<String>, api_key: impl Into<String>) -> MtResult<Self> {
        let appid = appid.into();
        let api_key = api_key.into();
        if appid.trim().is_empty() || api_key.trim().is_empty() {
            return Err(MtError::Config(
                "APP ID and API key must both be set".to_string(),
            ));
        }

        Ok(GatewayConfig {
            appid,
            api_key,
            proxy_url: Self::DEFAULT_PROXY_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = proxy_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read the config from `TREE_TRANSLATE_*` environment variables.
    ///
    /// `TREE_TRANSLATE_APPID` and `TREE_TRANSLATE_API_KEY` are required;
    /// `TREE_TRANSLATE_PROXY_URL` and `TREE_TRANSLATE_TIMEOUT_MS` are optional.
    pub fn from_env() -> MtResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> MtResult<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    MtError::Config(format!("{} environment variable not set", name))
                })
        };
        let mut config = Self::new(required(APPID_VAR)?, required(API_KEY_VAR)?)?;

        if let Some(url) = lookup(PROXY_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config = config.with_proxy_url(url);
        }
        if let Some(timeout) = lookup(TIMEOUT_VAR) {
            let millis = timeout.trim().parse::<u64>().map_err(|_| {
                MtError::Config(format!(
                    "{} must be a number of milliseconds, got '{}'",
                    TIMEOUT_VAR, timeout
                ))
            })?;
            config = config.with_timeout(Duration::from_millis(millis));
        }

        Ok(config)
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("appid", &self.appid)
            .field("api_key", &"***")
            .field("proxy_url", &self.proxy_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// How strings are grouped into gateway calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of strings per call
    pub chunk_size: usize,
    /// Wait before every call but the first
    pub pace: Duration,
    /// Maximum characters in one newline-joined query
    pub max_query_chars: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            chunk_size: 10,
            pace: Duration::from_millis(300),
            max_query_chars: 6000,
        }
    }
}

impl BatchOptions {
    /// Defaults with the chunk size used for `dialect`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        BatchOptions::default().with_chunk_size(dialect.default_chunk_size())
    }

    /// Chunk size, at least 1
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    pub fn with_max_query_chars(mut self, max_query_chars: usize) -> Self {
        self.max_query_chars = max_query_chars.max(1);
        self
    }
}
