//! HTTP translation proxy gateway
//!
//! The proxy signs requests for the upstream provider on our behalf. Each call is a
//! JSON POST of `{query, from, to, appid, apiKey}`; the proxy answers with
//!
//! ```json
//! {"success": true, "data": {"trans_result": [{"src": "Hello", "dst": "你好"}]}}
//! ```
//!
//! or, on failure, `{"success": false, "error": {"code": "54003", "message": "..."}}`.
//!
//! # Configuration
//!
//! [`ProxyGateway::from_env`] reads `TREE_TRANSLATE_APPID`, `TREE_TRANSLATE_API_KEY`,
//! and optionally `TREE_TRANSLATE_PROXY_URL` and `TREE_TRANSLATE_TIMEOUT_MS`.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayErrorKind, MtError, MtResult};
use crate::gateway::TranslationGateway;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway posting to a translation proxy over HTTP
#[derive(Clone)]
pub struct ProxyGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    query: &'a str,
    from: &'a str,
    to: &'a str,
    appid: &'a str,
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

#[derive(Deserialize, Debug, Default)]
struct ProxyResponse {
    #[serde(default)]
    success: bool,
    data: Option<ProxyData>,
    error: Option<ProxyFailure>,
}

#[derive(Deserialize, Debug, Default)]
struct ProxyData {
    #[serde(default)]
    trans_result: Vec<TranslatedLine>,
}

#[derive(Deserialize, Debug)]
struct TranslatedLine {
    dst: String,
}

#[derive(Deserialize, Debug)]
struct ProxyFailure {
    /// Sent as a string by the proxy, as a number by some providers
    code: Option<Value>,
    message: Option<String>,
}

impl ProxyFailure {
    fn code(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(code)) => Some(code.clone()),
            Some(Value::Number(code)) => Some(code.to_string()),
            _ => None,
        }
    }

    fn into_error(self) -> GatewayError {
        let code = self.code();
        let message = self
            .message
            .unwrap_or_else(|| "Translation request failed".to_string());
        match code {
            Some(code) => GatewayError::from_provider(code, message),
            None => GatewayError::new(GatewayErrorKind::Provider, message),
        }
    }
}

impl ProxyGateway {
    pub fn new(config: GatewayConfig) -> MtResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MtError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a gateway from `TREE_TRANSLATE_*` environment variables
    pub fn from_env() -> MtResult<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Turn a proxy reply into translated lines or a classified error.
fn parse_response(response: ProxyResponse) -> Result<Vec<String>, GatewayError> {
    if let Some(failure) = response.error {
        return Err(failure.into_error());
    }
    if !response.success {
        return Err(GatewayError::new(
            GatewayErrorKind::Provider,
            "Translation request failed",
        ));
    }

    let lines: Vec<String> = response
        .data
        .unwrap_or_default()
        .trans_result
        .into_iter()
        .map(|line| line.dst)
        .collect();
    if lines.is_empty() {
        return Err(GatewayError::empty_result());
    }
    Ok(lines)
}

/// Error for a non-2xx reply. A status with a known meaning decides the kind; otherwise a
/// provider code in the body does.
fn status_error(status: u16, body: &str) -> GatewayError {
    let failure = serde_json::from_str::<ProxyResponse>(body)
        .ok()
        .and_then(|response| response.error);

    let mut error = match failure {
        Some(failure) => failure.into_error(),
        None => GatewayError::new(
            GatewayErrorKind::Provider,
            format!("Proxy returned HTTP {}", status),
        ),
    };
    if let Some(kind) = GatewayErrorKind::from_status(status) {
        error.kind = kind;
    }
    error
}

impl std::fmt::Debug for ProxyGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyGateway")
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl TranslationGateway for ProxyGateway {
    async fn translate_batch(
        &self,
        query: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<String>, GatewayError> {
        let body = ProxyRequest {
            query,
            from,
            to,
            appid: &self.config.appid,
            api_key: &self.config.api_key,
        };

        tracing::debug!(from, to, query_len = query.len(), "Sending translation request");
        let response = self
            .client
            .post(&self.config.proxy_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }

        let reply: ProxyResponse = response.json().await.map_err(|e| {
            GatewayError::new(
                GatewayErrorKind::Provider,
                format!("Failed to parse proxy response: {}", e),
            )
        })?;
        parse_response(reply)
    }

    fn provider_name(&self) -> &str {
        "Translation proxy"
    }
}
