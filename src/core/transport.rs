use crate::domain::ports::{ControlMethod, ControlTransport};
use crate::utils::error::{ControlError, Result, TransportFailure};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// 標示控制平面請求的標頭
pub const MOCK_SERVICE_HEADER: &str = "X-Pact-Mock-Service";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// 只套用在這個 client 上，不影響行程內其他連線
    pub accept_invalid_certs: bool,
    pub http2_prior_knowledge: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            accept_invalid_certs: true,
            http2_prior_knowledge: false,
        }
    }
}

/// 以 reqwest 實作的控制請求傳輸層
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, settings: &TransportSettings) -> Result<Self> {
        let base_url = base_url.into();
        validate_url("base_url", &base_url)?;

        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .danger_accept_invalid_certs(settings.accept_invalid_certs);
        if settings.http2_prior_knowledge {
            builder = builder.http2_prior_knowledge();
        }

        let client = builder.build().map_err(|e| ControlError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn transport_error(method: ControlMethod, url: &str, e: reqwest::Error) -> ControlError {
    let kind = if e.is_timeout() {
        TransportFailure::Timeout
    } else if e.is_connect() {
        TransportFailure::Connect
    } else {
        TransportFailure::Other
    };

    ControlError::Transport {
        method: method.to_string(),
        url: url.to_string(),
        kind,
        message: e.to_string(),
    }
}

#[async_trait]
impl ControlTransport for HttpTransport {
    async fn send(&self, method: ControlMethod, path: &str, payload: Option<&Value>) -> Result<()> {
        let url = self.url(path);

        let mut request = match method {
            ControlMethod::Get => self.client.get(&url),
            ControlMethod::Post => self.client.post(&url),
            ControlMethod::Delete => self.client.delete(&url),
        }
        .header(MOCK_SERVICE_HEADER, "true")
        .header(CONTENT_TYPE, "application/json");

        if method.carries_body() {
            let body = serde_json::to_vec(payload.unwrap_or(&Value::Null))?;
            request = request.body(body);
        }

        tracing::debug!("📡 {} {}", method, url);
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(method, &url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(method, &url, e))?;
        tracing::debug!("📡 {} {} -> {}", method, url, status);

        if !status.is_success() {
            return Err(ControlError::Protocol {
                operation: format!("{} {}", method, path),
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
