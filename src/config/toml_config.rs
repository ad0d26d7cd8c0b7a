use crate::core::transport::TransportSettings;
use crate::domain::model::{MockServiceEndpoint, WriteMode};
use crate::utils::error::{ControlError, Result};
use crate::utils::retry::RetryPolicy;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockServiceConfig {
    pub mock_service: ServiceConfig,
    pub retry: Option<RetryConfig>,
    pub pact: Option<PactConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub connect_timeout_seconds: Option<u64>,
    pub accept_invalid_certs: Option<bool>,
    pub http2_prior_knowledge: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PactConfig {
    pub consumer: Option<String>,
    pub provider: Option<String>,
    pub pact_file_write_mode: Option<String>,
}

impl MockServiceConfig {
    /// 只有 base URL，其餘使用預設值
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            mock_service: ServiceConfig {
                base_url: base_url.into(),
                timeout_seconds: None,
                connect_timeout_seconds: None,
                accept_invalid_certs: None,
                http2_prior_knowledge: None,
            },
            retry: None,
            pact: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ControlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ControlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PACT_MOCK_PORT})，未定義的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ControlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("mock_service.base_url", &self.mock_service.base_url)?;

        if let Some(timeout) = self.mock_service.timeout_seconds {
            validate_positive_number("mock_service.timeout_seconds", timeout, 1)?;
        }
        if let Some(timeout) = self.mock_service.connect_timeout_seconds {
            validate_positive_number("mock_service.connect_timeout_seconds", timeout, 1)?;
        }
        if let Some(attempts) = self.retry.as_ref().and_then(|r| r.attempts) {
            validate_positive_number("retry.attempts", attempts as u64, 1)?;
        }

        // 名稱可以留空到寫入 pact 時才檢查，但有填就不能是空白
        if let Some(pact) = &self.pact {
            if let Some(consumer) = &pact.consumer {
                validate_non_empty_string("pact.consumer", consumer)?;
            }
            if let Some(provider) = &pact.provider {
                validate_non_empty_string("pact.provider", provider)?;
            }
        }
        self.write_mode()?;

        Ok(())
    }

    pub fn write_mode(&self) -> Result<Option<WriteMode>> {
        self.pact
            .as_ref()
            .and_then(|p| p.pact_file_write_mode.as_deref())
            .map(str::parse::<WriteMode>)
            .transpose()
    }

    pub fn endpoint(&self) -> Result<MockServiceEndpoint> {
        let pact = self.pact.clone().unwrap_or_default();
        Ok(MockServiceEndpoint {
            base_url: self.mock_service.base_url.clone(),
            consumer: pact.consumer.unwrap_or_default(),
            provider: pact.provider.unwrap_or_default(),
            write_mode: self.write_mode()?,
        })
    }

    pub fn transport_settings(&self) -> TransportSettings {
        let defaults = TransportSettings::default();
        let service = &self.mock_service;
        TransportSettings {
            timeout: service
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            connect_timeout: service
                .connect_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            accept_invalid_certs: service
                .accept_invalid_certs
                .unwrap_or(defaults.accept_invalid_certs),
            http2_prior_knowledge: service
                .http2_prior_knowledge
                .unwrap_or(defaults.http2_prior_knowledge),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        match &self.retry {
            Some(retry) => RetryPolicy::new(
                retry.attempts.unwrap_or(defaults.max_attempts),
                retry
                    .delay_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.delay),
            ),
            None => defaults,
        }
    }
}

impl Validate for MockServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
