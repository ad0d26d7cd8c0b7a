use thiserror::Error;

/// 網路層失敗的種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFailure {
    Connect,
    Timeout,
    Other,
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportFailure::Connect => write!(f, "connect"),
            TransportFailure::Timeout => write!(f, "timeout"),
            TransportFailure::Other => write!(f, "other"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Transport error ({kind}) on {method} {url}: {message}")]
    Transport {
        method: String,
        url: String,
        kind: TransportFailure,
        message: String,
    },

    #[error("{operation} failed with status {status}: {body}")]
    Protocol {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("Exercise failed: {message}")]
    Exercise { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl ControlError {
    pub fn validation(message: impl Into<String>) -> Self {
        ControlError::ValidationError {
            message: message.into(),
        }
    }

    /// 回傳給使用者的原始診斷訊息。
    ///
    /// Protocol 錯誤回傳 mock service 的回應內容，不做任何摘要。
    pub fn detail(&self) -> String {
        match self {
            ControlError::Protocol { body, .. } => body.clone(),
            ControlError::ValidationError { message }
            | ControlError::Exercise { message }
            | ControlError::ConfigError { message } => message.clone(),
            ControlError::Transport { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// 啟動競態 (mock service 尚未監聽) 時可重試
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ControlError::Transport {
                kind: TransportFailure::Connect | TransportFailure::Timeout,
                ..
            }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ControlError::ValidationError { .. } => {
                "Set both consumer and provider names and make sure interactions are cleared before registering"
            }
            ControlError::Transport { .. } => {
                "Check that the mock service is running and reachable at the configured base URL"
            }
            ControlError::Protocol { .. } => {
                "Read the mock service diagnostic above; it lists missing or unexpected interactions"
            }
            ControlError::Exercise { .. } => "Fix the consumer code under test and re-run",
            ControlError::IoError(_) => "Check file paths and permissions",
            ControlError::SerializationError(_) => "Check the interaction JSON for syntax errors",
            ControlError::ConfigError { .. }
            | ControlError::InvalidConfigValueError { .. }
            | ControlError::MissingConfigError { .. } => "Review the configuration file and CLI flags",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ControlError::Protocol { .. } | ControlError::Exercise { .. } => 1,
            ControlError::Transport { .. } => 2,
            _ => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_detail_is_verbatim_body() {
        let body = "Missing requests:\n\tGET /foobar\n".to_string();
        let err = ControlError::Protocol {
            operation: "verify".to_string(),
            status: 500,
            body: body.clone(),
        };

        assert_eq!(err.detail(), body);
        assert!(err.to_string().contains("status 500"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_transport_retryability() {
        let connect = ControlError::Transport {
            method: "GET".to_string(),
            url: "http://localhost:1/interactions/verification".to_string(),
            kind: TransportFailure::Connect,
            message: "connection refused".to_string(),
        };
        let other = ControlError::Transport {
            method: "GET".to_string(),
            url: "http://localhost:1/interactions/verification".to_string(),
            kind: TransportFailure::Other,
            message: "bad response".to_string(),
        };

        assert!(connect.is_retryable());
        assert!(!other.is_retryable());
        assert_eq!(connect.exit_code(), 2);
    }

    #[test]
    fn test_validation_is_not_retryable() {
        let err = ControlError::validation("Consumer and Provider name need to be provided");
        assert!(!err.is_retryable());
        assert_eq!(err.detail(), "Consumer and Provider name need to be provided");
    }
}
