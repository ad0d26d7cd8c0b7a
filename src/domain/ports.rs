use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMethod {
    Get,
    Post,
    Delete,
}

impl ControlMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMethod::Get => "GET",
            ControlMethod::Post => "POST",
            ControlMethod::Delete => "DELETE",
        }
    }

    /// 只有 POST 帶 body
    pub fn carries_body(&self) -> bool {
        matches!(self, ControlMethod::Post)
    }
}

impl fmt::Display for ControlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 送往 mock service 的控制請求。2xx 為成功，其餘回傳 `ControlError::Protocol` 並保留原始回應內容。
#[async_trait]
pub trait ControlTransport: Send + Sync {
    async fn send(&self, method: ControlMethod, path: &str, payload: Option<&Value>) -> Result<()>;
}
