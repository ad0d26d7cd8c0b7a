use crate::domain::model::{MockServiceEndpoint, PactFileRequest};
use crate::domain::ports::{ControlMethod, ControlTransport};
use crate::utils::error::{ControlError, Result};
use crate::utils::retry::RetryPolicy;

pub const PACT_PATH: &str = "/pact";

/// 要求 mock service 將目前的 interactions 寫成 pact 檔案。
/// 合併或取代由 mock service 依寫入模式處理。
pub struct ContractWriter<'a, T: ControlTransport> {
    transport: &'a T,
    retry: &'a RetryPolicy,
    endpoint: &'a MockServiceEndpoint,
}

impl<'a, T: ControlTransport> ContractWriter<'a, T> {
    pub fn new(transport: &'a T, retry: &'a RetryPolicy, endpoint: &'a MockServiceEndpoint) -> Self {
        Self {
            transport,
            retry,
            endpoint,
        }
    }

    pub async fn write_contract(&self) -> Result<()> {
        tracing::debug!("📝 mock service write pact");

        // 名稱檢查在本地完成，不發出任何請求
        if self.endpoint.consumer.trim().is_empty() || self.endpoint.provider.trim().is_empty() {
            return Err(ControlError::validation(
                "Consumer and Provider name need to be provided",
            ));
        }

        let request = PactFileRequest::from_endpoint(self.endpoint);
        let payload = serde_json::to_value(&request)?;

        self.retry
            .run("write pact", || {
                self.transport.send(ControlMethod::Post, PACT_PATH, Some(&payload))
            })
            .await?;

        tracing::info!(
            "📝 Pact written for {} -> {} ({})",
            request.consumer.name,
            request.provider.name,
            request.pact_file_write_mode
        );
        Ok(())
    }
}
