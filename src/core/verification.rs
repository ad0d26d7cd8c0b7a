use crate::domain::ports::{ControlMethod, ControlTransport};
use crate::utils::error::Result;
use crate::utils::retry::RetryPolicy;

pub const VERIFICATION_PATH: &str = "/interactions/verification";

pub struct VerificationClient<'a, T: ControlTransport> {
    transport: &'a T,
    retry: &'a RetryPolicy,
}

impl<'a, T: ControlTransport> VerificationClient<'a, T> {
    pub fn new(transport: &'a T, retry: &'a RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// 確認每個 interaction 都被呼叫過，且沒有非預期的請求。
    ///
    /// 失敗時 `ControlError::Protocol` 的 body 就是 mock service 的診斷內容，原樣回傳。
    pub async fn verify(&self) -> Result<()> {
        tracing::debug!("🔍 mock service verify");
        let result = self
            .retry
            .run("verify interactions", || {
                self.transport.send(ControlMethod::Get, VERIFICATION_PATH, None)
            })
            .await;

        if let Err(e) = &result {
            tracing::error!("❌ Verification failed: {}", e.detail());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::RecordingTransport;
    use crate::utils::error::ControlError;

    #[tokio::test]
    async fn test_verify_is_a_bodiless_get() {
        let transport = RecordingTransport::new();
        let retry = RetryPolicy::none();

        VerificationClient::new(&transport, &retry)
            .verify()
            .await
            .unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, ControlMethod::Get);
        assert_eq!(calls[0].path, VERIFICATION_PATH);
        assert!(calls[0].payload.is_none());
    }

    #[tokio::test]
    async fn test_verify_failure_detail_is_unmodified() {
        let diagnostic = "Missing requests:\n\tGET /foobar (A request to get foo)\n";
        let transport =
            RecordingTransport::new().fail_with(ControlMethod::Get, VERIFICATION_PATH, 500, diagnostic);
        let retry = RetryPolicy::none();

        let err = VerificationClient::new(&transport, &retry)
            .verify()
            .await
            .unwrap_err();

        assert!(matches!(err, ControlError::Protocol { .. }));
        assert_eq!(err.detail(), diagnostic);
    }
}
