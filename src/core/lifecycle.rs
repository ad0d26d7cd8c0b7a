use crate::core::registry::InteractionRegistry;
use crate::core::transport::{HttpTransport, TransportSettings};
use crate::core::verification::VerificationClient;
use crate::core::writer::ContractWriter;
use crate::domain::model::{Interaction, MockServiceEndpoint};
use crate::domain::ports::ControlTransport;
use crate::utils::error::{ControlError, Result};
use crate::utils::retry::RetryPolicy;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard};

/// 單一測試案例的生命週期狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Cleared,
    Registering,
    Exercising,
    Verified,
    VerifyFailed,
    Written,
    WriteFailed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Cleared => "cleared",
            LifecycleState::Registering => "registering",
            LifecycleState::Exercising => "exercising",
            LifecycleState::Verified => "verified",
            LifecycleState::VerifyFailed => "verify-failed",
            LifecycleState::Written => "written",
            LifecycleState::WriteFailed => "write-failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct LifecycleReport {
    pub interactions: usize,
    pub state: LifecycleState,
    pub duration: Duration,
}

/// 一個 mock service 端點的控制代理。
///
/// 複製出來的 handle 共用同一把鎖，因此同一端點上的生命週期序列不會交錯。
pub struct MockService<T: ControlTransport> {
    endpoint: Arc<MockServiceEndpoint>,
    transport: Arc<T>,
    retry: RetryPolicy,
    lock: Arc<Mutex<()>>,
}

impl<T: ControlTransport> Clone for MockService<T> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
            transport: Arc::clone(&self.transport),
            retry: self.retry.clone(),
            lock: Arc::clone(&self.lock),
        }
    }
}

impl MockService<HttpTransport> {
    pub fn connect(
        endpoint: MockServiceEndpoint,
        settings: &TransportSettings,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let transport = HttpTransport::new(endpoint.base_url.clone(), settings)?;
        Ok(Self::new(endpoint, transport).with_retry(retry))
    }
}

impl<T: ControlTransport> MockService<T> {
    pub fn new(endpoint: MockServiceEndpoint, transport: T) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            transport: Arc::new(transport),
            retry: RetryPolicy::default(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &MockServiceEndpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 取得端點的鎖，回傳的 session 存活期間其他序列會等待
    pub async fn session(&self) -> LifecycleSession<'_, T> {
        let guard = self.lock.lock().await;
        tracing::debug!("🔒 Acquired mock service session for {}", self.endpoint.base_url);
        LifecycleSession {
            service: self,
            _guard: guard,
            state: LifecycleState::Idle,
            registered: 0,
        }
    }

    /// Clear → Add* → exercise → Verify → Write，第一個失敗即中止並回傳該錯誤
    pub async fn run<F, Fut, E>(
        &self,
        interactions: &[Interaction],
        exercise: F,
    ) -> Result<LifecycleReport>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: fmt::Display,
    {
        let started = Instant::now();
        let mut session = self.session().await;

        session.clear_all().await.map_err(|e| abort("clear", e))?;
        session
            .add_all(interactions)
            .await
            .map_err(|e| abort("register", e))?;
        session
            .exercise(exercise)
            .await
            .map_err(|e| abort("exercise", e))?;
        session.verify().await.map_err(|e| abort("verify", e))?;
        session
            .write_contract()
            .await
            .map_err(|e| abort("write", e))?;

        let report = LifecycleReport {
            interactions: session.registered(),
            state: session.state(),
            duration: started.elapsed(),
        };
        tracing::info!(
            "✅ Lifecycle completed: {} interactions verified and written in {:?}",
            report.interactions,
            report.duration
        );
        Ok(report)
    }

    /// 對已註冊的 interactions 執行測試後驗證並寫出 pact
    pub async fn verify_and_write<F, Fut, E>(&self, exercise: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: fmt::Display,
    {
        let mut session = self.session().await;
        session
            .exercise(exercise)
            .await
            .map_err(|e| abort("exercise", e))?;
        session.verify().await.map_err(|e| abort("verify", e))?;
        session
            .write_contract()
            .await
            .map_err(|e| abort("write", e))
    }
}

fn abort(stage: &str, e: ControlError) -> ControlError {
    tracing::error!("❌ Lifecycle aborted at {}: {}", stage, e);
    e
}

/// 持有端點鎖的生命週期序列
pub struct LifecycleSession<'a, T: ControlTransport> {
    service: &'a MockService<T>,
    _guard: MutexGuard<'a, ()>,
    state: LifecycleState,
    registered: usize,
}

impl<'a, T: ControlTransport> LifecycleSession<'a, T> {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn registered(&self) -> usize {
        self.registered
    }

    fn registry(&self) -> InteractionRegistry<'a, T> {
        InteractionRegistry::new(self.service.transport.as_ref(), &self.service.retry)
    }

    pub async fn clear_all(&mut self) -> Result<()> {
        self.registry().clear_all().await?;
        self.state = LifecycleState::Cleared;
        self.registered = 0;
        Ok(())
    }

    pub async fn add(&mut self, interaction: &Interaction) -> Result<()> {
        if !matches!(
            self.state,
            LifecycleState::Cleared | LifecycleState::Registering
        ) {
            return Err(ControlError::validation(format!(
                "Interactions must be cleared before registering (session is {})",
                self.state
            )));
        }

        self.registry().add(interaction).await?;
        self.state = LifecycleState::Registering;
        self.registered += 1;
        Ok(())
    }

    pub async fn add_all(&mut self, interactions: &[Interaction]) -> Result<usize> {
        for interaction in interactions {
            self.add(interaction).await?;
        }
        Ok(interactions.len())
    }

    /// 執行 consumer 測試本身，錯誤轉成 `ControlError::Exercise`
    pub async fn exercise<F, Fut, E>(&mut self, exercise: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: fmt::Display,
    {
        self.state = LifecycleState::Exercising;
        exercise().await.map_err(|e| ControlError::Exercise {
            message: e.to_string(),
        })
    }

    pub async fn verify(&mut self) -> Result<()> {
        let result = VerificationClient::new(self.service.transport.as_ref(), &self.service.retry)
            .verify()
            .await;
        self.state = if result.is_ok() {
            LifecycleState::Verified
        } else {
            LifecycleState::VerifyFailed
        };
        result
    }

    pub async fn write_contract(&mut self) -> Result<()> {
        let result = ContractWriter::new(
            self.service.transport.as_ref(),
            &self.service.retry,
            &self.service.endpoint,
        )
        .write_contract()
        .await;
        self.state = if result.is_ok() {
            LifecycleState::Written
        } else {
            LifecycleState::WriteFailed
        };
        result
    }
}
