use crate::domain::model::Interaction;
use crate::domain::ports::{ControlMethod, ControlTransport};
use crate::utils::error::Result;
use crate::utils::retry::RetryPolicy;

pub const INTERACTIONS_PATH: &str = "/interactions";

/// mock service 上的 interaction 集合
pub struct InteractionRegistry<'a, T: ControlTransport> {
    transport: &'a T,
    retry: &'a RetryPolicy,
}

impl<'a, T: ControlTransport> InteractionRegistry<'a, T> {
    pub fn new(transport: &'a T, retry: &'a RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// 清除 mock service 上所有 interactions。集合為空時也會成功。
    pub async fn clear_all(&self) -> Result<()> {
        tracing::debug!("🧹 mock service delete interactions");
        self.retry
            .run("delete interactions", || {
                self.transport
                    .send(ControlMethod::Delete, INTERACTIONS_PATH, None)
            })
            .await
    }

    pub async fn add(&self, interaction: &Interaction) -> Result<()> {
        tracing::debug!(
            "➕ mock service add interaction: {}",
            interaction.description
        );
        let payload = serde_json::to_value(interaction)?;
        self.retry
            .run("add interaction", || {
                self.transport
                    .send(ControlMethod::Post, INTERACTIONS_PATH, Some(&payload))
            })
            .await
    }

    /// 依序註冊，第一個失敗即停止。順序不會被重新排列。
    pub async fn add_all(&self, interactions: &[Interaction]) -> Result<usize> {
        for interaction in interactions {
            self.add(interaction).await?;
        }
        Ok(interactions.len())
    }
}
