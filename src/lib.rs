pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::MockServiceConfig;

pub use core::lifecycle::{LifecycleReport, LifecycleSession, LifecycleState, MockService};
pub use core::transport::{HttpTransport, TransportSettings};
pub use domain::model::{
    Interaction, InteractionRequest, InteractionResponse, Matcher, MockServiceEndpoint, WriteMode,
};
pub use utils::error::{ControlError, Result};
pub use utils::retry::RetryPolicy;
