pub mod lifecycle;
pub mod registry;
pub mod transport;
pub mod verification;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{Interaction, MockServiceEndpoint, WriteMode};
pub use crate::domain::ports::{ControlMethod, ControlTransport};
pub use crate::utils::error::Result;
