use crate::BusId;
use thiserror::Error;

pub type Result<T, E = DriverError> = core::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("failed to construct controller {0}: {1}")]
    Construct(BusId, String),
    #[error("failed to configure controller {0}: {1}")]
    Configure(BusId, String),
    #[error("bus error: {0}")]
    Bus(String),
}
