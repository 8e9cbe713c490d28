use crate::DeviceType;
use motor_driver::{BusId, DriverError};
use thiserror::Error;

/// Failure of a single dispatched command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("unsupported device type (tag {0})")]
    UnsupportedDeviceType(u8),
    #[error("device {0} already exists")]
    DuplicateDevice(BusId),
    #[error("device {0} has not been created")]
    UnknownDevice(BusId),
    #[error("unsupported command (tag {0})")]
    UnsupportedCommand(u8),
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl DispatchError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Mistakes made while assembling a [`CommandRouter`](crate::CommandRouter).
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("a registry for {0:?} is already registered")]
    DuplicateRegistry(DeviceType),
}
