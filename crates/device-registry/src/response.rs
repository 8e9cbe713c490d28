use crate::DispatchError;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes reported back to the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum ErrorCode {
    UnsupportedDeviceType = 1,
    DuplicateDevice = 2,
    UnknownDevice = 3,
    UnsupportedCommand = 4,
    InvalidConfig = 5,
    Driver = 6,
}

impl From<ErrorCode> for u8 {
    fn from(code: ErrorCode) -> u8 {
        code as u8
    }
}

impl TryFrom<u8> for ErrorCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::UnsupportedDeviceType),
            2 => Ok(Self::DuplicateDevice),
            3 => Ok(Self::UnknownDevice),
            4 => Ok(Self::UnsupportedCommand),
            5 => Ok(Self::InvalidConfig),
            6 => Ok(Self::Driver),
            other => Err(format!("unknown error code {other}")),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsupportedDeviceType => "unsupported device type",
            Self::DuplicateDevice => "duplicate device",
            Self::UnknownDevice => "unknown device",
            Self::UnsupportedCommand => "unsupported command",
            Self::InvalidConfig => "invalid config",
            Self::Driver => "driver error",
        };
        f.write_str(name)
    }
}

/// Failure details carried by a [`Response`]. Owned by whoever receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {}", .detail.as_deref().unwrap_or("no detail"))]
pub struct ErrorPayload {
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<&DispatchError> for ErrorPayload {
    fn from(err: &DispatchError) -> Self {
        let code = match err {
            DispatchError::UnsupportedDeviceType(_) => ErrorCode::UnsupportedDeviceType,
            DispatchError::DuplicateDevice(_) => ErrorCode::DuplicateDevice,
            DispatchError::UnknownDevice(_) => ErrorCode::UnknownDevice,
            DispatchError::UnsupportedCommand(_) => ErrorCode::UnsupportedCommand,
            DispatchError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            DispatchError::Driver(_) => ErrorCode::Driver,
        };
        Self {
            code,
            detail: Some(err.to_string()),
        }
    }
}

/// Outcome of one command. `ok` is true exactly when `error` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorPayload>,
}

impl Response {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failure(error: ErrorPayload) -> Self {
        Self {
            ok: false,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn error(&self) -> Option<&ErrorPayload> {
        self.error.as_ref()
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|e| e.code)
    }

    pub fn into_result(self) -> Result<(), ErrorPayload> {
        match self.error {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }
}

impl From<Result<(), DispatchError>> for Response {
    fn from(result: Result<(), DispatchError>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(err) => Self::failure(ErrorPayload::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motor_driver::{BusId, DriverError};

    #[test]
    fn success_has_no_error() {
        let resp = Response::from(Ok::<(), DispatchError>(()));
        assert!(resp.is_ok());
        assert_eq!(resp.code(), None);
        assert_eq!(serde_json::to_string(&resp).unwrap(), r#"{"ok":true}"#);
        assert!(resp.into_result().is_ok());
    }

    #[test]
    fn failures_map_to_codes() {
        let id = BusId::new(3).unwrap();
        let cases = [
            (DispatchError::UnsupportedDeviceType(9), ErrorCode::UnsupportedDeviceType),
            (DispatchError::DuplicateDevice(id), ErrorCode::DuplicateDevice),
            (DispatchError::UnknownDevice(id), ErrorCode::UnknownDevice),
            (DispatchError::UnsupportedCommand(0), ErrorCode::UnsupportedCommand),
            (DispatchError::invalid("motor.idle_mode", "unknown idle mode 7"), ErrorCode::InvalidConfig),
            (DispatchError::Driver(DriverError::Bus("timeout".into())), ErrorCode::Driver),
        ];
        for (err, code) in cases {
            let resp = Response::from(Err(err));
            assert!(!resp.is_ok());
            assert_eq!(resp.code(), Some(code));
        }
    }

    #[test]
    fn payload_detail_names_the_device() {
        let resp = Response::from(Err(DispatchError::DuplicateDevice(BusId::new(3).unwrap())));
        let payload = resp.into_result().unwrap_err();
        assert_eq!(payload.code, ErrorCode::DuplicateDevice);
        assert_eq!(payload.detail.as_deref(), Some("device 3 already exists"));
        assert_eq!(payload.to_string(), "duplicate device: device 3 already exists");
    }

    #[test]
    fn codes_serialize_as_numbers() {
        let payload = ErrorPayload {
            code: ErrorCode::UnknownDevice,
            detail: None,
        };
        let text = serde_json::to_string(&payload).unwrap();
        assert_eq!(text, r#"{"code":3}"#);
        let back: ErrorPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back, payload);
        assert!(serde_json::from_str::<ErrorPayload>(r#"{"code":42}"#).is_err());
    }
}
