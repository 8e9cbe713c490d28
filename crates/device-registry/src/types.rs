use crate::DispatchError;
use motor_driver::BusId;
use serde::{Deserialize, Serialize};

/// Device type addressed by a command, as tagged on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    SparkMax,
    NavX,
    XboxController,
}

impl DeviceType {
    pub const ALL: [DeviceType; 3] = [Self::SparkMax, Self::NavX, Self::XboxController];

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::SparkMax),
            1 => Some(Self::NavX),
            2 => Some(Self::XboxController),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::SparkMax => 0,
            Self::NavX => 1,
            Self::XboxController => 2,
        }
    }
}

/// Command kind, as tagged on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    SetPosition,
    SetVelocity,
    SetOutput,
    Configure,
    Create,
}

impl CommandKind {
    pub const ALL: [CommandKind; 5] = [
        Self::SetPosition,
        Self::SetVelocity,
        Self::SetOutput,
        Self::Configure,
        Self::Create,
    ];

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::SetPosition),
            1 => Some(Self::SetVelocity),
            2 => Some(Self::SetOutput),
            3 => Some(Self::Configure),
            4 => Some(Self::Create),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            Self::SetPosition => 0,
            Self::SetVelocity => 1,
            Self::SetOutput => 2,
            Self::Configure => 3,
            Self::Create => 4,
        }
    }
}

/// Device address as it arrives from the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RawDevice {
    pub kind: u8,
    pub id: u8,
}

/// Command record as produced by the control plane.
///
/// `payload` is opaque until the registry owning `device.kind` decodes it
/// for the specific `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RawCommand {
    pub device: RawDevice,
    pub kind: u8,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A single addressable controller on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceRef {
    pub kind: DeviceType,
    pub id: BusId,
}

/// A command with its tags resolved. Borrowed for the length of one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct CommandEnvelope<'a> {
    pub device: DeviceRef,
    pub kind: CommandKind,
    pub payload: &'a serde_json::Value,
}

impl<'a> CommandEnvelope<'a> {
    /// Resolve the command kind and bus id of `raw`, already routed to `kind`.
    pub fn decode(kind: DeviceType, raw: &'a RawCommand) -> Result<Self, DispatchError> {
        let command =
            CommandKind::from_tag(raw.kind).ok_or(DispatchError::UnsupportedCommand(raw.kind))?;
        let id = BusId::new(raw.device.id).ok_or_else(|| {
            DispatchError::invalid(
                "device.id",
                format!("bus id {} is out of range", raw.device.id),
            )
        })?;
        Ok(Self {
            device: DeviceRef { kind, id },
            kind: command,
            payload: &raw.payload,
        })
    }
}
