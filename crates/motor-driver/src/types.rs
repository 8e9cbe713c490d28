use core::fmt;
use serde::{Deserialize, Serialize};

/// Highest CAN id a motor controller accepts.
pub const MAX_BUS_ID: u8 = 62;

/// Address of one controller on the shared control bus
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct BusId(u8);

impl BusId {
    pub fn new(id: u8) -> Option<Self> {
        if id <= MAX_BUS_ID {
            Some(Self(id))
        } else {
            None
        }
    }

    pub fn raw(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Motor wired to the controller.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorType {
    Brushless,
    Brushed,
}

/// Controller behavior while the commanded output is zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleMode {
    Coast,
    Brake,
}

/// Sensor the closed loop controller reads its process variable from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSensor {
    NoSensor,
    PrimaryEncoder,
    AnalogSensor,
    AlternateOrExternalEncoder,
    AbsoluteEncoder,
}

/// Whether parameters not named by a configuration are reset first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    NoResetSafeParameters,
    ResetSafeParameters,
}

/// Whether applied parameters survive a controller power cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    NoPersistParameters,
    PersistParameters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_id_range() {
        assert_eq!(BusId::new(0).map(|id| id.raw()), Some(0));
        assert_eq!(BusId::new(62).map(|id| id.raw()), Some(62));
        assert!(BusId::new(63).is_none());
        assert!(BusId::new(u8::MAX).is_none());
    }
}
