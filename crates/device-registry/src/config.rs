//! Flat, versioned SPARK MAX configuration record as carried on the wire.
//!
//! Optional fields are folded into reserved values instead of a presence flag:
//! `-1.0` marks an unset float and `0` an unset integer where zero carries no
//! meaning. [`crate::decode_config`] is the only place that interprets them.

use serde::{Deserialize, Serialize};

/// Reserved float meaning "not set".
pub const UNSET_F64: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct RawAbsoluteEncoder {
    pub inverted: bool,
    pub position_factor: f64,
    pub velocity_factor: f64,
    pub zero_offset: f64,
    /// 1, 2, 4, ..., 128
    pub average_depth: u8,
    pub start_pulse_us: f64,
    pub end_pulse_us: f64,
    pub zero_centered: bool,
}

impl Default for RawAbsoluteEncoder {
    fn default() -> Self {
        Self {
            inverted: false,
            position_factor: 1.0,
            velocity_factor: 1.0,
            zero_offset: 0.0,
            average_depth: 128,
            start_pulse_us: UNSET_F64,
            end_pulse_us: UNSET_F64,
            zero_centered: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct RawClosedLoop {
    pub proportional: f64,
    pub integral: f64,
    pub derivative: f64,
    pub feedforward: f64,
    pub max_integral: f64,
    pub integral_zone: f64,
    pub min_output: f64,
    pub max_output: f64,
    pub position_wrapping: bool,
    pub position_wrap_min: f64,
    pub position_wrap_max: f64,
    /// 0 none, 1 relative encoder, 2 analog, 3 alternate encoder, 4 absolute encoder
    pub feedback_sensor: u8,
}

impl Default for RawClosedLoop {
    fn default() -> Self {
        Self {
            proportional: UNSET_F64,
            integral: UNSET_F64,
            derivative: UNSET_F64,
            feedforward: UNSET_F64,
            max_integral: UNSET_F64,
            integral_zone: UNSET_F64,
            min_output: -1.0,
            max_output: 1.0,
            position_wrapping: false,
            position_wrap_min: UNSET_F64,
            position_wrap_max: UNSET_F64,
            feedback_sensor: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct RawRelativeEncoder {
    /// Brushed motors only.
    pub counts_per_revolution: u32,
    pub inverted: bool,
    pub position_factor: f64,
    pub velocity_factor: f64,
    pub quadrature_average_depth: u8,
    /// Milliseconds.
    pub quadrature_measurement_period: u8,
    pub uvw_average_depth: u8,
    /// Milliseconds.
    pub uvw_measurement_period: u8,
}

impl Default for RawRelativeEncoder {
    fn default() -> Self {
        Self {
            counts_per_revolution: 0,
            inverted: false,
            position_factor: 1.0,
            velocity_factor: 1.0,
            quadrature_average_depth: 0,
            quadrature_measurement_period: 100,
            uvw_average_depth: 8,
            uvw_measurement_period: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct RawMotor {
    /// 0 coast, 1 brake
    pub idle_mode: u8,
    /// Bus id to follow; 0 means no leader.
    pub leader_id: u8,
    /// Opposes the leader when following, otherwise inverts this motor.
    pub inverted: bool,
    /// Amps.
    pub current_limit: u32,
    /// Volts.
    pub nominal_voltage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct RawSparkConfig {
    pub absolute_encoder: RawAbsoluteEncoder,
    pub closed_loop: RawClosedLoop,
    pub relative_encoder: RawRelativeEncoder,
    pub motor: RawMotor,
}

/// Payload of a create command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RawCreate {
    /// 0 brushless, 1 brushed
    pub motor_type: u8,
    #[serde(default)]
    pub config: Option<RawSparkConfig>,
}
