use crate::config::{
    RawAbsoluteEncoder, RawClosedLoop, RawMotor, RawRelativeEncoder, RawSparkConfig, UNSET_F64,
};
use crate::DispatchError;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseWidth {
    pub start_us: f64,
    pub end_us: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionWrap {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsoluteEncoderSection {
    pub inverted: bool,
    pub position_factor: f64,
    pub velocity_factor: f64,
    pub zero_offset: f64,
    pub average_depth: u8,
    pub zero_centered: bool,
    pub pulse_width: Option<PulseWidth>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosedLoopSection {
    pub p: f64,
    pub i: f64,
    pub d: f64,
    pub ff: f64,
    pub min_output: f64,
    pub max_output: f64,
    /// Wire tag; resolved by the translator.
    pub feedback_sensor: u8,
    pub max_integral: Option<f64>,
    pub integral_zone: Option<f64>,
    pub position_wrap: Option<PositionWrap>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeEncoderSection {
    pub inverted: bool,
    pub position_factor: f64,
    pub velocity_factor: f64,
    pub counts_per_revolution: Option<u32>,
    pub quadrature_average_depth: Option<u8>,
    pub quadrature_measurement_period: Option<u8>,
    pub uvw_average_depth: Option<u8>,
    pub uvw_measurement_period: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorSection {
    /// Wire tag; resolved by the translator.
    pub idle_mode: u8,
    pub leader_id: Option<u8>,
    pub inverted: bool,
    pub current_limit: Option<u32>,
    pub nominal_voltage: Option<f64>,
}

/// Controller configuration with every optional field made explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfig {
    pub absolute_encoder: AbsoluteEncoderSection,
    pub closed_loop: ClosedLoopSection,
    pub relative_encoder: RelativeEncoderSection,
    pub motor: MotorSection,
}

fn set_f64(v: f64) -> Option<f64> {
    if v == UNSET_F64 {
        None
    } else {
        Some(v)
    }
}

fn nonzero_f64(v: f64) -> Option<f64> {
    if v == 0.0 {
        None
    } else {
        Some(v)
    }
}

fn nonzero<T: Default + PartialEq>(v: T) -> Option<T> {
    if v == T::default() {
        None
    } else {
        Some(v)
    }
}

fn absolute_encoder(raw: &RawAbsoluteEncoder) -> AbsoluteEncoderSection {
    // A lone start or end bound is treated as absent.
    let pulse_width = match (set_f64(raw.start_pulse_us), set_f64(raw.end_pulse_us)) {
        (Some(start_us), Some(end_us)) => Some(PulseWidth { start_us, end_us }),
        _ => None,
    };
    AbsoluteEncoderSection {
        inverted: raw.inverted,
        position_factor: raw.position_factor,
        velocity_factor: raw.velocity_factor,
        zero_offset: raw.zero_offset,
        average_depth: raw.average_depth,
        zero_centered: raw.zero_centered,
        pulse_width,
    }
}

fn closed_loop(raw: &RawClosedLoop) -> ClosedLoopSection {
    let position_wrap = if raw.position_wrapping {
        Some(PositionWrap {
            min: set_f64(raw.position_wrap_min),
            max: set_f64(raw.position_wrap_max),
        })
    } else {
        None
    };
    ClosedLoopSection {
        p: raw.proportional,
        i: raw.integral,
        d: raw.derivative,
        ff: raw.feedforward,
        min_output: raw.min_output,
        max_output: raw.max_output,
        feedback_sensor: raw.feedback_sensor,
        max_integral: set_f64(raw.max_integral),
        integral_zone: set_f64(raw.integral_zone),
        position_wrap,
    }
}

fn relative_encoder(raw: &RawRelativeEncoder) -> RelativeEncoderSection {
    RelativeEncoderSection {
        inverted: raw.inverted,
        position_factor: raw.position_factor,
        velocity_factor: raw.velocity_factor,
        counts_per_revolution: nonzero(raw.counts_per_revolution),
        quadrature_average_depth: nonzero(raw.quadrature_average_depth),
        quadrature_measurement_period: nonzero(raw.quadrature_measurement_period),
        uvw_average_depth: nonzero(raw.uvw_average_depth),
        uvw_measurement_period: nonzero(raw.uvw_measurement_period),
    }
}

fn motor(raw: &RawMotor) -> MotorSection {
    MotorSection {
        idle_mode: raw.idle_mode,
        leader_id: nonzero(raw.leader_id),
        inverted: raw.inverted,
        current_limit: nonzero(raw.current_limit),
        nominal_voltage: nonzero_f64(raw.nominal_voltage),
    }
}

/// Convert the sentinel-encoded wire record into explicit optionals.
pub fn decode_config(raw: &RawSparkConfig) -> DeviceConfig {
    DeviceConfig {
        absolute_encoder: absolute_encoder(&raw.absolute_encoder),
        closed_loop: closed_loop(&raw.closed_loop),
        relative_encoder: relative_encoder(&raw.relative_encoder),
        motor: motor(&raw.motor),
    }
}

/// Decode an opaque command payload into the record expected for its kind.
pub fn decode_payload<T: DeserializeOwned>(payload: &serde_json::Value) -> Result<T, DispatchError> {
    T::deserialize(payload).map_err(|e| DispatchError::invalid("payload", e.to_string()))
}
