//! Config translation: decoded configuration record to controller settings.
//!
//! Sections are applied in a fixed order (absolute encoder, closed loop,
//! relative encoder, motor) so the feedback sensor is selected before any
//! setting that relies on it. Unknown enum tags and out-of-domain values are
//! rejected; nothing is defaulted.

use crate::decode::{AbsoluteEncoderSection, ClosedLoopSection, MotorSection, RelativeEncoderSection};
use crate::{DeviceConfig, DispatchError};
use motor_driver::{BusId, FeedbackSensor, IdleMode, MotorType, Setting, SparkMaxConfig};

pub fn motor_type(tag: u8) -> Result<MotorType, DispatchError> {
    match tag {
        0 => Ok(MotorType::Brushless),
        1 => Ok(MotorType::Brushed),
        other => Err(DispatchError::invalid(
            "motor_type",
            format!("unknown motor type {other}"),
        )),
    }
}

fn feedback_sensor(tag: u8) -> Result<FeedbackSensor, DispatchError> {
    match tag {
        0 => Ok(FeedbackSensor::NoSensor),
        1 => Ok(FeedbackSensor::PrimaryEncoder),
        2 => Ok(FeedbackSensor::AnalogSensor),
        3 => Ok(FeedbackSensor::AlternateOrExternalEncoder),
        4 => Ok(FeedbackSensor::AbsoluteEncoder),
        other => Err(DispatchError::invalid(
            "closed_loop.feedback_sensor",
            format!("unknown feedback sensor {other}"),
        )),
    }
}

fn idle_mode(tag: u8) -> Result<IdleMode, DispatchError> {
    match tag {
        0 => Ok(IdleMode::Coast),
        1 => Ok(IdleMode::Brake),
        other => Err(DispatchError::invalid(
            "motor.idle_mode",
            format!("unknown idle mode {other}"),
        )),
    }
}

fn depth(field: &str, value: u8, max: u8) -> Result<u8, DispatchError> {
    if value.is_power_of_two() && value <= max {
        Ok(value)
    } else {
        Err(DispatchError::invalid(
            field,
            format!("{value} is not a power of two in 1..={max}"),
        ))
    }
}

fn within(field: &str, value: u8, lo: u8, hi: u8) -> Result<u8, DispatchError> {
    if (lo..=hi).contains(&value) {
        Ok(value)
    } else {
        Err(DispatchError::invalid(
            field,
            format!("{value} ms is outside {lo}..={hi} ms"),
        ))
    }
}

fn output(field: &str, value: f64) -> Result<f64, DispatchError> {
    if (-1.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DispatchError::invalid(
            field,
            format!("{value} is outside -1.0..=1.0"),
        ))
    }
}

fn wrap_bound(field: &str, bound: Option<f64>) -> Result<f64, DispatchError> {
    bound.ok_or_else(|| {
        DispatchError::invalid(field, "required while position wrapping is enabled")
    })
}

fn absolute_encoder(
    section: &AbsoluteEncoderSection,
    out: &mut Vec<Setting>,
) -> Result<(), DispatchError> {
    out.extend([
        Setting::AbsoluteInverted {
            inverted: section.inverted,
        },
        Setting::AbsolutePositionFactor {
            factor: section.position_factor,
        },
        Setting::AbsoluteVelocityFactor {
            factor: section.velocity_factor,
        },
        Setting::AbsoluteZeroOffset {
            offset: section.zero_offset,
        },
        Setting::AbsoluteAverageDepth {
            depth: depth(
                "absolute_encoder.average_depth",
                section.average_depth,
                128,
            )?,
        },
        Setting::AbsoluteZeroCentered {
            zero_centered: section.zero_centered,
        },
    ]);
    if let Some(pulse) = section.pulse_width {
        out.push(Setting::AbsolutePulseWidth {
            start_us: pulse.start_us,
            end_us: pulse.end_us,
        });
    }
    Ok(())
}

fn closed_loop(section: &ClosedLoopSection, out: &mut Vec<Setting>) -> Result<(), DispatchError> {
    let min = output("closed_loop.min_output", section.min_output)?;
    let max = output("closed_loop.max_output", section.max_output)?;
    let sensor = feedback_sensor(section.feedback_sensor)?;
    out.extend([
        Setting::Pidf {
            p: section.p,
            i: section.i,
            d: section.d,
            ff: section.ff,
        },
        Setting::OutputRange { min, max },
        Setting::FeedbackSensor { sensor },
    ]);
    if let Some(max) = section.max_integral {
        out.push(Setting::IMaxAccum { max });
    }
    if let Some(zone) = section.integral_zone {
        out.push(Setting::IZone { zone });
    }
    if let Some(wrap) = section.position_wrap {
        out.push(Setting::PositionWrapping {
            min: wrap_bound("closed_loop.position_wrap_min", wrap.min)?,
            max: wrap_bound("closed_loop.position_wrap_max", wrap.max)?,
        });
    }
    Ok(())
}

fn relative_encoder(
    section: &RelativeEncoderSection,
    out: &mut Vec<Setting>,
) -> Result<(), DispatchError> {
    out.extend([
        Setting::EncoderInverted {
            inverted: section.inverted,
        },
        Setting::EncoderPositionFactor {
            factor: section.position_factor,
        },
        Setting::EncoderVelocityFactor {
            factor: section.velocity_factor,
        },
    ]);
    if let Some(counts) = section.counts_per_revolution {
        out.push(Setting::CountsPerRevolution { counts });
    }
    if let Some(d) = section.quadrature_average_depth {
        out.push(Setting::QuadratureAverageDepth {
            depth: depth("relative_encoder.quadrature_average_depth", d, 64)?,
        });
    }
    if let Some(ms) = section.quadrature_measurement_period {
        out.push(Setting::QuadratureMeasurementPeriod {
            ms: within("relative_encoder.quadrature_measurement_period", ms, 1, 100)?,
        });
    }
    if let Some(d) = section.uvw_average_depth {
        out.push(Setting::UvwAverageDepth {
            depth: depth("relative_encoder.uvw_average_depth", d, 8)?,
        });
    }
    if let Some(ms) = section.uvw_measurement_period {
        out.push(Setting::UvwMeasurementPeriod {
            ms: within("relative_encoder.uvw_measurement_period", ms, 8, 64)?,
        });
    }
    Ok(())
}

fn motor(section: &MotorSection, out: &mut Vec<Setting>) -> Result<(), DispatchError> {
    out.push(Setting::IdleMode {
        mode: idle_mode(section.idle_mode)?,
    });

    // `inverted` opposes the leader while following, otherwise it inverts this motor.
    match section.leader_id {
        Some(leader) => {
            let leader = BusId::new(leader).ok_or_else(|| {
                DispatchError::invalid(
                    "motor.leader_id",
                    format!("bus id {leader} is out of range"),
                )
            })?;
            out.push(Setting::Follow {
                leader,
                opposed: section.inverted,
            });
        }
        None => out.push(Setting::Inverted {
            inverted: section.inverted,
        }),
    }

    if let Some(amps) = section.current_limit {
        out.push(Setting::SmartCurrentLimit { amps });
    }
    if let Some(nominal_voltage) = section.nominal_voltage {
        out.push(Setting::VoltageCompensation { nominal_voltage });
    }
    Ok(())
}

/// Translate a decoded configuration into the ordered controller settings.
///
/// Pure: no device or registry is touched.
pub fn translate(config: &DeviceConfig) -> Result<SparkMaxConfig, DispatchError> {
    let mut settings = Vec::with_capacity(32);
    absolute_encoder(&config.absolute_encoder, &mut settings)?;
    closed_loop(&config.closed_loop, &mut settings)?;
    relative_encoder(&config.relative_encoder, &mut settings)?;
    motor(&config.motor, &mut settings)?;
    Ok(SparkMaxConfig::new(settings))
}
