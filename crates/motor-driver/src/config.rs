use crate::{BusId, FeedbackSensor, IdleMode};
use serde::Serialize;

/// Configuration group a [`Setting`] belongs to.
///
/// Sections are declared in the order a configuration applies them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    AbsoluteEncoder,
    ClosedLoop,
    RelativeEncoder,
    Motor,
}

/// One builder mutation understood by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "setting", rename_all = "snake_case")]
pub enum Setting {
    AbsoluteInverted { inverted: bool },
    AbsolutePositionFactor { factor: f64 },
    AbsoluteVelocityFactor { factor: f64 },
    AbsoluteZeroOffset { offset: f64 },
    AbsoluteAverageDepth { depth: u8 },
    AbsoluteZeroCentered { zero_centered: bool },
    /// Duty-cycle pulse bounds, in microseconds.
    AbsolutePulseWidth { start_us: f64, end_us: f64 },

    Pidf { p: f64, i: f64, d: f64, ff: f64 },
    OutputRange { min: f64, max: f64 },
    FeedbackSensor { sensor: FeedbackSensor },
    /// Maximum integral accumulator.
    IMaxAccum { max: f64 },
    IZone { zone: f64 },
    PositionWrapping { min: f64, max: f64 },

    EncoderInverted { inverted: bool },
    EncoderPositionFactor { factor: f64 },
    EncoderVelocityFactor { factor: f64 },
    CountsPerRevolution { counts: u32 },
    QuadratureAverageDepth { depth: u8 },
    QuadratureMeasurementPeriod { ms: u8 },
    UvwAverageDepth { depth: u8 },
    UvwMeasurementPeriod { ms: u8 },

    IdleMode { mode: IdleMode },
    /// Mirror the leader's output; `opposed` runs against the leader's direction.
    Follow { leader: BusId, opposed: bool },
    /// Invert this controller's own output.
    Inverted { inverted: bool },
    SmartCurrentLimit { amps: u32 },
    VoltageCompensation { nominal_voltage: f64 },
}

impl Setting {
    pub fn section(&self) -> Section {
        match self {
            Setting::AbsoluteInverted { .. }
            | Setting::AbsolutePositionFactor { .. }
            | Setting::AbsoluteVelocityFactor { .. }
            | Setting::AbsoluteZeroOffset { .. }
            | Setting::AbsoluteAverageDepth { .. }
            | Setting::AbsoluteZeroCentered { .. }
            | Setting::AbsolutePulseWidth { .. } => Section::AbsoluteEncoder,
            Setting::Pidf { .. }
            | Setting::OutputRange { .. }
            | Setting::FeedbackSensor { .. }
            | Setting::IMaxAccum { .. }
            | Setting::IZone { .. }
            | Setting::PositionWrapping { .. } => Section::ClosedLoop,
            Setting::EncoderInverted { .. }
            | Setting::EncoderPositionFactor { .. }
            | Setting::EncoderVelocityFactor { .. }
            | Setting::CountsPerRevolution { .. }
            | Setting::QuadratureAverageDepth { .. }
            | Setting::QuadratureMeasurementPeriod { .. }
            | Setting::UvwAverageDepth { .. }
            | Setting::UvwMeasurementPeriod { .. } => Section::RelativeEncoder,
            Setting::IdleMode { .. }
            | Setting::Follow { .. }
            | Setting::Inverted { .. }
            | Setting::SmartCurrentLimit { .. }
            | Setting::VoltageCompensation { .. } => Section::Motor,
        }
    }
}

/// A fully populated controller configuration.
///
/// Settings are kept in application order; the value is immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SparkMaxConfig {
    settings: Vec<Setting>,
}

impl SparkMaxConfig {
    pub fn new(settings: Vec<Setting>) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// First setting matching `pred`, if any.
    pub fn find<F>(&self, pred: F) -> Option<&Setting>
    where
        F: Fn(&Setting) -> bool,
    {
        self.settings.iter().find(|s| pred(s))
    }

    pub fn contains<F>(&self, pred: F) -> bool
    where
        F: Fn(&Setting) -> bool,
    {
        self.find(pred).is_some()
    }

    pub fn in_section(&self, section: Section) -> impl Iterator<Item = &Setting> + '_ {
        self.settings.iter().filter(move |s| s.section() == section)
    }
}
