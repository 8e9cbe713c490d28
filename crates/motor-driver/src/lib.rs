//! motor-driver: the device-driver seam for CAN motor controllers
//!
//! This crate models the narrow surface the dispatch core needs from a motor
//! controller SDK: constructing a controller bound to a bus id, and applying a
//! builder-style configuration value with explicit reset and persist modes.
//! The default build enables a `mock` backend that journals every call so the
//! core can be exercised on any host.

mod types;
pub use types::{BusId, FeedbackSensor, IdleMode, MotorType, PersistMode, ResetMode, MAX_BUS_ID};

mod config;
pub use config::{Section, Setting, SparkMaxConfig};

mod error;
pub use error::{DriverError, Result};

mod traits;
pub use traits::{MotorController, MotorDriver};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{DriverEvent, Journal, MockController, MockDriver};
