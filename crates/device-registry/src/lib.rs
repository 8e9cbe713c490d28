//! device-registry: command dispatch and configuration translation for CAN motor controllers
//!
//! Commands from the control plane are routed by device type to a registry
//! that owns the live controller handles. Configuration records arrive in a
//! flat, sentinel-encoded wire form; they are decoded once into explicit
//! optionals and translated into an ordered set of controller settings.

mod error;
pub use error::{DispatchError, RouterError};

mod types;
pub use types::{CommandEnvelope, CommandKind, DeviceRef, DeviceType, RawCommand, RawDevice};

pub mod config;
pub use config::{RawCreate, RawSparkConfig};

mod decode;
pub use decode::{
    decode_config, decode_payload, AbsoluteEncoderSection, ClosedLoopSection, DeviceConfig,
    MotorSection, PositionWrap, PulseWidth, RelativeEncoderSection,
};

mod translate;
pub use translate::{motor_type, translate};

mod registry;
pub use registry::{DeviceRegistry, SparkMaxRegistry};

mod router;
pub use router::CommandRouter;

mod response;
pub use response::{ErrorCode, ErrorPayload, Response};

mod dispatcher;
pub use dispatcher::{CommandOutcome, CommandQueue, CycleReport, Dispatcher, DispatcherConfig};

mod loader;
pub use loader::{
    load_command_batch, load_dispatcher_config, load_spark_config, parse_command_batch,
};

mod metrics;
pub use metrics::{DispatchMetrics, MetricsHub};
