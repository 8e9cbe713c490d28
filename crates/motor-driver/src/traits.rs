use crate::{BusId, MotorType, PersistMode, ResetMode, Result, SparkMaxConfig};

/// A live controller bound to one bus id.
pub trait MotorController {
    /// Bus id the controller was constructed for.
    fn id(&self) -> BusId;

    /// Motor type the controller was constructed for.
    fn motor_type(&self) -> MotorType;

    /// Apply a configuration, resetting and persisting parameters as requested.
    fn configure(
        &mut self,
        config: &SparkMaxConfig,
        reset: ResetMode,
        persist: PersistMode,
    ) -> Result<()>;
}

/// Factory for controllers on one bus.
pub trait MotorDriver {
    type Controller: MotorController;

    /// Construct a controller for `id`. Blocking; bounded by the bus.
    fn open(&mut self, id: BusId, motor_type: MotorType) -> Result<Self::Controller>;
}
