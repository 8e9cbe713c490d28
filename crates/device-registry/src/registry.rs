use crate::config::{RawCreate, RawSparkConfig};
use crate::translate::{motor_type, translate};
use crate::{decode_config, decode_payload, CommandEnvelope, CommandKind, DeviceType, DispatchError};
use motor_driver::{BusId, MotorController, MotorDriver, PersistMode, ResetMode};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Owner of the live handles for one device type.
pub trait DeviceRegistry {
    fn device_type(&self) -> DeviceType;

    /// Execute one routed command against this registry.
    fn handle(&mut self, envelope: &CommandEnvelope<'_>) -> Result<(), DispatchError>;

    fn contains(&self, id: BusId) -> bool;

    /// Number of live handles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registry of SPARK MAX controllers keyed by bus id.
///
/// Create applies its optional configuration without persisting. Configure
/// persists.
pub struct SparkMaxRegistry<D: MotorDriver> {
    driver: D,
    controllers: BTreeMap<BusId, D::Controller>,
}

impl<D: MotorDriver> SparkMaxRegistry<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            controllers: BTreeMap::new(),
        }
    }

    pub fn controller(&self, id: BusId) -> Option<&D::Controller> {
        self.controllers.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = BusId> + '_ {
        self.controllers.keys().copied()
    }

    pub fn create(&mut self, id: BusId, request: &RawCreate) -> Result<(), DispatchError> {
        if self.controllers.contains_key(&id) {
            return Err(DispatchError::DuplicateDevice(id));
        }
        let motor_type = motor_type(request.motor_type)?;
        let config = request
            .config
            .as_ref()
            .map(|raw| translate(&decode_config(raw)))
            .transpose()?;

        let mut controller = self.driver.open(id, motor_type)?;
        if let Some(config) = &config {
            controller.configure(
                config,
                ResetMode::ResetSafeParameters,
                PersistMode::NoPersistParameters,
            )?;
        }
        self.controllers.insert(id, controller);
        info!(%id, ?motor_type, configured = config.is_some(), "spark max created");
        Ok(())
    }

    pub fn configure(&mut self, id: BusId, raw: &RawSparkConfig) -> Result<(), DispatchError> {
        let controller = self
            .controllers
            .get_mut(&id)
            .ok_or(DispatchError::UnknownDevice(id))?;
        let config = translate(&decode_config(raw))?;
        controller.configure(
            &config,
            ResetMode::ResetSafeParameters,
            PersistMode::PersistParameters,
        )?;
        debug!(%id, settings = config.len(), "spark max configured");
        Ok(())
    }
}

impl<D: MotorDriver> DeviceRegistry for SparkMaxRegistry<D> {
    fn device_type(&self) -> DeviceType {
        DeviceType::SparkMax
    }

    fn handle(&mut self, envelope: &CommandEnvelope<'_>) -> Result<(), DispatchError> {
        let id = envelope.device.id;
        match envelope.kind {
            CommandKind::Create => {
                if self.contains(id) {
                    return Err(DispatchError::DuplicateDevice(id));
                }
                let request: RawCreate = decode_payload(envelope.payload)?;
                self.create(id, &request)
            }
            CommandKind::Configure => {
                if !self.contains(id) {
                    return Err(DispatchError::UnknownDevice(id));
                }
                let raw: RawSparkConfig = decode_payload(envelope.payload)?;
                self.configure(id, &raw)
            }
            CommandKind::SetPosition | CommandKind::SetVelocity | CommandKind::SetOutput => {
                Err(DispatchError::UnsupportedCommand(envelope.kind.tag()))
            }
        }
    }

    fn contains(&self, id: BusId) -> bool {
        self.controllers.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.controllers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DeviceRef, RawCommand, RawDevice};
    use motor_driver::{DriverError, DriverEvent, MockDriver, MotorType, Setting};
    use serde_json::{json, Value};

    fn id(raw: u8) -> BusId {
        BusId::new(raw).unwrap()
    }

    fn envelope(kind: CommandKind, raw_id: u8, payload: &Value) -> CommandEnvelope<'_> {
        CommandEnvelope {
            device: DeviceRef {
                kind: DeviceType::SparkMax,
                id: id(raw_id),
            },
            kind,
            payload,
        }
    }

    #[test]
    fn create_then_duplicate() {
        let driver = MockDriver::new();
        let journal = driver.journal();
        let mut registry = SparkMaxRegistry::new(driver);
        let payload = json!({ "motor_type": 0 });

        registry.handle(&envelope(CommandKind::Create, 4, &payload)).unwrap();
        let err = registry
            .handle(&envelope(CommandKind::Create, 4, &json!({ "motor_type": 1 })))
            .unwrap_err();

        assert_eq!(err, DispatchError::DuplicateDevice(id(4)));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.controller(id(4)).map(|c| c.motor_type()),
            Some(MotorType::Brushless)
        );
        assert_eq!(journal.events().len(), 1);
    }

    #[test]
    fn create_without_config_does_not_configure() {
        let driver = MockDriver::new();
        let journal = driver.journal();
        let mut registry = SparkMaxRegistry::new(driver);

        registry
            .handle(&envelope(CommandKind::Create, 1, &json!({ "motor_type": 1 })))
            .unwrap();
        assert!(journal.configs_for(id(1)).is_empty());
        assert!(registry.controller(id(1)).and_then(|c| c.current()).is_none());
    }

    #[test]
    fn create_with_config_applies_without_persisting() {
        let driver = MockDriver::new();
        let journal = driver.journal();
        let mut registry = SparkMaxRegistry::new(driver);
        let payload = json!({ "motor_type": 0, "config": { "motor": { "current_limit": 30 } } });

        registry.handle(&envelope(CommandKind::Create, 2, &payload)).unwrap();

        let configs = journal.configs_for(id(2));
        assert_eq!(configs.len(), 1);
        let (config, reset, persist) = &configs[0];
        assert_eq!(*reset, ResetMode::ResetSafeParameters);
        assert_eq!(*persist, PersistMode::NoPersistParameters);
        assert!(config.contains(|s| *s == Setting::SmartCurrentLimit { amps: 30 }));
    }

    #[test]
    fn create_with_invalid_config_leaves_no_handle() {
        let driver = MockDriver::new();
        let journal = driver.journal();
        let mut registry = SparkMaxRegistry::new(driver);
        let payload = json!({ "motor_type": 0, "config": { "motor": { "idle_mode": 9 } } });

        let err = registry
            .handle(&envelope(CommandKind::Create, 2, &payload))
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidConfig { .. }));
        assert!(!registry.contains(id(2)));
        assert!(journal.events().is_empty());
    }

    #[test]
    fn create_rejects_unknown_motor_type() {
        let mut registry = SparkMaxRegistry::new(MockDriver::new());
        let err = registry
            .handle(&envelope(CommandKind::Create, 2, &json!({ "motor_type": 2 })))
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidConfig { ref field, .. } if field == "motor_type"));
        assert!(registry.is_empty());
    }

    #[test]
    fn configure_unknown_device_attempts_nothing() {
        let driver = MockDriver::new();
        let journal = driver.journal();
        let mut registry = SparkMaxRegistry::new(driver);

        // Even an invalid payload is not looked at.
        let err = registry
            .handle(&envelope(CommandKind::Configure, 9, &json!({ "motor": { "idle_mode": 9 } })))
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownDevice(id(9)));
        assert!(journal.events().is_empty());
    }

    #[test]
    fn configure_persists() {
        let driver = MockDriver::new();
        let journal = driver.journal();
        let mut registry = SparkMaxRegistry::new(driver);
        registry
            .handle(&envelope(CommandKind::Create, 3, &json!({ "motor_type": 0 })))
            .unwrap();
        registry
            .handle(&envelope(CommandKind::Configure, 3, &json!({ "motor": { "idle_mode": 1 } })))
            .unwrap();

        let configs = journal.configs_for(id(3));
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].1, ResetMode::ResetSafeParameters);
        assert_eq!(configs[0].2, PersistMode::PersistParameters);
    }

    #[test]
    fn setpoint_commands_are_unsupported() {
        let mut registry = SparkMaxRegistry::new(MockDriver::new());
        registry
            .handle(&envelope(CommandKind::Create, 3, &json!({ "motor_type": 0 })))
            .unwrap();
        for kind in [
            CommandKind::SetPosition,
            CommandKind::SetVelocity,
            CommandKind::SetOutput,
        ] {
            let err = registry
                .handle(&envelope(kind, 3, &json!(0.5)))
                .unwrap_err();
            assert_eq!(err, DispatchError::UnsupportedCommand(kind.tag()));
        }
    }

    #[test]
    fn driver_failures_are_reported_as_is() {
        let mut driver = MockDriver::new();
        driver.set_fail_open(true);
        let mut registry = SparkMaxRegistry::new(driver);
        let err = registry
            .handle(&envelope(CommandKind::Create, 5, &json!({ "motor_type": 0 })))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Driver(DriverError::Construct(_, _))));
        assert!(registry.is_empty());

        let mut driver = MockDriver::new();
        driver.set_fail_configure(true);
        let journal = driver.journal();
        let mut registry = SparkMaxRegistry::new(driver);
        let payload = json!({ "motor_type": 0, "config": {} });
        let err = registry
            .handle(&envelope(CommandKind::Create, 5, &payload))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Driver(DriverError::Configure(_, _))));
        assert!(registry.is_empty());
        assert!(matches!(journal.events()[..], [DriverEvent::Opened { .. }]));
    }

    #[test]
    fn envelope_decoded_from_raw_command() {
        let raw = RawCommand {
            device: RawDevice { kind: 0, id: 6 },
            kind: CommandKind::Create.tag(),
            payload: json!({ "motor_type": 1 }),
        };
        let mut registry = SparkMaxRegistry::new(MockDriver::new());
        let env = CommandEnvelope::decode(DeviceType::SparkMax, &raw).unwrap();
        registry.handle(&env).unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![id(6)]);
    }
}
