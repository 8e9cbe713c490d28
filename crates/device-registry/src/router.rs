use crate::{
    CommandEnvelope, DeviceRegistry, DeviceType, DispatchError, RawCommand, Response, RouterError,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Routes each command to the registry owning its device type.
#[derive(Default)]
pub struct CommandRouter {
    registries: HashMap<DeviceType, Box<dyn DeviceRegistry>>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, registry: Box<dyn DeviceRegistry>) -> Result<(), RouterError> {
        let kind = registry.device_type();
        if self.registries.contains_key(&kind) {
            return Err(RouterError::DuplicateRegistry(kind));
        }
        self.registries.insert(kind, registry);
        Ok(())
    }

    /// Device types with a registry, in tag order.
    pub fn device_types(&self) -> Vec<DeviceType> {
        let mut kinds: Vec<DeviceType> = self.registries.keys().copied().collect();
        kinds.sort_by_key(|k| k.tag());
        kinds
    }

    pub fn registry(&self, kind: DeviceType) -> Option<&dyn DeviceRegistry> {
        self.registries.get(&kind).map(|r| &**r)
    }

    /// Live handles across all registries.
    pub fn device_count(&self) -> usize {
        self.registries.values().map(|r| r.len()).sum()
    }

    pub fn route(&mut self, command: &RawCommand) -> Result<(), DispatchError> {
        let tag = command.device.kind;
        let kind = DeviceType::from_tag(tag).ok_or(DispatchError::UnsupportedDeviceType(tag))?;
        let registry = self
            .registries
            .get_mut(&kind)
            .ok_or(DispatchError::UnsupportedDeviceType(tag))?;
        let envelope = CommandEnvelope::decode(kind, command)?;
        debug!(device = ?kind, id = %envelope.device.id, command = ?envelope.kind, "dispatching");
        registry.handle(&envelope)
    }

    /// Route `command` and package the outcome. Never panics on bad input.
    pub fn dispatch(&mut self, command: &RawCommand) -> Response {
        let result = self.route(command);
        if let Err(err) = &result {
            warn!(
                device_kind = command.device.kind,
                device_id = command.device.id,
                command = command.kind,
                error = %err,
                "command failed"
            );
        }
        Response::from(result)
    }
}
