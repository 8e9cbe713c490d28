use crate::{
    BusId, DriverError, MotorController, MotorDriver, MotorType, PersistMode, ResetMode, Result,
    SparkMaxConfig,
};
use std::sync::{Arc, Mutex};

/// One call observed by the mock backend.
#[derive(Clone, Debug, PartialEq)]
pub enum DriverEvent {
    Opened {
        id: BusId,
        motor_type: MotorType,
    },
    Configured {
        id: BusId,
        config: SparkMaxConfig,
        reset: ResetMode,
        persist: PersistMode,
    },
}

/// Shared record of every call made against a [`MockDriver`] and its controllers.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<DriverEvent>>>,
}

impl Journal {
    fn push(&self, event: DriverEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event);
    }

    pub fn events(&self) -> Vec<DriverEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Configurations applied to `id`, oldest first.
    pub fn configs_for(&self, id: BusId) -> Vec<(SparkMaxConfig, ResetMode, PersistMode)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                DriverEvent::Configured {
                    id: cid,
                    config,
                    reset,
                    persist,
                } if cid == id => Some((config, reset, persist)),
                _ => None,
            })
            .collect()
    }
}

/// In-process driver; each instance owns an independent journal.
#[derive(Clone, Debug, Default)]
pub struct MockDriver {
    journal: Journal,
    fail_open: bool,
    fail_configure: bool,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    /// Make subsequent `open` calls fail with a bus error.
    pub fn set_fail_open(&mut self, fail: bool) {
        self.fail_open = fail;
    }

    /// Make controllers opened from now on reject configuration.
    pub fn set_fail_configure(&mut self, fail: bool) {
        self.fail_configure = fail;
    }
}

impl MotorDriver for MockDriver {
    type Controller = MockController;

    fn open(&mut self, id: BusId, motor_type: MotorType) -> Result<MockController> {
        if self.fail_open {
            return Err(DriverError::Construct(id, "mock bus unavailable".into()));
        }
        tracing::trace!(%id, ?motor_type, "mock controller opened");
        self.journal.push(DriverEvent::Opened { id, motor_type });
        Ok(MockController {
            id,
            motor_type,
            current: None,
            fail_configure: self.fail_configure,
            journal: self.journal.clone(),
        })
    }
}

/// Controller handed out by [`MockDriver`]; remembers the last applied configuration.
#[derive(Debug)]
pub struct MockController {
    id: BusId,
    motor_type: MotorType,
    current: Option<SparkMaxConfig>,
    fail_configure: bool,
    journal: Journal,
}

impl MockController {
    pub fn current(&self) -> Option<&SparkMaxConfig> {
        self.current.as_ref()
    }
}

impl MotorController for MockController {
    fn id(&self) -> BusId {
        self.id
    }

    fn motor_type(&self) -> MotorType {
        self.motor_type
    }

    fn configure(
        &mut self,
        config: &SparkMaxConfig,
        reset: ResetMode,
        persist: PersistMode,
    ) -> Result<()> {
        if self.fail_configure {
            return Err(DriverError::Configure(self.id, "mock CAN timeout".into()));
        }
        tracing::trace!(id = %self.id, settings = config.len(), ?reset, ?persist, "mock configure");
        self.journal.push(DriverEvent::Configured {
            id: self.id,
            config: config.clone(),
            reset,
            persist,
        });
        self.current = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Setting;

    fn id(raw: u8) -> BusId {
        BusId::new(raw).unwrap()
    }

    #[test]
    fn journal_records_open_and_configure() -> anyhow::Result<()> {
        let mut driver = MockDriver::new();
        let journal = driver.journal();

        let mut controller = driver.open(id(5), MotorType::Brushed)?;
        let config = SparkMaxConfig::new(vec![Setting::SmartCurrentLimit { amps: 20 }]);
        controller.configure(
            &config,
            ResetMode::ResetSafeParameters,
            PersistMode::PersistParameters,
        )?;

        assert_eq!(controller.current(), Some(&config));
        assert_eq!(
            journal.events()[0],
            DriverEvent::Opened {
                id: id(5),
                motor_type: MotorType::Brushed
            }
        );
        assert_eq!(
            journal.configs_for(id(5)),
            vec![(
                config,
                ResetMode::ResetSafeParameters,
                PersistMode::PersistParameters
            )]
        );
        assert!(journal.configs_for(id(6)).is_empty());
        Ok(())
    }

    #[test]
    fn failures_are_reported_not_recorded() {
        let mut driver = MockDriver::new();
        driver.set_fail_open(true);
        assert!(matches!(
            driver.open(id(1), MotorType::Brushless),
            Err(DriverError::Construct(_, _))
        ));

        driver.set_fail_open(false);
        driver.set_fail_configure(true);
        let mut controller = driver.open(id(1), MotorType::Brushless).unwrap();
        let err = controller
            .configure(
                &SparkMaxConfig::default(),
                ResetMode::ResetSafeParameters,
                PersistMode::NoPersistParameters,
            )
            .unwrap_err();
        assert!(matches!(err, DriverError::Configure(_, _)));
        assert!(controller.current().is_none());
        assert_eq!(driver.journal().events().len(), 1);
    }
}
