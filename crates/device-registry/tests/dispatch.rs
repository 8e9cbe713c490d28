use device_registry::{
    CommandKind, CommandRouter, Dispatcher, DispatcherConfig, ErrorCode, RawCommand, RawDevice,
    SparkMaxRegistry,
};
use motor_driver::{BusId, DriverEvent, MockDriver, MotorType, PersistMode, Section, Setting};
use serde_json::{json, Value};

fn command(kind: CommandKind, id: u8, payload: Value) -> RawCommand {
    RawCommand {
        device: RawDevice { kind: 0, id },
        kind: kind.tag(),
        payload,
    }
}

#[test]
fn create_configure_duplicate_scenario() -> anyhow::Result<()> {
    let driver = MockDriver::new();
    let journal = driver.journal();
    let mut router = CommandRouter::new();
    router.register(Box::new(SparkMaxRegistry::new(driver)))?;
    let mut dispatcher = Dispatcher::new(router, DispatcherConfig::default());

    let queue = dispatcher.queue();
    queue.push(command(CommandKind::Create, 3, json!({ "motor_type": 0 })));
    queue.push(command(
        CommandKind::Configure,
        3,
        json!({
            "motor": { "idle_mode": 1, "leader_id": 0, "inverted": true, "current_limit": 40 }
        }),
    ));
    queue.push(command(CommandKind::Create, 3, json!({ "motor_type": 1 })));

    let report = dispatcher.run_cycle();
    let responses: Vec<_> = report.outcomes.iter().map(|o| &o.response).collect();
    assert!(responses[0].is_ok());
    assert!(responses[1].is_ok());
    assert_eq!(responses[2].code(), Some(ErrorCode::DuplicateDevice));
    let detail = responses[2]
        .error()
        .and_then(|e| e.detail.clone())
        .unwrap_or_default();
    assert!(detail.contains('3'));

    let id = BusId::new(3).ok_or_else(|| anyhow::anyhow!("bus id"))?;
    let opened: Vec<_> = journal
        .events()
        .into_iter()
        .filter(|e| matches!(e, DriverEvent::Opened { .. }))
        .collect();
    assert_eq!(
        opened,
        vec![DriverEvent::Opened {
            id,
            motor_type: MotorType::Brushless
        }]
    );

    let configs = journal.configs_for(id);
    assert_eq!(configs.len(), 1);
    let (config, _, persist) = &configs[0];
    assert_eq!(*persist, PersistMode::PersistParameters);
    assert!(config.contains(|s| *s == Setting::Inverted { inverted: true }));
    assert!(config.contains(|s| *s == Setting::SmartCurrentLimit { amps: 40 }));
    assert!(!config.contains(|s| matches!(s, Setting::Follow { .. })));
    assert_eq!(
        config.in_section(Section::Motor).next(),
        Some(&Setting::IdleMode {
            mode: motor_driver::IdleMode::Brake
        })
    );
    Ok(())
}

#[test]
fn failures_never_stop_the_batch() -> anyhow::Result<()> {
    let mut router = CommandRouter::new();
    router.register(Box::new(SparkMaxRegistry::new(MockDriver::new())))?;
    let mut dispatcher = Dispatcher::new(router, DispatcherConfig::default());

    let queue = dispatcher.queue();
    queue.push(RawCommand {
        device: RawDevice { kind: 1, id: 0 },
        kind: CommandKind::Create.tag(),
        payload: Value::Null,
    });
    queue.push(command(CommandKind::Configure, 5, json!({})));
    queue.push(command(CommandKind::SetOutput, 5, json!(0.25)));
    queue.push(command(
        CommandKind::Create,
        5,
        json!({ "motor_type": 1, "config": { "closed_loop": { "feedback_sensor": 7 } } }),
    ));
    queue.push(command(CommandKind::Create, 5, json!({ "motor_type": 1 })));

    let report = dispatcher.run_cycle();
    let codes: Vec<_> = report.outcomes.iter().map(|o| o.response.code()).collect();
    assert_eq!(
        codes,
        vec![
            Some(ErrorCode::UnsupportedDeviceType),
            Some(ErrorCode::UnknownDevice),
            Some(ErrorCode::UnsupportedCommand),
            Some(ErrorCode::InvalidConfig),
            None,
        ]
    );
    assert_eq!(dispatcher.router().device_count(), 1);
    Ok(())
}
