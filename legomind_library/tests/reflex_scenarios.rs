// Reflex loop behaviour against the simulated brick
use approx::assert_relative_eq;
use legomind_core::hal::LedPattern;
use legomind_core::{NodeWorker, WorkerConfig};
use legomind_library::sim::{
    EventLog, HardwareEvent, MotorCommand, ScriptEnd, SimBrick, LEFT_MOTOR_PORT, RIGHT_MOTOR_PORT,
};
use legomind_library::{
    DriveMotors, ProximityZone, ReflexConfig, ReflexHardware, ReflexNode, ReflexOutcome,
};
use std::time::{Duration, Instant};

fn reflex_with(brick: SimBrick, config: ReflexConfig) -> (ReflexNode, EventLog) {
    let log = brick.log.clone();
    let hardware = ReflexHardware {
        drive: DriveMotors::new(Box::new(brick.left), Box::new(brick.right)),
        sensor: Box::new(brick.sensor),
        lcd: Box::new(brick.lcd),
        light: Box::new(brick.light),
    };
    (ReflexNode::new(hardware, config), log)
}

fn reflex(distances: Vec<f32>) -> (ReflexNode, EventLog) {
    reflex_with(SimBrick::new(distances), ReflexConfig::default())
}

fn run_steps(node: &mut ReflexNode, n: usize) -> Vec<ReflexOutcome> {
    (0..n).map(|_| node.step(None).unwrap()).collect()
}

#[test]
fn test_normal_then_critical() {
    let (mut node, log) = reflex(vec![0.30, 0.30, 0.08]);

    let outcomes = run_steps(&mut node, 3);

    assert_eq!(
        outcomes,
        vec![
            ReflexOutcome::Actuated(ProximityZone::Normal),
            ReflexOutcome::Unchanged(ProximityZone::Normal),
            ReflexOutcome::Actuated(ProximityZone::Critical),
        ]
    );
    assert_eq!(
        log.commands_for(LEFT_MOTOR_PORT),
        vec![
            MotorCommand::SetSpeed(400),
            MotorCommand::Forward,
            MotorCommand::Stop,
            MotorCommand::Rotate {
                degrees: 439,
                immediate: false
            },
            MotorCommand::WaitComplete,
            MotorCommand::Forward,
        ]
    );
    assert_eq!(
        log.led_patterns(),
        vec![LedPattern::GreenBlink, LedPattern::RedBlink]
    );
    assert_eq!(
        log.lcd_texts(),
        vec!["Distance : 30", "Distance : 30", "Distance : 8"]
    );
    let last = node.stats().last_reading.unwrap();
    assert_eq!(last.centimeters, Some(8));
    match log.snapshot().iter().rev().find(|e| matches!(e, HardwareEvent::Sample { .. })) {
        Some(HardwareEvent::Sample { meters, .. }) => assert_relative_eq!(*meters, 0.08),
        other => panic!("expected a sample, got {:?}", other),
    }
}

#[test]
fn test_config_from_yaml() {
    let yaml = "cruise_speed: 300\nthresholds:\n  min_cm: 3\n  critical_cm: 15\n  warning_cm: 40\n  max_cm: 250\n";
    let config: ReflexConfig = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.cruise_speed, 300);
    assert_eq!(config.slow_speed, 100);
    assert_eq!(config.thresholds.critical_cm, 15);

    let (mut node, log) = reflex_with(SimBrick::new(vec![0.12, 0.30]), config);
    assert_eq!(
        run_steps(&mut node, 2),
        vec![
            ReflexOutcome::Actuated(ProximityZone::Critical),
            ReflexOutcome::Actuated(ProximityZone::Warning),
        ]
    );
    assert_eq!(log.led_patterns(), vec![LedPattern::RedBlink, LedPattern::OrangeBlink]);
}

#[test]
fn test_below_minimum_range_only_updates_display() {
    let (mut node, log) = reflex(vec![0.02]);

    assert_eq!(node.step(None).unwrap(), ReflexOutcome::OutOfRange(2));

    assert_eq!(log.lcd_texts(), vec!["Distance : 2"]);
    assert!(log.motor_commands().is_empty());
    assert!(log.led_patterns().is_empty());
    assert_eq!(node.current_zone(), None);
    assert_eq!(node.stats().out_of_range, 1);
}

#[test]
fn test_constant_warning_actuates_once() {
    let (mut node, log) = reflex(vec![0.15, 0.15, 0.15]);

    let outcomes = run_steps(&mut node, 3);

    assert_eq!(outcomes[0], ReflexOutcome::Actuated(ProximityZone::Warning));
    assert_eq!(outcomes[1], ReflexOutcome::Unchanged(ProximityZone::Warning));
    assert_eq!(outcomes[2], ReflexOutcome::Unchanged(ProximityZone::Warning));
    assert_eq!(
        log.motor_commands(),
        vec![
            (LEFT_MOTOR_PORT, MotorCommand::SetSpeed(100)),
            (RIGHT_MOTOR_PORT, MotorCommand::SetSpeed(100)),
        ]
    );
    assert_eq!(log.led_patterns(), vec![LedPattern::OrangeBlink]);
    // The display is still refreshed every time
    assert_eq!(log.lcd_texts().len(), 3);
}

#[test]
fn test_full_transition_cycle() {
    let (mut node, log) = reflex(vec![0.40, 0.18, 0.06, 0.60]);
    node.step(None).unwrap();
    log.clear();

    let outcomes = run_steps(&mut node, 3);

    assert_eq!(
        outcomes,
        vec![
            ReflexOutcome::Actuated(ProximityZone::Warning),
            ReflexOutcome::Actuated(ProximityZone::Critical),
            ReflexOutcome::Actuated(ProximityZone::Normal),
        ]
    );
    assert_eq!(
        log.led_patterns(),
        vec![
            LedPattern::OrangeBlink,
            LedPattern::RedBlink,
            LedPattern::GreenBlink
        ]
    );
    assert_eq!(
        log.commands_for(RIGHT_MOTOR_PORT),
        vec![
            MotorCommand::SetSpeed(100),
            MotorCommand::Stop,
            MotorCommand::Forward,
            MotorCommand::SetSpeed(400),
            MotorCommand::Forward,
        ]
    );
    let stats = node.stats();
    assert_eq!(stats.actuations(), 4);
    assert_eq!(stats.actuations_for(ProximityZone::Normal), 2);
}

#[test]
fn test_display_precedes_actuation() {
    let (mut node, log) = reflex(vec![0.09]);
    node.step(None).unwrap();

    let events = log.snapshot();
    let text_at = events
        .iter()
        .position(|e| matches!(e, HardwareEvent::LcdText { .. }))
        .unwrap();
    let first_motor = events
        .iter()
        .position(|e| matches!(e, HardwareEvent::Motor { .. }))
        .unwrap();
    assert!(text_at < first_motor);
}

#[test]
fn test_custom_thresholds() {
    let mut config = ReflexConfig::default();
    config.thresholds.critical_cm = 30;
    config.thresholds.warning_cm = 60;
    config.cruise_speed = 250;
    let (mut node, log) = reflex_with(SimBrick::new(vec![0.25, 0.45, 0.90]), config);

    let outcomes = run_steps(&mut node, 3);

    assert_eq!(
        outcomes,
        vec![
            ReflexOutcome::Actuated(ProximityZone::Critical),
            ReflexOutcome::Actuated(ProximityZone::Warning),
            ReflexOutcome::Actuated(ProximityZone::Normal),
        ]
    );
    assert!(log
        .commands_for(LEFT_MOTOR_PORT)
        .contains(&MotorCommand::SetSpeed(250)));
}

#[test]
fn test_worker_stops_within_one_interval() {
    let brick = SimBrick::new(vec![0.50, 0.15, 0.07]).with_script_end(ScriptEnd::Cycle);
    let config = ReflexConfig {
        sample_interval_ms: 50,
        ..Default::default()
    };
    let interval = config.sample_interval();
    let (node, log) = reflex_with(brick, config);
    let zone = node.zone_cell();

    let worker = NodeWorker::spawn(node, WorkerConfig::with_interval(interval)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while log.sample_count() < 4 {
        assert!(Instant::now() < deadline, "reflex loop never sampled");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(zone.load().is_some());

    let stop_requested = Instant::now();
    let report = worker.stop_and_join().unwrap();
    let waited = stop_requested.elapsed();

    assert!(report.outcome.is_ok());
    // Generous bound: one interval plus scheduling slack
    assert!(waited < interval + Duration::from_millis(500), "took {:?}", waited);

    let samples_at_exit = log.sample_count();
    assert_eq!(report.node.stats().samples as usize, samples_at_exit);
    std::thread::sleep(interval * 2);
    assert_eq!(log.sample_count(), samples_at_exit);
}

#[test]
fn test_worker_reports_hardware_failure() {
    let mut brick = SimBrick::new(vec![0.50, 0.08]);
    brick.left = brick.left.failing_after(2);
    let (node, _log) = reflex_with(brick, ReflexConfig::default());

    let worker = NodeWorker::spawn(
        node,
        WorkerConfig::with_interval(Duration::from_millis(1)),
    )
    .unwrap();
    let report = worker.join().unwrap();

    assert!(report.outcome.is_err());
    assert_eq!(report.metrics.failed_ticks, 1);
    // The failed critical actuation did not record a zone change
    assert_eq!(report.node.current_zone(), Some(ProximityZone::Normal));
}
