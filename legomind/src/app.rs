//! Lifecycle controller for the robot program
//!
//! [`Ev3App`] owns every hardware handle. It runs the one-shot demos and the
//! sensor probe on the calling thread, then hands the drive motors, sensor,
//! LCD and light to a [`ReflexNode`] running on its own worker thread. On
//! exit it stops the worker, waits for it, and only then stops the motors and
//! disables the sensor.

use chrono::{DateTime, Local};
use legomind_core::hal::{Button, Keys};
use legomind_core::{
    LegoError, LegoResult, NodeMetrics, NodeWorker, RuntimeParams, WorkerConfig, WorkerHandle,
};
use legomind_library::{
    DemoConfig, MotorDemo, ProximityZone, ReflexConfig, ReflexHardware, ReflexNode, ReflexStats,
    SensorProbeNode, ZoneCell,
};
use std::sync::Arc;

/// Which optional stages [`Ev3App::run`] goes through before the reflex loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub run_demos: bool,
    pub probe_samples: usize,
}

impl RunOptions {
    /// Demos first, no probe
    pub fn full() -> Self {
        Self {
            run_demos: true,
            probe_samples: 0,
        }
    }

    /// Straight to the reflex loop
    pub fn reflex_only() -> Self {
        Self::default()
    }
}

/// What the reflex worker did before it was stopped
#[derive(Debug, Clone)]
pub struct ReflexRun {
    pub stats: ReflexStats,
    pub metrics: NodeMetrics,
    pub final_zone: Option<ProximityZone>,
}

/// Summary of one program run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub exit_button: Option<Button>,
    /// `None` when the reflex loop was never launched
    pub reflex: Option<ReflexRun>,
}

impl RunSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs the robot program: demos, optional probe, reflex loop, teardown
///
/// The reflex worker owns the hardware while it runs. If the worker thread
/// panics the hardware is lost with it: [`Ev3App::shutdown`] returns
/// [`LegoError::WorkerPanicked`] without stopping the motors, which keep the
/// last command they received.
pub struct Ev3App {
    // Exactly one of these holds the hardware at any time
    hardware: Option<ReflexHardware>,
    worker: Option<WorkerHandle<ReflexNode>>,
    keys: Box<dyn Keys>,
    reflex_config: ReflexConfig,
    demo_config: DemoConfig,
    zone: Option<Arc<ZoneCell>>,
    exit_button: Option<Button>,
    started_at: DateTime<Local>,
}

impl Ev3App {
    /// Build the app with settings read from `params`
    pub fn new(
        hardware: ReflexHardware,
        keys: Box<dyn Keys>,
        params: &RuntimeParams,
    ) -> LegoResult<Self> {
        Self::with_config(
            hardware,
            keys,
            ReflexConfig::from_params(params)?,
            DemoConfig::from_params(params)?,
        )
    }

    /// Build the app and bring the drive motors to a known state:
    /// tacho counts reset, both wheels set to cruise speed
    pub fn with_config(
        mut hardware: ReflexHardware,
        keys: Box<dyn Keys>,
        reflex_config: ReflexConfig,
        demo_config: DemoConfig,
    ) -> LegoResult<Self> {
        reflex_config.validate()?;
        hardware.drive.reset_tacho_counts()?;
        hardware.drive.set_speed(reflex_config.cruise_speed)?;

        tracing::debug!(
            "EV3 app ready: left {} / right {}, sensor {}",
            hardware.drive.left.port(),
            hardware.drive.right.port(),
            hardware.sensor.port()
        );

        Ok(Self {
            hardware: Some(hardware),
            worker: None,
            keys,
            reflex_config,
            demo_config,
            zone: None,
            exit_button: None,
            started_at: Local::now(),
        })
    }

    pub fn reflex_config(&self) -> &ReflexConfig {
        &self.reflex_config
    }

    pub fn is_reflex_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Zone the reflex loop last acted on, readable while it runs
    pub fn current_zone(&self) -> Option<ProximityZone> {
        self.zone.as_ref().and_then(|zone| zone.load())
    }

    fn idle_hardware(&mut self, action: &str) -> LegoResult<&mut ReflexHardware> {
        self.hardware.as_mut().ok_or_else(|| {
            LegoError::InvalidInput(format!(
                "cannot {} while the reflex loop owns the hardware",
                action
            ))
        })
    }

    /// Run the one-shot motor demonstrations on the calling thread
    pub fn run_demos(&mut self) -> LegoResult<()> {
        let demo = MotorDemo::new(self.demo_config.clone());
        let hardware = self.idle_hardware("run the demos")?;
        tracing::info!("Running motor demos");
        demo.run_all(
            &mut hardware.drive,
            hardware.lcd.as_mut(),
            hardware.light.as_mut(),
        )
    }

    /// Show `samples` readings with steady zone colours, without driving
    pub fn run_probe(&mut self, samples: usize) -> LegoResult<()> {
        let thresholds = self.reflex_config.thresholds;
        let interval = self.reflex_config.sample_interval();
        let hardware = self.idle_hardware("probe the sensor")?;
        tracing::info!("Probing distance sensor for {} samples", samples);
        let mut probe = SensorProbeNode::new(
            hardware.sensor.as_mut(),
            hardware.lcd.as_mut(),
            hardware.light.as_mut(),
            thresholds,
        );
        probe.run(samples, interval)
    }

    /// Start both wheels and hand the hardware to the reflex worker
    pub fn launch_reflex(&mut self) -> LegoResult<()> {
        self.idle_hardware("launch the reflex loop")?.drive.forward()?;
        let hardware = self
            .hardware
            .take()
            .ok_or_else(|| LegoError::Internal("hardware missing".to_string()))?;

        let node = ReflexNode::new(hardware, self.reflex_config.clone());
        self.zone = Some(node.zone_cell());
        let config = WorkerConfig::with_interval(self.reflex_config.sample_interval());
        let worker = NodeWorker::spawn(node, config)?;
        tracing::info!("Reflex loop launched on worker '{}'", worker.name());
        self.worker = Some(worker);
        Ok(())
    }

    /// Block until a button is pressed
    pub fn wait_for_exit(&mut self) -> LegoResult<Button> {
        tracing::info!("Press any key to stop");
        let button = self.keys.wait_for_any_press()?;
        tracing::info!("{:?} pressed, shutting down", button);
        self.exit_button = Some(button);
        Ok(button)
    }

    /// Stop the reflex worker, wait for it to exit, then stop both motors and
    /// disable the sensor
    ///
    /// Teardown runs even when the worker ended with an error; that error is
    /// returned afterwards.
    pub fn shutdown(self) -> LegoResult<RunSummary> {
        let (mut hardware, reflex, worker_outcome) = match (self.worker, self.hardware) {
            (None, Some(hardware)) => (hardware, None, Ok(())),
            (Some(worker), _) => {
                let report = worker.stop_and_join().map_err(|e| {
                    tracing::error!(
                        "{}; motors were not stopped and the sensor stays enabled",
                        e
                    );
                    e
                })?;
                let run = ReflexRun {
                    stats: report.node.stats().clone(),
                    metrics: report.metrics,
                    final_zone: report.node.current_zone(),
                };
                tracing::debug!("Reflex worker joined after {} ticks", run.metrics.total_ticks);
                (report.node.into_hardware(), Some(run), report.outcome)
            }
            (None, None) => return Err(LegoError::Internal("hardware missing".to_string())),
        };

        let teardown = teardown(&mut hardware);
        if let Err(e) = &worker_outcome {
            tracing::error!("Reflex loop failed: {}", e);
        }
        worker_outcome?;
        teardown?;

        Ok(RunSummary {
            started_at: self.started_at,
            finished_at: Local::now(),
            exit_button: self.exit_button,
            reflex,
        })
    }

    /// Whole program: optional demos and probe, reflex loop until a key press, teardown
    pub fn run(mut self, options: RunOptions) -> LegoResult<RunSummary> {
        if options.run_demos {
            self.run_demos()?;
        }
        if options.probe_samples > 0 {
            self.run_probe(options.probe_samples)?;
        }
        self.launch_reflex()?;
        let waited = self.wait_for_exit();
        let summary = self.shutdown()?;
        waited?;
        Ok(summary)
    }
}

// Every device gets its stop call even if an earlier one fails
fn teardown(hardware: &mut ReflexHardware) -> LegoResult<()> {
    let left = hardware.drive.left.stop();
    let right = hardware.drive.right.stop();
    let disabled = hardware.sensor.disable();
    left.and(right).and(disabled)
}
