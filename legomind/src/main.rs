use anyhow::{Context, Result};
use clap::Parser;
use crossbeam::channel::Sender;
use legomind::app::{Ev3App, RunOptions, RunSummary};
use legomind_core::hal::{Button, Keys};
use legomind_core::RuntimeParams;
use legomind_library::sim::{ChannelKeys, EventLog, ScriptEnd, ScriptedKeys, SimBrick};
use legomind_library::{DriveMotors, ReflexHardware};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

/// Distances (meters) the simulated sensor cycles through when none are given:
/// open floor, an obstacle approaching, then clear again
const DEFAULT_DISTANCES: &[f32] = &[
    0.80, 0.80, 0.60, 0.40, 0.25, 0.18, 0.15, 0.12, 0.08, 0.08, 0.50, 0.90,
];

/// Hardware calls kept in memory; older ones are only counted
const EVENT_LOG_CAPACITY: usize = 4096;

#[derive(Parser)]
#[command(name = "legomind")]
#[command(about = "LEGOMIND - EV3 obstacle-avoidance robot program")]
#[command(version)]
struct Cli {
    /// YAML params file (defaults to .legomind/params.yaml when present)
    #[arg(short = 'p', long = "params", value_name = "FILE")]
    params: Option<PathBuf>,

    /// Go straight to the reflex loop
    #[arg(long = "skip-demos")]
    skip_demos: bool,

    /// Number of sensor probe readings before the reflex loop
    #[arg(long = "probe-samples", value_name = "N")]
    probe_samples: Option<usize>,

    /// Simulated sensor readings in meters, repeated in a cycle
    #[arg(short = 'd', long = "distances", value_delimiter = ',', value_name = "M,M,...")]
    distances: Vec<f32>,

    /// Stop automatically after this many milliseconds instead of waiting for a key
    #[arg(long = "run-for", value_name = "MS")]
    run_for: Option<u64>,

    /// Pause between two distance samples
    #[arg(long = "sample-interval-ms", value_name = "MS")]
    sample_interval_ms: Option<u64>,

    /// Write the effective params back to the params file before running
    #[arg(long = "save-params")]
    save_params: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "legomind=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let params = load_params(&cli)?;
    let options = RunOptions {
        run_demos: !cli.skip_demos,
        probe_samples: cli
            .probe_samples
            .unwrap_or_else(|| params.get_u64("probe_samples", 0) as usize),
    };

    let distances = if cli.distances.is_empty() {
        DEFAULT_DISTANCES.to_vec()
    } else {
        cli.distances.clone()
    };
    let brick = SimBrick::with_log(distances, EventLog::bounded(EVENT_LOG_CAPACITY))
        .with_script_end(ScriptEnd::Cycle)
        .with_realtime(true);
    let log = brick.log.clone();
    let keys = exit_keys(&cli, log.clone())?;

    let hardware = ReflexHardware {
        drive: DriveMotors::new(Box::new(brick.left), Box::new(brick.right)),
        sensor: Box::new(brick.sensor),
        lcd: Box::new(brick.lcd),
        light: Box::new(brick.light),
    };

    let app = Ev3App::new(hardware, keys, &params).context("Failed to set up the robot")?;
    tracing::info!(
        "Reflex loop every {}ms",
        app.reflex_config().sample_interval_ms
    );

    let summary = app.run(options).context("Robot program failed")?;
    report(&summary, &log);
    Ok(())
}

fn load_params(cli: &Cli) -> Result<RuntimeParams> {
    let params = match &cli.params {
        Some(path) => RuntimeParams::from_file(path)
            .with_context(|| format!("Failed to load params from {}", path.display()))?,
        None => RuntimeParams::init().context("Failed to load default params")?,
    };
    if let Some(interval) = cli.sample_interval_ms {
        params.set("sample_interval_ms", interval)?;
    }
    if cli.save_params {
        params.save().context("Failed to save params")?;
        if let Some(path) = params.persist_path() {
            tracing::info!("Saved params to {}", path.display());
        }
    }
    Ok(params)
}

/// Keys that end the run: a timer with `--run-for`, otherwise Enter or Ctrl-C
fn exit_keys(cli: &Cli, log: EventLog) -> Result<Box<dyn Keys>> {
    if let Some(ms) = cli.run_for {
        let keys = ScriptedKeys::new(log).press_after(Duration::from_millis(ms), Button::Enter);
        return Ok(Box::new(keys));
    }

    let (presses, keys) = ChannelKeys::new(log);
    spawn_stdin_reader(presses.clone())?;
    ctrlc::set_handler(move || {
        let _ = presses.send(Button::Escape);
    })
    .context("Failed to install Ctrl-C handler")?;
    Ok(Box::new(keys))
}

fn spawn_stdin_reader(presses: Sender<Button>) -> Result<()> {
    std::thread::Builder::new()
        .name("legomind-stdin".to_string())
        .spawn(move || {
            if enter_pressed(&mut std::io::stdin().lock()) {
                let _ = presses.send(Button::Enter);
            } else {
                tracing::debug!("stdin closed, waiting for Ctrl-C");
            }
        })
        .context("Failed to spawn stdin reader")?;
    Ok(())
}

/// Whether `input` delivered a line; end of input or a read error is not a press
fn enter_pressed(input: &mut impl BufRead) -> bool {
    let mut line = String::new();
    matches!(input.read_line(&mut line), Ok(n) if n > 0)
}

fn report(summary: &RunSummary, log: &EventLog) {
    let elapsed = summary.duration().num_milliseconds() as f64 / 1000.0;
    match &summary.reflex {
        Some(run) => tracing::info!(
            "Run finished in {:.1}s: {} samples, {} actuations ({} normal, {} warning, {} critical), last zone {}",
            elapsed,
            run.stats.samples,
            run.stats.actuations(),
            run.stats.normal_actuations,
            run.stats.warning_actuations,
            run.stats.critical_actuations,
            run.final_zone.map(|z| z.as_str()).unwrap_or("none"),
        ),
        None => tracing::info!("Run finished in {:.1}s without the reflex loop", elapsed),
    }
    tracing::debug!(
        "{} hardware calls recorded, last {} kept",
        log.total_recorded(),
        log.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    struct BrokenInput;

    impl Read for BrokenInput {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "tty gone"))
        }
    }

    #[test]
    fn test_closed_stdin_is_not_a_press() {
        assert!(!enter_pressed(&mut Cursor::new(Vec::<u8>::new())));
        assert!(!enter_pressed(&mut BufReader::new(BrokenInput)));
    }

    #[test]
    fn test_enter_is_a_press() {
        assert!(enter_pressed(&mut Cursor::new(b"\n".to_vec())));
        assert!(enter_pressed(&mut Cursor::new(b"stop".to_vec())));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "legomind",
            "--skip-demos",
            "--distances",
            "0.5,0.15",
            "--run-for",
            "200",
        ]);
        assert!(cli.skip_demos);
        assert_eq!(cli.distances, vec![0.5, 0.15]);
        assert_eq!(cli.run_for, Some(200));
        assert!(!cli.save_params);
    }
}
