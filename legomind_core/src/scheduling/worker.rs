use crate::core::{Node, NodeConfig, NodeInfo, NodeMetrics, NodeState};
use crate::error::{LegoError, LegoResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};

/// Default pause between two ticks of a worker
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Settings for a node worker thread
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Pause between the end of one tick and the start of the next
    pub interval: Duration,
    /// Logging settings of the node context
    pub node: NodeConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TICK_INTERVAL,
            node: NodeConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }
}

/// Cloneable handle used to ask a worker to stop
///
/// The flag is the only state shared with the worker. Setting it also
/// unparks the worker so a pending sleep ends immediately.
#[derive(Clone)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
    worker: Thread,
}

impl StopHandle {
    /// Request a cooperative stop. The worker finishes its current tick at most.
    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::Relaxed);
        self.worker.unpark();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }
}

/// What a worker hands back when its thread exits
pub struct WorkerReport<N> {
    /// The node, returned so the caller regains its hardware handles
    pub node: N,
    pub metrics: NodeMetrics,
    /// `Stopped` after a clean exit, `Error` otherwise
    pub state: NodeState,
    /// `Err` when a tick, `init` or `shutdown` failed
    pub outcome: LegoResult<()>,
}

/// Handle to a node running on its own thread
pub struct WorkerHandle<N> {
    name: String,
    stop: StopHandle,
    thread: JoinHandle<WorkerReport<N>>,
}

impl<N> WorkerHandle<N> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Whether the worker thread has exited (on its own or after a stop request)
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the worker thread to exit
    ///
    /// Does not request a stop by itself; call [`WorkerHandle::request_stop`] first
    /// unless the node is expected to fail.
    pub fn join(self) -> LegoResult<WorkerReport<N>> {
        self.thread
            .join()
            .map_err(|_| LegoError::WorkerPanicked(self.name))
    }

    /// Request a stop and wait for the worker to exit
    pub fn stop_and_join(self) -> LegoResult<WorkerReport<N>> {
        self.request_stop();
        self.join()
    }
}

/// Runs one node on a dedicated thread until stopped
pub struct NodeWorker;

impl NodeWorker {
    /// Spawn `node` on a new thread ticking every `config.interval`
    pub fn spawn<N>(node: N, config: WorkerConfig) -> LegoResult<WorkerHandle<N>>
    where
        N: Node + 'static,
    {
        let name = node.name().to_string();
        let requested = Arc::new(AtomicBool::new(false));
        let flag = requested.clone();

        let thread = thread::Builder::new()
            .name(format!("legomind-{}", name))
            .spawn(move || run_node(node, &flag, &config))?;

        log::debug!("Spawned worker thread for node '{}'", name);

        let stop = StopHandle {
            requested,
            worker: thread.thread().clone(),
        };

        Ok(WorkerHandle { name, stop, thread })
    }
}

fn run_node<N: Node>(mut node: N, stop: &AtomicBool, config: &WorkerConfig) -> WorkerReport<N> {
    let mut ctx = NodeInfo::new_with_config(node.name().to_string(), config.node.clone());

    let init = ctx.initialize().and_then(|_| node.init(&mut ctx));
    if let Err(e) = init {
        ctx.transition_to_error(format!("Initialization failed: {}", e));
        return WorkerReport {
            node,
            metrics: ctx.metrics().clone(),
            state: ctx.state().clone(),
            outcome: Err(e),
        };
    }

    let mut outcome = Ok(());
    while !stop.load(Ordering::Relaxed) {
        ctx.start_tick();
        match node.tick(Some(&mut ctx)) {
            Ok(()) => ctx.record_tick(),
            Err(e) => {
                let msg = e.to_string();
                ctx.record_tick_failure(msg.clone());
                node.on_error(&msg, &mut ctx);
                ctx.transition_to_error(msg);
                outcome = Err(e);
                break;
            }
        }
        sleep_interruptible(config.interval, stop);
    }

    let shutdown = node.shutdown(&mut ctx);
    if outcome.is_ok() {
        outcome = shutdown.and_then(|_| ctx.shutdown());
        if let Err(e) = &outcome {
            ctx.transition_to_error(format!("Shutdown failed: {}", e));
        }
    }

    WorkerReport {
        node,
        metrics: ctx.metrics().clone(),
        state: ctx.state().clone(),
        outcome,
    }
}

/// Sleep for `interval`, returning early once `stop` is set
fn sleep_interruptible(interval: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while !stop.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        // Spurious wakeups just loop back to the flag check
        thread::park_timeout(deadline - now);
    }
}
