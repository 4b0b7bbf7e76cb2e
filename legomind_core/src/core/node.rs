use crate::error::{LegoError, LegoResult};
use log::LevelFilter;
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

/// Most recent error messages kept per node
const ERROR_HISTORY_LIMIT: usize = 32;

/// One-line rendering of a message for node logs
pub trait LogSummary {
    fn log_summary(&self) -> String;
}

/// Where a node is in its init/tick/shutdown cycle
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Running,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeState::Uninitialized => "uninitialized",
            NodeState::Running => "running",
            NodeState::Stopped => "stopped",
            NodeState::Error(msg) => return write!(f, "error ({})", msg),
        };
        f.write_str(label)
    }
}

/// Tick statistics of one node run
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub min_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub errors_count: u64,
    pub warnings_count: u64,
    pub uptime_seconds: f64,
}

impl NodeMetrics {
    fn record_success(&mut self, duration_ms: f64) {
        self.total_ticks += 1;
        self.successful_ticks += 1;
        self.last_tick_duration_ms = duration_ms;

        if self.successful_ticks == 1 {
            self.min_tick_duration_ms = duration_ms;
            self.max_tick_duration_ms = duration_ms;
        } else {
            self.min_tick_duration_ms = self.min_tick_duration_ms.min(duration_ms);
            self.max_tick_duration_ms = self.max_tick_duration_ms.max(duration_ms);
        }

        // Running mean over successful ticks
        let n = self.successful_ticks as f64;
        self.avg_tick_duration_ms += (duration_ms - self.avg_tick_duration_ms) / n;
    }

    fn record_failure(&mut self, duration_ms: Option<f64>) {
        self.total_ticks += 1;
        self.failed_ticks += 1;
        if let Some(ms) = duration_ms {
            self.last_tick_duration_ms = ms;
        }
    }
}

/// Logging behaviour of a node context
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub enable_logging: bool,
    /// Most verbose level the context forwards to the `log` facade
    pub log_level: LevelFilter,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            enable_logging: true,
            log_level: LevelFilter::Info,
        }
    }
}

/// Runtime context handed to a node while it runs
pub struct NodeInfo {
    name: String,
    state: NodeState,
    config: NodeConfig,
    metrics: NodeMetrics,

    created_at: Instant,
    last_tick_time: Option<Instant>,
    tick_start_time: Option<Instant>,

    error_history: VecDeque<String>,
}

impl NodeInfo {
    /// Create a new NodeInfo with the default log level
    pub fn new(node_name: String, logging_enabled: bool) -> Self {
        Self::new_with_config(
            node_name,
            NodeConfig {
                enable_logging: logging_enabled,
                ..Default::default()
            },
        )
    }

    pub fn new_with_config(node_name: String, config: NodeConfig) -> Self {
        Self {
            name: node_name,
            state: NodeState::Uninitialized,
            config,
            metrics: NodeMetrics::default(),
            created_at: Instant::now(),
            last_tick_time: None,
            tick_start_time: None,
            error_history: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        self.log_error(&error_msg);
        self.state = NodeState::Error(error_msg);
    }

    /// Enter `Running`; only allowed from a fresh or cleanly stopped context
    pub fn initialize(&mut self) -> LegoResult<()> {
        match self.state {
            NodeState::Uninitialized | NodeState::Stopped => {
                self.state = NodeState::Running;
                Ok(())
            }
            ref other => Err(LegoError::InitializationFailed(format!(
                "Node '{}' cannot initialize from state {}",
                self.name, other
            ))),
        }
    }

    pub fn shutdown(&mut self) -> LegoResult<()> {
        self.state = NodeState::Stopped;
        self.metrics.uptime_seconds = self.created_at.elapsed().as_secs_f64();
        Ok(())
    }

    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    /// Close the tick opened by [`NodeInfo::start_tick`]; a no-op without one
    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            self.metrics
                .record_success(start_time.elapsed().as_secs_f64() * 1000.0);
            self.last_tick_time = Some(Instant::now());
            self.metrics.uptime_seconds = self.created_at.elapsed().as_secs_f64();
        }
    }

    pub fn record_tick_failure(&mut self, error_msg: String) {
        let duration_ms = self
            .tick_start_time
            .take()
            .map(|start| start.elapsed().as_secs_f64() * 1000.0);
        self.metrics.record_failure(duration_ms);
        self.log_error(&error_msg);
    }

    fn enabled(&self, level: LevelFilter) -> bool {
        self.config.enable_logging && level <= self.config.log_level
    }

    pub fn log_info(&self, message: &str) {
        if self.enabled(LevelFilter::Info) {
            log::info!("[{}] {}", self.name, message);
        }
    }

    pub fn log_warning(&mut self, message: &str) {
        if self.enabled(LevelFilter::Warn) {
            log::warn!("[{}] {}", self.name, message);
        }
        self.metrics.warnings_count += 1;
    }

    /// Log and remember an error; the history keeps the latest few
    pub fn log_error(&mut self, message: &str) {
        if self.enabled(LevelFilter::Error) {
            log::error!("[{}] {}", self.name, message);
        }

        if self.error_history.len() == ERROR_HISTORY_LIMIT {
            self.error_history.pop_front();
        }
        self.error_history.push_back(message.to_string());
        self.metrics.errors_count += 1;
    }

    pub fn log_debug(&mut self, message: &str) {
        if self.enabled(LevelFilter::Debug) {
            log::debug!("[{}] {}", self.name, message);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }
    pub fn last_tick_time(&self) -> Option<Instant> {
        self.last_tick_time
    }
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.error_history.iter().map(String::as_str)
    }
}

/// Lifecycle trait implemented by every unit of work run by a worker
///
/// Hardware failures inside `tick` are returned as errors; the worker stops
/// ticking on the first one.
pub trait Node: Send {
    /// Also used as the worker thread's name suffix
    fn name(&self) -> &'static str;

    /// Runs once on the worker thread before the first tick
    fn init(&mut self, ctx: &mut NodeInfo) -> LegoResult<()> {
        ctx.log_debug("init");
        Ok(())
    }

    fn tick(&mut self, ctx: Option<&mut NodeInfo>) -> LegoResult<()>;

    /// Runs once after the last tick, also when a tick failed
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> LegoResult<()> {
        ctx.log_debug("shutdown");
        Ok(())
    }

    /// Called with the failing tick's message before the worker stops
    fn on_error(&mut self, error: &str, ctx: &mut NodeInfo) {
        ctx.log_warning(&format!("Stopping after error: {}", error));
    }
}

impl LogSummary for i32 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl<T: LogSummary> LogSummary for Option<T> {
    fn log_summary(&self) -> String {
        match self {
            Some(value) => value.log_summary(),
            None => "none".to_string(),
        }
    }
}
