use legomind_core::hal::{Button, LedPattern, MotorPort, SensorPort};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Command received by a simulated motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    SetSpeed(i32),
    Forward,
    Backward,
    Stop,
    Rotate { degrees: i32, immediate: bool },
    RotateTo { angle: i32, immediate: bool },
    WaitComplete,
    ResetTacho,
}

/// One call made against the simulated brick
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareEvent {
    Motor { port: MotorPort, command: MotorCommand },
    Sample { port: SensorPort, meters: f32 },
    SensorDisabled(SensorPort),
    LcdClear,
    LcdText { text: String, x: u32, y: u32 },
    Led(LedPattern),
    KeyPress(Button),
}

#[derive(Debug, Default)]
struct Events {
    retained: VecDeque<HardwareEvent>,
    /// Oldest events are dropped past this many
    capacity: Option<usize>,
    total: u64,
}

/// Ordered record of hardware calls, shared by all simulated devices
///
/// An unbounded log keeps every call. A bounded one keeps only the most
/// recent calls but still counts all of them.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Events>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log retaining at most `capacity` of the latest events
    pub fn bounded(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Events {
                retained: VecDeque::with_capacity(capacity),
                capacity: Some(capacity),
                total: 0,
            })),
        }
    }

    pub fn record(&self, event: HardwareEvent) {
        let mut events = self.events.lock();
        events.total += 1;
        let capacity = events.capacity;
        match capacity {
            Some(0) => return,
            Some(cap) if events.retained.len() >= cap => {
                events.retained.pop_front();
            }
            _ => {}
        }
        events.retained.push_back(event);
    }

    /// Copy of the retained events, oldest first
    pub fn snapshot(&self) -> Vec<HardwareEvent> {
        self.events.lock().retained.iter().cloned().collect()
    }

    /// Number of retained events
    pub fn len(&self) -> usize {
        self.events.lock().retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().retained.is_empty()
    }

    /// Every call recorded since creation or the last `clear`, retained or not
    pub fn total_recorded(&self) -> u64 {
        self.events.lock().total
    }

    pub fn clear(&self) {
        let mut events = self.events.lock();
        events.retained.clear();
        events.total = 0;
    }

    /// Every motor command in order, across all ports
    pub fn motor_commands(&self) -> Vec<(MotorPort, MotorCommand)> {
        self.events
            .lock()
            .retained
            .iter()
            .filter_map(|event| match event {
                HardwareEvent::Motor { port, command } => Some((*port, *command)),
                _ => None,
            })
            .collect()
    }

    /// Motor commands sent to one port
    pub fn commands_for(&self, port: MotorPort) -> Vec<MotorCommand> {
        self.motor_commands()
            .into_iter()
            .filter(|(p, _)| *p == port)
            .map(|(_, command)| command)
            .collect()
    }

    /// Text drawn on the LCD, in order
    pub fn lcd_texts(&self) -> Vec<String> {
        self.events
            .lock()
            .retained
            .iter()
            .filter_map(|event| match event {
                HardwareEvent::LcdText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Status light patterns, in order
    pub fn led_patterns(&self) -> Vec<LedPattern> {
        self.events
            .lock()
            .retained
            .iter()
            .filter_map(|event| match event {
                HardwareEvent::Led(pattern) => Some(*pattern),
                _ => None,
            })
            .collect()
    }

    pub fn sample_count(&self) -> usize {
        self.events
            .lock()
            .retained
            .iter()
            .filter(|event| matches!(event, HardwareEvent::Sample { .. }))
            .count()
    }

    pub fn contains(&self, event: &HardwareEvent) -> bool {
        self.events.lock().retained.iter().any(|e| e == event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters() {
        let log = EventLog::new();
        log.record(HardwareEvent::Motor {
            port: MotorPort::B,
            command: MotorCommand::SetSpeed(400),
        });
        log.record(HardwareEvent::LcdText {
            text: "Hello World".to_string(),
            x: 0,
            y: 0,
        });
        log.record(HardwareEvent::Motor {
            port: MotorPort::C,
            command: MotorCommand::Forward,
        });
        log.record(HardwareEvent::Led(LedPattern::Green));

        assert_eq!(log.len(), 4);
        assert_eq!(log.commands_for(MotorPort::B), vec![MotorCommand::SetSpeed(400)]);
        assert_eq!(log.commands_for(MotorPort::C), vec![MotorCommand::Forward]);
        assert_eq!(log.lcd_texts(), vec!["Hello World".to_string()]);
        assert_eq!(log.led_patterns(), vec![LedPattern::Green]);

        let shared = log.clone();
        shared.clear();
        assert!(log.is_empty());
        assert_eq!(log.total_recorded(), 0);
    }

    #[test]
    fn test_bounded_log_keeps_latest() {
        let log = EventLog::bounded(3);
        for meters in [0.1, 0.2, 0.3, 0.4, 0.5] {
            log.record(HardwareEvent::Sample {
                port: SensorPort::S4,
                meters,
            });
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.total_recorded(), 5);
        assert_eq!(
            log.snapshot().first(),
            Some(&HardwareEvent::Sample {
                port: SensorPort::S4,
                meters: 0.3
            })
        );

        for _ in 0..100 {
            log.record(HardwareEvent::LcdClear);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.sample_count(), 0);
        assert_eq!(log.total_recorded(), 105);
    }

    #[test]
    fn test_unbounded_log_keeps_everything() {
        let log = EventLog::new();
        for _ in 0..50 {
            log.record(HardwareEvent::LcdClear);
        }
        assert_eq!(log.len(), 50);
        assert_eq!(log.total_recorded(), 50);
    }
}
