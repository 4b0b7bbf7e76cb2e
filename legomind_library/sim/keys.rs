use super::event_log::{EventLog, HardwareEvent};
use crossbeam::channel::{Receiver, Sender};
use legomind_core::hal::{Button, Keys};
use legomind_core::{LegoError, LegoResult};
use std::collections::VecDeque;
use std::time::Duration;

/// Keys fed from a channel; the sending side decides what counts as a press
///
/// The binary forwards Enter on stdin and Ctrl-C into the sender.
pub struct ChannelKeys {
    presses: Receiver<Button>,
    log: EventLog,
}

impl ChannelKeys {
    pub fn new(log: EventLog) -> (Sender<Button>, Self) {
        let (tx, rx) = crossbeam::channel::unbounded();
        (tx, Self { presses: rx, log })
    }
}

impl Keys for ChannelKeys {
    fn wait_for_any_press(&mut self) -> LegoResult<Button> {
        let button = self.presses.recv().map_err(|_| {
            LegoError::hardware("keys", "button input closed before any press")
        })?;
        self.log.record(HardwareEvent::KeyPress(button));
        Ok(button)
    }
}

/// Keys that press themselves after scripted delays
pub struct ScriptedKeys {
    presses: VecDeque<(Duration, Button)>,
    log: EventLog,
}

impl ScriptedKeys {
    pub fn new(log: EventLog) -> Self {
        Self {
            presses: VecDeque::new(),
            log,
        }
    }

    /// Press `button` once `delay` has passed since the wait started
    pub fn press_after(mut self, delay: Duration, button: Button) -> Self {
        self.presses.push_back((delay, button));
        self
    }
}

impl Keys for ScriptedKeys {
    fn wait_for_any_press(&mut self) -> LegoResult<Button> {
        let (delay, button) = self
            .presses
            .pop_front()
            .ok_or_else(|| LegoError::hardware("keys", "no scripted press left"))?;
        std::thread::sleep(delay);
        self.log.record(HardwareEvent::KeyPress(button));
        Ok(button)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_keys() {
        let log = EventLog::new();
        let (tx, mut keys) = ChannelKeys::new(log.clone());
        tx.send(Button::Enter).unwrap();
        assert_eq!(keys.wait_for_any_press().unwrap(), Button::Enter);

        drop(tx);
        assert!(keys.wait_for_any_press().is_err());
        assert!(log.contains(&HardwareEvent::KeyPress(Button::Enter)));
    }

    #[test]
    fn test_scripted_keys() {
        let mut keys = ScriptedKeys::new(EventLog::new())
            .press_after(Duration::from_millis(1), Button::Escape);
        assert_eq!(keys.wait_for_any_press().unwrap(), Button::Escape);
        assert!(keys.wait_for_any_press().is_err());
    }
}
