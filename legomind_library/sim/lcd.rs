use super::event_log::{EventLog, HardwareEvent};
use legomind_core::hal::Lcd;
use legomind_core::{LegoError, LegoResult};

/// EV3 LCD text grid: 18 columns by 8 rows
pub const LCD_COLUMNS: u32 = 18;
pub const LCD_ROWS: u32 = 8;

/// Simulated LCD keeping the text grid in memory
pub struct SimLcd {
    rows: Vec<String>,
    log: EventLog,
}

impl SimLcd {
    pub fn new(log: EventLog) -> Self {
        Self {
            rows: vec![String::new(); LCD_ROWS as usize],
            log,
        }
    }

    /// Current text of one row, trailing blanks trimmed
    pub fn row(&self, y: u32) -> Option<&str> {
        self.rows.get(y as usize).map(|r| r.trim_end())
    }
}

impl Lcd for SimLcd {
    fn clear(&mut self) -> LegoResult<()> {
        for row in &mut self.rows {
            row.clear();
        }
        self.log.record(HardwareEvent::LcdClear);
        Ok(())
    }

    fn draw_string(&mut self, text: &str, x: u32, y: u32) -> LegoResult<()> {
        let row = self.rows.get_mut(y as usize).ok_or_else(|| {
            LegoError::InvalidInput(format!("LCD row {} out of range (0-{})", y, LCD_ROWS - 1))
        })?;

        // Characters past the right edge are clipped like on the brick
        let mut cells: Vec<char> = row.chars().collect();
        let start = x as usize;
        if cells.len() < start {
            cells.resize(start, ' ');
        }
        for (i, ch) in text.chars().enumerate() {
            let col = start + i;
            if col >= LCD_COLUMNS as usize {
                break;
            }
            if col < cells.len() {
                cells[col] = ch;
            } else {
                cells.push(ch);
            }
        }
        *row = cells.into_iter().collect();

        log::debug!("LCD[{}]: {}", y, row.trim_end());
        self.log.record(HardwareEvent::LcdText {
            text: text.to_string(),
            x,
            y,
        });
        Ok(())
    }
}
