use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{Validate, ensure_range};

pub const DEFAULT_ROWS: usize = 11;
pub const DEFAULT_WIDE_COLUMNS: usize = 8;
pub const DEFAULT_MIN_MATCH_SIZE: usize = 3;

pub const DEFAULT_INITIAL_ROWS: usize = 4;
pub const DEFAULT_SPAWN_CHANCE: f64 = 0.5;
pub const DEFAULT_BASE_POINTS: u32 = 10;
pub const DEFAULT_BONUS_POINTS: u32 = 20;
pub const DEFAULT_SHIFT_INTERVAL_MS: u64 = 8000;
pub const DEFAULT_SHIFT_WARNING_MS: u64 = 500;
pub const DEFAULT_WIN_DELAY_MS: u64 = 1000;

pub const MAX_ROWS: usize = 32;
pub const MAX_WIDE_COLUMNS: usize = 32;
pub const MAX_MIN_MATCH_SIZE: usize = 16;

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct BoardSettings {
    pub rows: usize,
    /// Narrow rows hold one column less.
    pub wide_columns: usize,
    pub min_match_size: usize,
}

impl BoardSettings {
    pub fn narrow_columns(&self) -> usize {
        self.wide_columns.saturating_sub(1)
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            wide_columns: DEFAULT_WIDE_COLUMNS,
            min_match_size: DEFAULT_MIN_MATCH_SIZE,
        }
    }
}

impl Validate for BoardSettings {
    fn validate(&self) -> Result<(), String> {
        ensure_range("rows", self.rows, 2..=MAX_ROWS)?;
        ensure_range("wide_columns", self.wide_columns, 2..=MAX_WIDE_COLUMNS)?;
        ensure_range("min_match_size", self.min_match_size, 2..=MAX_MIN_MATCH_SIZE)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct BubbleSettings {
    pub board: BoardSettings,
    pub initial_rows: usize,
    pub spawn_chance: f64,
    pub base_points: u32,
    pub bonus_points: u32,
    pub shift_interval_ms: u64,
    pub shift_warning_ms: u64,
    pub win_delay_ms: u64,
}

impl BubbleSettings {
    pub fn shift_interval(&self) -> Duration {
        Duration::from_millis(self.shift_interval_ms)
    }

    pub fn shift_warning(&self) -> Duration {
        Duration::from_millis(self.shift_warning_ms)
    }

    pub fn win_delay(&self) -> Duration {
        Duration::from_millis(self.win_delay_ms)
    }
}

impl Default for BubbleSettings {
    fn default() -> Self {
        Self {
            board: BoardSettings::default(),
            initial_rows: DEFAULT_INITIAL_ROWS,
            spawn_chance: DEFAULT_SPAWN_CHANCE,
            base_points: DEFAULT_BASE_POINTS,
            bonus_points: DEFAULT_BONUS_POINTS,
            shift_interval_ms: DEFAULT_SHIFT_INTERVAL_MS,
            shift_warning_ms: DEFAULT_SHIFT_WARNING_MS,
            win_delay_ms: DEFAULT_WIN_DELAY_MS,
        }
    }
}

impl Validate for BubbleSettings {
    fn validate(&self) -> Result<(), String> {
        self.board.validate()?;
        if self.initial_rows > self.board.rows {
            return Err(format!(
                "initial_rows must not exceed rows ({}), got {}",
                self.board.rows, self.initial_rows
            ));
        }
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(format!(
                "spawn_chance must be between 0 and 1, got {}",
                self.spawn_chance
            ));
        }
        if self.shift_interval_ms == 0 {
            return Err("shift_interval_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}
