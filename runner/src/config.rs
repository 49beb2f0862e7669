use std::time::Duration;

use bubble_common::config::{
    ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer, ensure_range,
};
use bubble_common::games::bubbles::BubbleSettings;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "bubble_runner_config.yaml";
pub const MAX_EVENT_LOG_SIZE: usize = 1024;

pub fn get_config_manager(
    path: &str,
) -> ConfigManager<FileContentConfigProvider, RunnerConfig, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path)
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
pub enum BotKind {
    Random,
    Greedy,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct SimulationConfig {
    pub frame_ms: u64,
    pub shot_interval_ms: u64,
    pub max_frames: u64,
    pub bot: BotKind,
    /// Pace frames with a wall-clock timer instead of running them back to back.
    #[serde(default)]
    pub realtime: bool,
    pub event_log_size: usize,
}

impl SimulationConfig {
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn shot_interval(&self) -> Duration {
        Duration::from_millis(self.shot_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_ms: 50,
            shot_interval_ms: 1500,
            max_frames: 20_000,
            bot: BotKind::Greedy,
            realtime: false,
            event_log_size: 32,
        }
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.frame_ms == 0 {
            return Err("frame_ms must be greater than 0".to_string());
        }
        if self.shot_interval_ms < self.frame_ms {
            return Err(format!(
                "shot_interval_ms must be at least frame_ms ({}), got {}",
                self.frame_ms, self.shot_interval_ms
            ));
        }
        if self.max_frames == 0 {
            return Err("max_frames must be greater than 0".to_string());
        }
        ensure_range("event_log_size", self.event_log_size, 1..=MAX_EVENT_LOG_SIZE)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy, Default)]
pub struct RunnerConfig {
    pub game: BubbleSettings,
    pub simulation: SimulationConfig,
}

impl Validate for RunnerConfig {
    fn validate(&self) -> Result<(), String> {
        self.game.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}
