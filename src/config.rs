// Simulation configuration

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::FeedError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub desk_count: usize,
    // Wall-clock length of the run
    pub window_ms: u64,
    // Arrival actor wakes once per tick
    pub tick_ms: u64,
    // Chance of one passenger joining the queue on a tick
    pub arrival_probability: f64,
    pub queue_capacity: usize,
    pub max_bag_dimension: f64,
    pub max_bag_weight: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            desk_count: 3,
            window_ms: 15_000,
            tick_ms: 1,
            arrival_probability: 0.001,
            queue_capacity: 64,
            max_bag_dimension: 1.0,
            max_bag_weight: 40.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, FeedError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FeedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), FeedError> {
        if self.desk_count == 0 {
            return Err(FeedError::Config("desk_count must be at least 1".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(FeedError::Config("queue_capacity must be at least 1".to_string()));
        }
        if self.tick_ms == 0 {
            return Err(FeedError::Config("tick_ms must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.arrival_probability) {
            return Err(FeedError::Config(format!(
                "arrival_probability {} is outside [0, 1]",
                self.arrival_probability
            )));
        }
        if !(self.max_bag_dimension >= 0.0 && self.max_bag_weight >= 0.0) {
            return Err(FeedError::Config("baggage bounds must be non-negative".to_string()));
        }
        Ok(())
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
