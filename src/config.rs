//! Tunables for the dialogue engine and the line sequencer, loadable from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::Result;
use crate::graph::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    pub start_node: NodeId,
    pub history_capacity: usize,
    pub typing_interval_secs: f32,
    /// Redisplay the whole retained history, newest entry included, and then
    /// type the newest entry out again on top of it.
    pub repeat_history_on_append: bool,
    /// Stands in for the player's line when a node is entered without a
    /// choice. `None` leaves the line out.
    pub empty_choice_placeholder: Option<String>,
    pub choice_prefix: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            start_node: 1,
            history_capacity: 2,
            typing_interval_secs: 0.05,
            repeat_history_on_append: false,
            empty_choice_placeholder: Some("(none)".to_string()),
            choice_prefix: "▶ ".to_string(),
        }
    }
}

impl DialogueConfig {
    pub fn typing_interval(&self) -> Duration {
        secs(self.typing_interval_secs)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        load(path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub delay_between_lines_secs: f32,
    pub loop_sequence: bool,
    pub typing_interval_secs: f32,
    pub auto_start: bool,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            delay_between_lines_secs: 3.0,
            loop_sequence: false,
            typing_interval_secs: 0.05,
            auto_start: true,
        }
    }
}

impl SequenceConfig {
    pub fn delay_between_lines(&self) -> Duration {
        secs(self.delay_between_lines_secs)
    }

    pub fn typing_interval(&self) -> Duration {
        secs(self.typing_interval_secs)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        load(path)
    }
}

fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn secs(value: f32) -> Duration {
    // Whole microseconds, so 0.05 means exactly 50ms rather than the f32
    // approximation of it.
    if value.is_finite() && value > 0.0 {
        Duration::from_micros((f64::from(value) * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}
