//! Runtime configuration
//!
//! Stored as JSON. Every field has a default, so a partial file (or none at
//! all) is valid.

use crate::chat::{CommandInsight, InsightService, StatusInsight, DEFAULT_SYSTEM_PROMPT};
use crate::error::ComputeError;
use crate::sources::{MetricSource, MockSource, ReadingsSource};
use crate::store::MetricStore;
use crate::types::Window;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "healthai.json";

/// Where metric samples come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Built-in demo series
    #[default]
    Mock,
    /// Raw readings file (JSON array or NDJSON)
    Readings { path: PathBuf },
}

impl SourceConfig {
    /// Instantiate the configured source
    pub fn open(&self) -> Result<Box<dyn MetricSource + Send>, ComputeError> {
        match self {
            SourceConfig::Mock => Ok(Box::new(MockSource)),
            SourceConfig::Readings { path } => Ok(Box::new(ReadingsSource::load(path)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    /// Window used when a command is not given `--days`
    pub default_window: Window,
    pub system_prompt: String,
    /// Program that completes chat prompts; offline replies when unset
    pub insight_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            default_window: Window::WEEK,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            insight_command: None,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default file if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ComputeError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ComputeError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insight service for chat: the configured command, or offline replies
    pub fn insight_service(
        &self,
        store: &MetricStore,
    ) -> Result<Box<dyn InsightService>, ComputeError> {
        match self.insight_command.as_deref() {
            Some(command) => Ok(Box::new(CommandInsight::from_command_line(command)?)),
            None => Ok(Box::new(StatusInsight::from_store(store))),
        }
    }
}
