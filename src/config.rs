//! Sort configuration
//!
//! Defaults reproduce the reference behavior: a 30 MB memory budget and a
//! batch bound estimated once from the first record.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, IoContext, Result};

/// Default memory ceiling for Phase I batches (bytes)
pub const DEFAULT_MEMORY_BUDGET: usize = 30 * 1_000_000;
/// Default key token prefix (`id42`)
pub const DEFAULT_KEY_PREFIX: &str = "id";
/// Default capacity of every BufReader/BufWriter
pub const DEFAULT_IO_BUFFER: usize = 64 * 1024;

/// How the Phase I batch decides it is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchStrategy {
    /// Fixed record count = budget / (2 × first record length), never revised.
    ///
    /// Real memory use can exceed the budget when later records are longer
    /// than the first one.
    #[default]
    FirstRecordEstimate,
    /// Cumulative byte counter per batch (2 bytes per input byte)
    ByteBudget,
}

impl std::str::FromStr for BatchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first_record_estimate" | "estimate" => Ok(BatchStrategy::FirstRecordEstimate),
            "byte_budget" | "strict" => Ok(BatchStrategy::ByteBudget),
            other => Err(Error::config(format!("unknown batch strategy: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Byte ceiling for records resident during Phase I
    pub memory_budget_bytes: usize,
    pub batch_strategy: BatchStrategy,
    /// Literal prefix of every key token
    pub key_prefix: String,
    pub io_buffer_bytes: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET,
            batch_strategy: BatchStrategy::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            io_buffer_bytes: DEFAULT_IO_BUFFER,
        }
    }
}

// Configuration from environment
fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_usize(name: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| Error::config(format!("{name} must be an unsigned integer, got {value:?}")))
}

impl SortConfig {
    /// Defaults overlaid with `EXTMEM_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Overlay `EXTMEM_*` environment variables on this config
    pub fn with_env(mut self) -> Result<Self> {
        if let Some(v) = get_env("EXTMEM_MEMORY_BUDGET") {
            self.memory_budget_bytes = parse_usize("EXTMEM_MEMORY_BUDGET", &v)?;
        }
        if let Some(v) = get_env("EXTMEM_BATCH_STRATEGY") {
            self.batch_strategy = v.parse()?;
        }
        if let Some(v) = get_env("EXTMEM_KEY_PREFIX") {
            self.key_prefix = v;
        }
        if let Some(v) = get_env("EXTMEM_IO_BUFFER") {
            self.io_buffer_bytes = parse_usize("EXTMEM_IO_BUFFER", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).at(path)?;
        let config: SortConfig = serde_json::from_str(&text)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// JSON file (or defaults) with `EXTMEM_*` variables overlaid
    pub fn load(json: Option<&Path>) -> Result<Self> {
        let config = match json {
            Some(path) => Self::from_json_file(path)?.with_env()?,
            None => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.memory_budget_bytes == 0 {
            return Err(Error::config("memory budget must be non-zero"));
        }
        if self.key_prefix.is_empty() {
            return Err(Error::config("key prefix must not be empty"));
        }
        if self.io_buffer_bytes == 0 {
            return Err(Error::config("I/O buffer size must be non-zero"));
        }
        Ok(())
    }

    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget_bytes = bytes;
        self
    }

    pub fn with_batch_strategy(mut self, strategy: BatchStrategy) -> Self {
        self.batch_strategy = strategy;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}
