//! Configuration Error Types
//!
//! Errors raised while building or loading a [`PoolConfig`](super::PoolConfig).
//! All of them surface before any partitioning or pool work begins.

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A numeric setting is out of range
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: &'static str,
        value: u64,
        context: String,
    },

    /// The queue must hold at least one task per worker
    #[error("Max queue length {max_queue_length} is smaller than worker count {worker_count}")]
    QueueShorterThanWorkers {
        max_queue_length: usize,
        worker_count: usize,
    },

    /// Reading or deserializing a configuration source failed
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

impl ConfigurationError {
    /// Create an invalid value error
    pub fn invalid_value(field: &'static str, value: u64, context: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value,
            context: context.into(),
        }
    }

    /// Name of the offending field, when the error concerns a single field
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidValue { field, .. } => Some(*field),
            Self::QueueShorterThanWorkers { .. } => Some("max_queue_length"),
            Self::Load(_) => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;
