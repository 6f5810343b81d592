//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and cross-field consistency
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: PoolConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system

use crate::config::schema::PoolConfig;

/// One semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("pool.active_connections must be at least 1")]
    NoActiveConnections,

    #[error("heartbeat interval bounds are inverted ({min}..{max})")]
    InvertedJitterBounds { min: u64, max: u64 },

    #[error("balancing.cycle must be at least 1")]
    EmptyCycle,

    #[error("balancing.weights has {got} entries, expected {expected}")]
    WeightCountMismatch { got: usize, expected: usize },

    #[error("balancing.weights must be positive and non-decreasing")]
    MalformedWeights,
}

pub fn validate_config(config: &PoolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pool.active_connections == 0 {
        errors.push(ValidationError::NoActiveConnections);
    }

    let heartbeat = &config.heartbeat;
    if heartbeat.interval_min_secs > heartbeat.interval_max_secs {
        errors.push(ValidationError::InvertedJitterBounds {
            min: heartbeat.interval_min_secs,
            max: heartbeat.interval_max_secs,
        });
    }

    let balancing = &config.balancing;
    if balancing.cycle == 0 {
        errors.push(ValidationError::EmptyCycle);
    }
    if balancing.weights.len() != balancing.cycle {
        errors.push(ValidationError::WeightCountMismatch {
            got: balancing.weights.len(),
            expected: balancing.cycle,
        });
    } else if balancing.weights.iter().any(|&w| w == 0)
        || balancing.weights.windows(2).any(|pair| pair[0] > pair[1])
    {
        errors.push(ValidationError::MalformedWeights);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
