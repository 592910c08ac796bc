//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route prefixes are anchored and unique
//! - Check backend targets are absolute http URLs
//! - Validate value ranges (timeouts > 0, ordering between them)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("route #{index}: prefix must not be empty")]
    EmptyPrefix { index: usize },

    #[error("route {prefix:?}: prefix must start with '/'")]
    UnanchoredPrefix { prefix: String },

    #[error("route {prefix:?}: prefix declared more than once")]
    DuplicatePrefix { prefix: String },

    #[error("route {prefix:?}: target {target:?} is invalid: {reason}")]
    InvalidTarget {
        prefix: String,
        target: String,
        reason: String,
    },

    #[error("timeouts: {name} must be greater than zero")]
    ZeroTimeout { name: &'static str },

    #[error("timeouts: request_secs ({request}) must exceed upstream_secs ({upstream})")]
    TimeoutOrdering { request: u64, upstream: u64 },
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.prefix.is_empty() {
            errors.push(ValidationError::EmptyPrefix { index });
            continue;
        }
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::UnanchoredPrefix {
                prefix: route.prefix.clone(),
            });
        }
        if !seen.insert(route.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix {
                prefix: route.prefix.clone(),
            });
        }
        if let Some(reason) = target_problem(&route.target) {
            errors.push(ValidationError::InvalidTarget {
                prefix: route.prefix.clone(),
                target: route.target.clone(),
                reason,
            });
        }
    }

    for (name, value) in [
        ("connect_secs", config.timeouts.connect_secs),
        ("upstream_secs", config.timeouts.upstream_secs),
        ("request_secs", config.timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout { name });
        }
    }
    if config.timeouts.request_secs <= config.timeouts.upstream_secs {
        errors.push(ValidationError::TimeoutOrdering {
            request: config.timeouts.request_secs,
            upstream: config.timeouts.upstream_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The upstream leg speaks plain HTTP to fixed targets.
fn target_problem(target: &str) -> Option<String> {
    match Url::parse(target) {
        Ok(url) => {
            if url.scheme() != "http" {
                Some(format!("unsupported scheme {:?}", url.scheme()))
            } else if url.host_str().is_none() {
                Some("missing host".to_string())
            } else {
                None
            }
        }
        Err(e) => Some(e.to_string()),
    }
}
