//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Entry point must be a plain function name
//! - Base URL must be an absolute http(s) URL
//! - Default headers must be valid HTTP header names and values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: DispatchConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use reqwest::header::{HeaderName, HeaderValue};

use crate::config::schema::DispatchConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let entry_point = &config.main_strand.entry_point;
    if entry_point.is_empty() {
        errors.push(ValidationError::new("main_strand.entry_point", "must not be empty"));
    } else if !is_identifier(entry_point) {
        errors.push(ValidationError::new(
            "main_strand.entry_point",
            format!("'{}' is not a function name", entry_point),
        ));
    }

    match url::Url::parse(&config.client.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            "client.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("client.base_url", e.to_string())),
    }

    for (name, value) in &config.client.default_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                "client.default_headers",
                format!("invalid header name '{}'", name),
            ));
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(
                "client.default_headers",
                format!("invalid value for header '{}'", name),
            ));
        }
    }

    if let Some(agent) = &config.client.user_agent {
        if HeaderValue::from_str(agent).is_err() {
            errors.push(ValidationError::new("client.user_agent", "invalid header value"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
