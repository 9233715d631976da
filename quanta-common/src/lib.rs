//! Quanta Common - Shared configuration, logging and error types for the Quanta screener.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup
//! - Small string helpers shared by the screener and its notifiers

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{
    Config, ObservabilityConfig, ScreenerConfig, SourcesConfig, TelegramConfig, UniverseConfig,
};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};
