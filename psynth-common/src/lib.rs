//! # Psynth Common Library
//!
//! Shared code for the psynth services:
//! - Error types
//! - Configuration loading and output-root resolution
//! - SOAP envelope boundary utilities

pub mod config;
pub mod error;
pub mod soap;

pub use error::{Error, Result};
