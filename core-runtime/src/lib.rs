//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - The shared runtime error type
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions and configuration error reporting
//! used throughout the workspace.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
