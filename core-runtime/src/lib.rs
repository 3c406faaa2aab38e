//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the OneDrive session core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! Every other crate in the workspace depends on this one for its
//! configuration type and its logging conventions.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
