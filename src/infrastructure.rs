//! Infrastructure layer
//!
//! This module handles external integrations:
//! - CLI argument processing
//! - Configuration loading
//! - Relay transport
//! - Terminal input

pub mod cli;
pub mod config;
pub mod relay;
pub mod stdin;
