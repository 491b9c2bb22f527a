//! CLI command implementations.

pub mod common;
pub mod config;
pub mod coords;
pub mod resolve;
pub mod video;
