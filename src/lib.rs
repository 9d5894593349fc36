//! Unfurl - URL metadata resolution service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod cache;
pub mod config;
pub mod error;
pub mod render;
pub mod resolution;
pub mod resolver;
pub mod server;
pub mod state;
pub mod upstream;
