//! Command handlers for the dsx binary.

pub mod config;
pub mod export;
