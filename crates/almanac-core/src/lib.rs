//! Almanac core: configuration, shared errors and tracing setup.

pub mod config;
pub mod error;
pub mod logging;
