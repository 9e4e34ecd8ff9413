//! Library side of the `xtrace` command: logging setup and configuration.

#![deny(unsafe_code)]

pub mod config;
pub mod logging;
