//! Binary-side wiring: configuration and terminal output.

pub(crate) mod config;
pub(crate) mod terminal;
