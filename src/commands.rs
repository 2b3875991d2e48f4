//! Command-line entry points

pub use ltng_commands::*;
