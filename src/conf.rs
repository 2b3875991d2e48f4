//! Layered settings

pub use ltng_conf::*;
