//! The development server

pub use ltng_server::*;
