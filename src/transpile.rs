//! Module resolution and ES module rewriting

pub use ltng_transpile::*;
