//! Static site output: asset copying, path rewriting and bundles

pub use ltng_static::*;
