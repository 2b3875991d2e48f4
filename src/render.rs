//! Running page scripts and splicing the result into the page

pub use ltng_render::*;
