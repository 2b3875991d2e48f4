//! In-memory document the page scripts build

pub use ltng_dom::*;
