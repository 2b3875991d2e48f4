//! Module plumbing for the ltng rendering pipeline
//!
//! This crate turns ES module source into flat scripts that communicate
//! through properties of a shared scope object, and resolves the module
//! specifiers those scripts reference.
//!
//! - [`ImportMap`] - document-scoped specifier overrides
//! - [`PathResolver`] - specifier to file resolution
//! - [`Transpiler`] - `import`/`export` rewriting
//! - [`scanner`] - dependency and asset reference discovery
//! - [`minify`] - comment and whitespace stripping for bundles
//!
//! Everything here works on text with regular expressions. It is not a
//! JavaScript parser: nested braces inside import or export clauses are
//! reported as [`TranspileWarning`]s instead of being handled.

mod error;
mod import_map;
mod minify;
mod resolver;
pub mod scanner;
mod transpiler;

pub use error::{TranspileError, TranspileResult};
pub use import_map::{ImportMap, ImportTarget};
pub use minify::minify;
pub use resolver::{PathResolver, Resolution, is_remote_specifier, normalize_path, relative_path};
pub use transpiler::{TranspileOptions, TranspileOutput, TranspileWarning, Transpiler, file_url};
