//! Page rendering for ltng
//!
//! Executes a page's scripts against a [`ltng_dom::Document`] inside a
//! JavaScript sandbox and writes the resulting markup back into the page.
//!
//! ## Pieces
//!
//! - [`ScriptExtractor`] locates `<script>` tags and the head/body regions
//! - [`ScriptEngine`] runs JavaScript; [`BoaEngine`] is the boa_engine backed
//!   implementation
//! - [`ModuleLoader`] executes ES modules in dependency order
//! - [`Renderer`] drives a whole render and reports [`Diagnostic`]s
//!
//! A render never fails because of a page script. Scripts that throw and
//! modules that cannot be found are recorded as diagnostics and the render
//! continues with what succeeded.

mod diagnostics;
mod engine;
mod error;
pub mod extract;
mod loader;
mod renderer;
mod rewrite;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use engine::{
	BoaEngine, BoaEngineFactory, EngineFactory, PreludeScript, ScriptEngine, ScriptEnvironment,
};
pub use error::{RenderError, RenderResult, ScriptError, ScriptResult};
pub use extract::{Region, RegexScriptExtractor, ScriptExtractor, ScriptKind, ScriptTag};
pub use loader::{ModuleLoader, wrap_module};
pub use renderer::{RenderOptions, RenderOutput, Renderer};
pub use rewrite::rewrite_file_urls_for_server;
