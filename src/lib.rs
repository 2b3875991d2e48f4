//! # ltng
//!
//! Server-side rendering, static site generation and module transpilation
//! for the ltng vanilla JavaScript component framework.
//!
//! Pages are plain HTML files whose scripts build the UI with DOM calls.
//! This crate runs those scripts against an in-memory document and writes
//! the resulting markup back into the page, either per request (SSR) or
//! once for a whole site (SSG).
//!
//! ## Feature Flags
//!
//! - `core`: the rendering pipeline ([`dom`], [`transpile`], [`render`],
//!   [`static_site`])
//! - `server` (default): adds [`conf`] and the dev [`server`]
//! - `commands`: adds the `ltng` command-line entry points in [`commands`]
//!
//! ## Example
//!
//! ```
//! use std::path::Path;
//! use ltng::{RenderOptions, Renderer};
//!
//! let renderer = Renderer::new(RenderOptions::new("/site/src", "/site"));
//! let html = "<html><head></head><body><script>\
//! 	document.body.appendChild(document.createElement('main'));\
//! 	</script></body></html>";
//! let output = renderer.render_str(html, Path::new("/site/src/index.html")).unwrap();
//! assert!(output.html.contains("<body><main></main><script>"));
//! ```

#[cfg(feature = "core")]
pub mod dom;
#[cfg(feature = "core")]
pub mod render;
#[cfg(feature = "core")]
pub mod static_site;
#[cfg(feature = "core")]
pub mod transpile;

#[cfg(feature = "server")]
pub mod conf;
#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "commands")]
pub mod commands;

#[cfg(feature = "core")]
pub use ltng_dom::{Document, DomError, NodeId};
#[cfg(feature = "core")]
pub use ltng_render::{
	Diagnostic, RenderError, RenderOptions, RenderOutput, Renderer, ScriptEnvironment,
};
#[cfg(feature = "core")]
pub use ltng_static::{BuildReport, OutputLayout, SiteBuilder, StaticError};
#[cfg(feature = "core")]
pub use ltng_transpile::{ImportMap, PathResolver, TranspileError, Transpiler};

#[cfg(feature = "server")]
pub use ltng_conf::{Mode, Settings, SettingsLoader};
#[cfg(feature = "server")]
pub use ltng_server::{DevHandler, DevServer, ShutdownCoordinator};
