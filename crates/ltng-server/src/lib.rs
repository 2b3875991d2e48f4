//! # ltng-server
//!
//! Development server for ltng projects.
//!
//! [`DevHandler`] answers requests in one of three modes:
//!
//! - **csr**: files are served as they are, optionally with scripts
//!   transpiled on the fly
//! - **ssr**: HTML pages are rendered on every request with
//!   [`ltng_render::Renderer`]
//! - **ssg**: the output of a static build is served
//!
//! [`DevServer`] runs any [`Handler`] on a hyper HTTP/1.1 connection loop
//! and stops when its [`ShutdownCoordinator`] fires.

mod content_type;
mod dev;
mod error;
mod files;
mod handler;
mod message;
mod server;
mod shutdown;

pub use content_type::content_type_for;
pub use dev::{DevConfig, DevHandler, build_renderer};
pub use error::{ServerError, ServerResult};
pub use files::{FileLookup, PARENT_SEARCH_DEPTH, PathRejection, request_file_path};
pub use handler::Handler;
pub use ltng_conf::Mode;
pub use message::{Request, Response};
pub use server::DevServer;
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
