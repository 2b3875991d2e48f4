//! # ltng-commands
//!
//! The `ltng` command-line tool.
//!
//! ```bash
//! ltng --mode=ssr --port=8080        # render pages per request
//! ltng --mode=ssg --build            # write the static site to ./dist
//! ltng --mode=ssg --serve            # build, then serve ./dist
//! ltng bundle                        # write the [[bundle]] targets
//! ltng transpile src/app.js          # print a module as a classic script
//! ```
//!
//! Settings come from `ltng.toml`, `LTNG_*` environment variables and the
//! flags above, in that order of precedence (flags win).

mod cli;
mod commands;
mod error;
mod logging;

pub use cli::{Cli, Command};
pub use commands::{build_site, load_settings, run, run_bundles, serve, transpile_file};
pub use error::{CommandError, CommandResult};
pub use logging::init_logging;
