//! Static output for ltng projects
//!
//! - [`SiteBuilder`] pre-renders every page into an output directory and
//!   copies the files those pages reference ([`AssetScanner`])
//! - [`rewrite_page`] and [`OutputLayout`] map source references to output
//!   locations
//! - [`ScriptBundler`] and [`CssBundler`] produce flat `*.min.js` and
//!   `*.min.css` bundles

mod assets;
mod bundle;
mod error;
mod layout;
mod rewrite;
mod site;

pub use assets::{AssetCopy, AssetScanner, AssetSet};
pub use bundle::{
	BundleReport, BundleSpec, CssBundler, CssReport, REGISTRY_FILE, RUNTIME_FILE, ScriptBundler,
};
pub use error::{StaticError, StaticResult};
pub use layout::OutputLayout;
pub use rewrite::rewrite_page;
pub use site::{BuildReport, PageReport, SiteBuilder};
