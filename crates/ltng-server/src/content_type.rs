use std::path::Path;

/// Content type served for `path`.
///
/// Pages, scripts and stylesheets get fixed types; anything else is guessed
/// from the extension and falls back to `text/plain`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use ltng_server::content_type_for;
///
/// assert_eq!(content_type_for(Path::new("app.mjs")), "text/javascript");
/// assert_eq!(content_type_for(Path::new("logo.png")), "image/png");
/// assert_eq!(content_type_for(Path::new("NOTES")), "text/plain");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
	let ext = path
		.extension()
		.and_then(|e| e.to_str())
		.map(str::to_ascii_lowercase);
	match ext.as_deref() {
		Some("html" | "htm") => "text/html",
		Some("js" | "mjs") => "text/javascript",
		Some("css") => "text/css",
		_ => mime_guess::from_path(path).first_raw().unwrap_or("text/plain"),
	}
}
