//! Request and response values passed to handlers

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode, Uri};

/// An incoming request, without its body.
#[derive(Debug, Clone)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub headers: HeaderMap,
	pub remote_addr: Option<SocketAddr>,
}

impl Request {
	pub fn new(method: Method, uri: Uri) -> Self {
		Self {
			method,
			uri,
			headers: HeaderMap::new(),
			remote_addr: None,
		}
	}

	/// Path part of the URI, still percent-encoded.
	pub fn path(&self) -> &str {
		self.uri.path()
	}
}

/// A complete response.
///
/// # Examples
///
/// ```
/// use ltng_server::Response;
/// use http::StatusCode;
///
/// let response = Response::ok().with_content_type("text/css").with_body("p {}");
/// assert_eq!(response.status, StatusCode::OK);
/// assert_eq!(response.content_type(), Some("text/css"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND).with_body("Not found")
	}

	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN).with_body("Forbidden")
	}

	pub fn method_not_allowed() -> Self {
		Self::new(StatusCode::METHOD_NOT_ALLOWED)
			.with_header("allow", "GET, HEAD")
			.with_body("Method not allowed")
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR).with_body("Internal Server Error")
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Sets a header; invalid names or values are ignored.
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn with_content_type(self, content_type: &str) -> Self {
		self.with_header(CONTENT_TYPE.as_str(), content_type)
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
	}

	/// Body as text, lossily decoded.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}
