use std::net::SocketAddr;

/// Errors that stop the server from starting or running.
///
/// Failures while answering a single request never surface here; they
/// become error responses.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("cannot listen on {addr}: {source}")]
	Bind {
		addr: SocketAddr,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid listen address {0:?}")]
	Address(String),

	#[error("cannot load prelude script: {0}")]
	Prelude(#[from] ltng_render::ScriptError),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
