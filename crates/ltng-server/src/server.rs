//! HTTP/1.1 connection loop

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::error::{ServerError, ServerResult};
use crate::handler::Handler;
use crate::message::{Request, Response};
use crate::shutdown::ShutdownCoordinator;

/// Serves a [`Handler`] over HTTP/1.1.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use ltng_conf::Settings;
/// use ltng_server::{DevHandler, DevServer, ShutdownCoordinator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = Settings::default();
/// let handler = Arc::new(DevHandler::from_settings(&settings)?);
/// let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
/// coordinator.shutdown_on_ctrl_c();
/// DevServer::new(handler)
/// 	.listen_with_shutdown(settings.address().parse()?, coordinator)
/// 	.await?;
/// # Ok(())
/// # }
/// ```
pub struct DevServer {
	handler: Arc<dyn Handler>,
}

impl DevServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	pub fn handler(&self) -> Arc<dyn Handler> {
		Arc::clone(&self.handler)
	}

	/// Binds `addr` and serves until `coordinator` signals shutdown.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> ServerResult<()> {
		let listener = TcpListener::bind(addr)
			.await
			.map_err(|source| ServerError::Bind { addr, source })?;
		self.serve(listener, coordinator).await
	}

	/// Serves connections accepted on an already bound listener.
	///
	/// Stops accepting when `coordinator` signals shutdown; connections
	/// still open at that point are dropped.
	pub async fn serve(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> ServerResult<()> {
		let local_addr = listener.local_addr()?;
		tracing::info!(address = %local_addr, "server listening on http://{local_addr}");

		let mut shutdown = coordinator.subscribe();
		if coordinator.is_shutting_down() {
			coordinator.notify_shutdown_complete();
			return Ok(());
		}

		loop {
			tokio::select! {
				accepted = listener.accept() => {
					let (stream, remote_addr) = match accepted {
						Ok(accepted) => accepted,
						Err(err) => {
							tracing::warn!(error = %err, "failed to accept connection");
							continue;
						}
					};
					let handler = Arc::clone(&self.handler);
					let mut connection_shutdown = coordinator.subscribe();
					tokio::spawn(async move {
						tokio::select! {
							result = Self::handle_connection(stream, remote_addr, handler) => {
								if let Err(err) = result {
									tracing::debug!(remote = %remote_addr, error = %err, "connection closed with error");
								}
							}
							_ = connection_shutdown.recv() => {}
						}
					});
				}
				_ = shutdown.recv() => {
					tracing::info!("shutdown requested, no longer accepting connections");
					break;
				}
			}
		}

		coordinator.notify_shutdown_complete();
		Ok(())
	}

	pub async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
	) -> Result<(), hyper::Error> {
		let service = RequestService {
			handler,
			remote_addr,
		};
		http1::Builder::new()
			.serve_connection(TokioIo::new(stream), service)
			.await
	}
}

struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = http::Error;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = Arc::clone(&self.handler);
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let started = Instant::now();
			let (parts, _body) = req.into_parts();
			let mut request = Request::new(parts.method, parts.uri);
			request.headers = parts.headers;
			request.remote_addr = Some(remote_addr);

			let method = request.method.clone();
			let path = request.path().to_string();
			let response = match handler.handle(request).await {
				Ok(response) => response,
				Err(err) => {
					tracing::error!(%method, %path, error = %err, "handler failed");
					Response::internal_server_error()
				}
			};
			tracing::info!(
				%method,
				%path,
				status = response.status.as_u16(),
				elapsed_ms = started.elapsed().as_millis() as u64,
				"request"
			);

			let mut builder = hyper::Response::builder().status(response.status);
			if let Some(headers) = builder.headers_mut() {
				headers.extend(response.headers);
			}
			builder.body(Full::new(response.body))
		})
	}
}
