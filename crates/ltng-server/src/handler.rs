use async_trait::async_trait;

use crate::error::ServerResult;
use crate::message::{Request, Response};

/// Answers requests.
///
/// An `Err` is logged by the server and answered with a 500 response.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> ServerResult<Response>;
}
