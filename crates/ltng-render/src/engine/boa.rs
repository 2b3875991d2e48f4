//! boa_engine backed [`ScriptEngine`]
//!
//! `boa_engine::Context` is `!Send`, so a [`BoaEngine`] must be created and
//! dropped on the thread that uses it. The server wraps each render in
//! `spawn_blocking` for this reason.

use std::cell::RefCell;
use std::rc::Rc;

use boa_engine::property::Attribute;
use boa_engine::{Context, JsError, JsResult, JsString, JsValue, Source, js_string};
use ltng_dom::Document;

use super::host::{self, DomHandle};
use super::{EngineFactory, ScriptEngine, ScriptEnvironment};
use crate::error::{ScriptError, ScriptResult};

/// Browser-like globals layered over the host functions
const DOM_PRELUDE: &str = include_str!("js/dom_prelude.js");

/// Runs page scripts in a boa `Context` against a shared mock document.
pub struct BoaEngine {
	context: Context,
	dom: Rc<RefCell<Document>>,
}

impl BoaEngine {
	/// Creates a context with a fresh document and the DOM globals installed.
	///
	/// Prelude scripts from `environment` are not run here; the renderer
	/// executes them so their failures are reported like any other script.
	pub fn new(environment: &ScriptEnvironment) -> ScriptResult<Self> {
		let dom = Rc::new(RefCell::new(Document::new()));
		let mut context = Context::default();

		host::register(&mut context, DomHandle::new(Rc::clone(&dom)))
			.map_err(|e| ScriptError::Init(js_error_to_string(e, &mut context)))?;

		let env = serde_json::json!({
			"location": environment.location(),
			"seed": environment.random_seed(),
			"globals": environment.globals(),
			"fixedTime": environment.fixed_time(),
		});
		context
			.register_global_property(
				js_string!("__ltng_env"),
				JsString::from(env.to_string().as_str()),
				Attribute::all(),
			)
			.map_err(|e| ScriptError::Init(js_error_to_string(e, &mut context)))?;

		context
			.eval(Source::from_bytes(DOM_PRELUDE))
			.map_err(|e| ScriptError::Init(js_error_to_string(e, &mut context)))?;

		tracing::trace!(location = environment.location(), "script engine ready");
		Ok(Self { context, dom })
	}
}

impl ScriptEngine for BoaEngine {
	fn execute(&mut self, source: &str, origin: &str) -> ScriptResult<()> {
		let result = self.context.eval(Source::from_bytes(source));
		// Settle promise continuations queued by the script
		let jobs = self.context.run_jobs();
		settle(result, jobs, origin, &mut self.context)
	}

	fn document(&self) -> Document {
		self.dom.borrow().clone()
	}
}

/// Creates a [`BoaEngine`] per render.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoaEngineFactory;

impl EngineFactory for BoaEngineFactory {
	fn create(&self, environment: &ScriptEnvironment) -> ScriptResult<Box<dyn ScriptEngine>> {
		Ok(Box::new(BoaEngine::new(environment)?))
	}
}

/// Combines the outcome of a script with that of the jobs it queued.
///
/// A script error wins; a job error on top of it is only logged.
fn settle(
	result: JsResult<JsValue>,
	jobs: JsResult<()>,
	origin: &str,
	context: &mut Context,
) -> ScriptResult<()> {
	let failed = |error: JsError, context: &mut Context| ScriptError::Execution {
		origin: origin.to_string(),
		message: js_error_to_string(error, context),
	};
	match (result, jobs) {
		(Ok(_), Ok(())) => Ok(()),
		(Ok(_), Err(job)) => Err(failed(job, context)),
		(Err(error), jobs) => {
			if let Err(job) = jobs {
				tracing::warn!(
					origin,
					error = %js_error_to_string(job, context),
					"queued job failed after script error"
				);
			}
			Err(failed(error, context))
		}
	}
}

/// Convert a JavaScript error to a human-readable string.
fn js_error_to_string(error: JsError, context: &mut Context) -> String {
	error
		.to_opaque(context)
		.to_string(context)
		.map(|s| s.to_std_string_escaped())
		.unwrap_or_else(|_| "Unknown JavaScript error".to_string())
}
