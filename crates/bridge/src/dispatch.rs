//! Per-request dispatch across the runtime boundary.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use gangway_env::{
	EnvHooks, Environment, ForwardError, HeaderForwarders, HeaderMap, PendingEffects, RemoveAllHeadersFn,
	RemoveHeaderFn, RequestBody, ResponseHeaders, ResponseStream, SetHeaderFn, StatusFn, Value, WriteFn, keys,
};

use crate::app::AppError;
use crate::host::{HostHeaderValue, HostRequest, HostResponse};
use crate::registry::{AppHandle, AppRegistry};

/// The host's continuation decision after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
	/// The application produced the response; the host sends it as-is.
	Complete,
	/// The application deferred handling; the host continues its own
	/// pipeline as if the bridge were absent.
	Continue,
}

impl Continuation {
	/// Returns true when the host should keep running its own pipeline.
	#[must_use]
	pub const fn should_continue(self) -> bool {
		matches!(self, Self::Continue)
	}
}

/// Dispatch failures, surfaced to the host. The bridge retries nothing; the
/// host decides retry or error-response policy.
#[derive(Debug, Error)]
pub enum DispatchError {
	/// The handle does not name a registered application.
	#[error("no application registered for handle {0}")]
	UnknownHandle(AppHandle),

	/// The hosted application faulted during invocation.
	#[error("hosted application fault: {0}")]
	App(anyhow::Error),

	/// The hosted application reported cancelled rather than completed.
	#[error("the hosted application cancelled processing of the request")]
	Cancelled,

	/// A host forwarding callback failed while draining side effects.
	#[error(transparent)]
	Forward(#[from] ForwardError),
}

/// Drives one request through a registered application.
///
/// Per request the dispatcher builds an environment wired to the host's
/// callbacks, invokes the callable by handle, awaits settlement of every
/// queued side effect and reports the continuation decision. Many requests
/// may be in flight concurrently; each gets its own environment and effects
/// queue. There is no timeout handling: a hung application hangs its
/// request.
pub struct Dispatcher {
	registry: Arc<AppRegistry>,
}

impl Dispatcher {
	/// Creates a dispatcher over a registry.
	#[must_use]
	pub fn new(registry: Arc<AppRegistry>) -> Self {
		Self { registry }
	}

	/// The registry this dispatcher resolves handles against.
	#[must_use]
	pub fn registry(&self) -> &Arc<AppRegistry> {
		&self.registry
	}

	/// Dispatches one request to the application registered at `handle`.
	pub async fn dispatch(
		&self,
		handle: AppHandle,
		request: HostRequest,
		host: Arc<dyn HostResponse>,
	) -> Result<Continuation, DispatchError> {
		let entry = self.registry.entry(handle).ok_or(DispatchError::UnknownHandle(handle))?;

		// Building.
		tracing::debug!(%handle, method = %request.method, path = %request.path, "building request environment");
		let effects = PendingEffects::new();
		let env = build_environment(handle, request, &entry, &effects, &host);

		// Invoking.
		tracing::debug!(%handle, "invoking hosted application");
		let env = match (entry.app())(env).await {
			Ok(env) => env,
			Err(AppError::Cancelled) => {
				tracing::debug!(%handle, "hosted application cancelled");
				return Err(DispatchError::Cancelled);
			}
			Err(AppError::Fault(fault)) => {
				tracing::debug!(%handle, %fault, "hosted application faulted");
				return Err(DispatchError::App(fault));
			}
		};

		// Draining.
		effects.drain().await?;

		// Done.
		let continuation = if env.continuation() {
			Continuation::Continue
		} else {
			Continuation::Complete
		};
		tracing::debug!(%handle, ?continuation, "dispatch complete");
		Ok(continuation)
	}
}

/// Converts the host's native header structure into a [`HeaderMap`].
/// Scalar values become single-element sequences.
fn fold_headers(headers: Vec<(String, HostHeaderValue)>) -> HeaderMap {
	let mut map = HeaderMap::new();
	for (name, value) in headers {
		match value {
			HostHeaderValue::One(value) => map.append(name, value),
			HostHeaderValue::Many(values) => {
				for value in values {
					map.append(name.clone(), value);
				}
			}
		}
	}
	map
}

fn build_environment(
	handle: AppHandle,
	request: HostRequest,
	entry: &crate::registry::Entry,
	effects: &PendingEffects,
	host: &Arc<dyn HostResponse>,
) -> Environment {
	let on_status: StatusFn = {
		let host = Arc::clone(host);
		Arc::new(move |status| {
			let host = Arc::clone(&host);
			Box::pin(async move { host.set_status(status).await })
		})
	};
	let set_header: SetHeaderFn = {
		let host = Arc::clone(host);
		Arc::new(move |name: String, values: Vec<String>| {
			let host = Arc::clone(&host);
			Box::pin(async move { host.set_header(&name, &values).await })
		})
	};
	let remove_header: RemoveHeaderFn = {
		let host = Arc::clone(host);
		Arc::new(move |name: String| {
			let host = Arc::clone(&host);
			Box::pin(async move { host.remove_header(&name).await })
		})
	};
	let remove_all_headers: RemoveAllHeadersFn = {
		let host = Arc::clone(host);
		Arc::new(move || {
			let host = Arc::clone(&host);
			Box::pin(async move { host.remove_all_headers().await })
		})
	};
	let write: WriteFn = {
		let host = Arc::clone(host);
		Arc::new(move |chunk| {
			let host = Arc::clone(&host);
			Box::pin(async move { host.write(chunk).await })
		})
	};

	let response_headers = ResponseHeaders::new(
		effects.clone(),
		HeaderForwarders {
			set: set_header,
			remove: remove_header,
			remove_all: remove_all_headers,
		},
	);
	let stream = ResponseStream::new(effects.clone(), write);

	let mut seed: Vec<(String, Value)> = vec![
		(keys::REQUEST_METHOD.into(), Value::Str(request.method)),
		(keys::REQUEST_PATH.into(), Value::Str(request.path)),
		(keys::REQUEST_PATH_BASE.into(), Value::Str(request.path_base)),
		(keys::REQUEST_PROTOCOL.into(), Value::Str(request.protocol)),
		(keys::REQUEST_QUERY_STRING.into(), Value::Str(request.query_string)),
		(keys::REQUEST_SCHEME.into(), Value::Str(request.scheme)),
		(keys::REQUEST_HEADERS.into(), Value::Headers(fold_headers(request.headers))),
		(keys::REQUEST_BODY.into(), Value::RequestBody(RequestBody::from_host(request.body))),
		(keys::RESPONSE_HEADERS.into(), Value::ResponseHeaders(response_headers)),
		(keys::RESPONSE_BODY.into(), Value::Body(stream)),
		// Inert placeholder: not connected to any host-side abort mechanism.
		(keys::RESPONSE_CANCELLATION.into(), Value::Cancellation(CancellationToken::new())),
		(keys::VERSION.into(), Value::from(keys::CONTRACT_VERSION)),
		(keys::HANDLE.into(), Value::Int(handle.index() as i64)),
	];
	for (key, value) in entry.globals().iter() {
		seed.push((key.clone(), value.clone()));
	}
	// Per-request locals shadow registration-time globals.
	for (name, value) in request.locals {
		seed.push((keys::extension(&name), value));
	}

	Environment::from_seed(
		seed,
		effects.clone(),
		EnvHooks {
			on_status: Some(on_status),
		},
	)
}
