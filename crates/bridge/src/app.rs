//! Normalized application callables and entry-point shapes.

use std::any::Any;
use std::sync::Arc;

use futures::future::BoxFuture;
use gangway_env::{Environment, MutationError};
use thiserror::Error;

use crate::builder::AppBuilder;

/// Outcome of one hosted-application invocation. The application receives
/// the environment by value and hands it back on success.
pub type AppResult = Result<Environment, AppError>;

/// Boxed invocation future.
pub type AppFuture = BoxFuture<'static, AppResult>;

/// The normalized callable: one asynchronous call over the environment.
/// Built once per distinct descriptor and immutable thereafter.
pub type AppFn = Arc<dyn Fn(Environment) -> AppFuture + Send + Sync>;

/// Wraps an async closure into an [`AppFn`].
pub fn app_fn<F, Fut>(f: F) -> AppFn
where
	F: Fn(Environment) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = AppResult> + Send + 'static,
{
	Arc::new(move |env| Box::pin(f(env)))
}

/// Failure reported by a hosted application.
///
/// Cancellation is a distinct outcome, never conflated with a fault: the
/// dispatcher surfaces the two as different errors.
#[derive(Debug, Error)]
pub enum AppError {
	/// The application raised an error.
	#[error(transparent)]
	Fault(#[from] anyhow::Error),

	/// The application reported cancelled rather than completed.
	#[error("the hosted application cancelled processing of the request")]
	Cancelled,
}

impl From<MutationError> for AppError {
	fn from(err: MutationError) -> Self {
		Self::Fault(anyhow::Error::new(err))
	}
}

/// Builder-style synchronous entry point: composes a pipeline on the
/// supplied builder.
pub type BuilderSyncFn = Box<dyn FnOnce(&mut AppBuilder) + Send>;

/// Builder-style asynchronous entry point: receives the builder by value and
/// hands it back once setup settles.
pub type BuilderAsyncFn = Box<dyn FnOnce(AppBuilder) -> BoxFuture<'static, Result<AppBuilder, AppError>> + Send>;

/// Type-erased entry point handed from a module to the registry.
///
/// Must contain one of the three accepted shapes — [`BuilderSyncFn`],
/// [`BuilderAsyncFn`] or [`AppFn`] — which the registry selects by downcast
/// at registration time. Anything else fails resolution with a
/// signature-mismatch error.
pub type RawEntry = Box<dyn Any + Send>;
