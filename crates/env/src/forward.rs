//! Forwarding hook signatures injected at per-request construction.
//!
//! The dispatcher adapts the host's callbacks into these closures and hands
//! them to [`Environment`](crate::Environment),
//! [`ResponseHeaders`](crate::ResponseHeaders) and
//! [`ResponseStream`](crate::ResponseStream) at construction time. The
//! contract layer never sees the host directly.

use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::error::ForwardError;

/// Forwards a status-code assignment to the host.
pub type StatusFn = Arc<dyn Fn(u16) -> BoxFuture<'static, Result<(), ForwardError>> + Send + Sync>;

/// Forwards one body chunk to the host.
pub type WriteFn = Arc<dyn Fn(Bytes) -> BoxFuture<'static, Result<(), ForwardError>> + Send + Sync>;

/// Forwards the full value list for one response header to the host.
pub type SetHeaderFn = Arc<dyn Fn(String, Vec<String>) -> BoxFuture<'static, Result<(), ForwardError>> + Send + Sync>;

/// Forwards removal of one response header to the host.
pub type RemoveHeaderFn = Arc<dyn Fn(String) -> BoxFuture<'static, Result<(), ForwardError>> + Send + Sync>;

/// Forwards removal of all response headers to the host.
pub type RemoveAllHeadersFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), ForwardError>> + Send + Sync>;

/// The header forwarding hooks, bundled for constructor injection.
#[derive(Clone)]
pub struct HeaderForwarders {
	/// Set/replace hook.
	pub set: SetHeaderFn,
	/// Single-header removal hook.
	pub remove: RemoveHeaderFn,
	/// Remove-all hook.
	pub remove_all: RemoveAllHeadersFn,
}

impl HeaderForwarders {
	/// Forwarders that discard every mutation. Useful for detached header
	/// handles in tests and setup code that never reaches a host.
	#[must_use]
	pub fn discard() -> Self {
		Self {
			set: Arc::new(|_, _| Box::pin(async { Ok(()) })),
			remove: Arc::new(|_| Box::pin(async { Ok(()) })),
			remove_all: Arc::new(|| Box::pin(async { Ok(()) })),
		}
	}
}

impl std::fmt::Debug for HeaderForwarders {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("HeaderForwarders")
	}
}
