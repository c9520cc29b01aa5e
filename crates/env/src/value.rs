//! Environment value variants and host capability functions.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::body::RequestBody;
use crate::error::CapabilityError;
use crate::header::HeaderMap;
use crate::response_headers::ResponseHeaders;
use crate::stream::ResponseStream;

/// A named asynchronous function the host exposes to the hosted application
/// through the extension namespace. Calling one is an asynchronous round-trip
/// across the runtime boundary with its own error channel.
pub type HostFunction = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, CapabilityError>> + Send + Sync>;

/// Wraps an async closure into a [`HostFunction`].
pub fn host_fn<F, Fut>(f: F) -> HostFunction
where
	F: Fn(Value) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Value, CapabilityError>> + Send + 'static,
{
	Arc::new(move |value| Box::pin(f(value)))
}

/// A value stored in the environment.
///
/// Only the fixed environment-contract shapes and caller-supplied
/// scalar/function values are bridged; this is intentionally not a
/// general-purpose object-graph marshalling layer.
#[derive(Clone)]
pub enum Value {
	/// Absence of a value, the result of side-effect-only capabilities.
	Null,
	/// UTF-8 string.
	Str(String),
	/// Signed integer.
	Int(i64),
	/// Boolean.
	Bool(bool),
	/// Enum-like wrapped status code; normalized to its underlying number
	/// when assigned to `response.statusCode`.
	Status(u16),
	/// Raw bytes.
	Bytes(Bytes),
	/// Plain header map (inbound request headers).
	Headers(HeaderMap),
	/// Instrumented response header handle.
	ResponseHeaders(ResponseHeaders),
	/// Inbound body view.
	RequestBody(RequestBody),
	/// Write-only response body handle.
	Body(ResponseStream),
	/// Host capability function.
	Function(HostFunction),
	/// Cancellation signal. Inert placeholder in the current design.
	Cancellation(CancellationToken),
}

impl Value {
	/// String accessor.
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Integer accessor.
	#[must_use]
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(n) => Some(*n),
			_ => None,
		}
	}

	/// Boolean accessor.
	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Byte accessor.
	#[must_use]
	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			Self::Bytes(b) => Some(b),
			_ => None,
		}
	}

	/// Plain header map accessor.
	#[must_use]
	pub fn as_headers(&self) -> Option<&HeaderMap> {
		match self {
			Self::Headers(h) => Some(h),
			_ => None,
		}
	}

	/// Request body accessor.
	#[must_use]
	pub fn as_request_body(&self) -> Option<&RequestBody> {
		match self {
			Self::RequestBody(b) => Some(b),
			_ => None,
		}
	}

	/// Capability accessor.
	#[must_use]
	pub fn as_function(&self) -> Option<&HostFunction> {
		match self {
			Self::Function(f) => Some(f),
			_ => None,
		}
	}

	/// Returns true for [`Value::Null`].
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => f.write_str("Null"),
			Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
			Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
			Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
			Self::Status(s) => f.debug_tuple("Status").field(s).finish(),
			Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
			Self::Headers(h) => f.debug_tuple("Headers").field(h).finish(),
			Self::ResponseHeaders(_) => f.write_str("ResponseHeaders(..)"),
			Self::RequestBody(b) => f.debug_tuple("RequestBody").field(b).finish(),
			Self::Body(_) => f.write_str("Body(..)"),
			Self::Function(_) => f.write_str("Function(..)"),
			Self::Cancellation(_) => f.write_str("Cancellation(..)"),
		}
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Self::Str(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Self::Str(s)
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Self::Int(n)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<Bytes> for Value {
	fn from(b: Bytes) -> Self {
		Self::Bytes(b)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn host_fn_round_trips_values() {
		let greet = host_fn(|value| async move {
			let name = value.as_str().unwrap_or("world").to_string();
			Ok(Value::Str(format!("Hello {name}")))
		});
		let reply = (greet)(Value::from("Bruno")).await.unwrap();
		assert_eq!(reply.as_str(), Some("Hello Bruno"));
	}

	#[test]
	fn accessors_reject_mismatched_variants() {
		assert_eq!(Value::from(7i64).as_str(), None);
		assert_eq!(Value::from("x").as_int(), None);
		assert!(Value::Null.is_null());
	}
}
