//! The host side of the runtime boundary.

use async_trait::async_trait;
use bytes::Bytes;

use gangway_env::{ForwardError, Value};

/// Asynchronous response callbacks supplied by the host.
///
/// The dispatcher adapts these into the forwarding hooks of the environment
/// contract; every call is one round-trip across the runtime boundary.
/// Failures propagate back to the hosted side as forwarding errors and abort
/// the remaining effect drain.
#[async_trait]
pub trait HostResponse: Send + Sync {
	/// Applies the response status code.
	async fn set_status(&self, status: u16) -> Result<(), ForwardError>;

	/// Replaces one response header with the given value list. Hosts that
	/// serialize a single header line join the values with a comma.
	async fn set_header(&self, name: &str, values: &[String]) -> Result<(), ForwardError>;

	/// Removes one response header.
	async fn remove_header(&self, name: &str) -> Result<(), ForwardError>;

	/// Removes every response header set so far.
	async fn remove_all_headers(&self) -> Result<(), ForwardError>;

	/// Appends one chunk to the response body.
	async fn write(&self, chunk: Bytes) -> Result<(), ForwardError>;
}

/// A header value as the host's native request structure carries it: either
/// a scalar or an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostHeaderValue {
	/// Single value; becomes a one-element list in the header map.
	One(String),
	/// Multiple values, order preserved.
	Many(Vec<String>),
}

/// Inbound request data handed over by the host.
///
/// Body parsing is the host's concern: `body` is the already-buffered byte
/// sequence, or `None` when the request carried none. `locals` are
/// per-request extension values set by upstream host middleware, visible to
/// the application under the `host.` prefix for this request only.
#[derive(Debug, Clone)]
pub struct HostRequest {
	/// HTTP method.
	pub method: String,
	/// Request path without the query string.
	pub path: String,
	/// Path base; typically empty.
	pub path_base: String,
	/// Protocol, e.g. `"HTTP/1.1"`.
	pub protocol: String,
	/// Raw query string without the leading `?`.
	pub query_string: String,
	/// `"http"` or `"https"`.
	pub scheme: String,
	/// Headers in the host's native value-or-array shape.
	pub headers: Vec<(String, HostHeaderValue)>,
	/// Buffered request body, if any.
	pub body: Option<Bytes>,
	/// Per-request extension values, unprefixed names.
	pub locals: Vec<(String, Value)>,
}

impl HostRequest {
	/// Creates a request with conventional defaults (HTTP/1.1, http scheme,
	/// empty path base and query).
	#[must_use]
	pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			method: method.into(),
			path: path.into(),
			path_base: String::new(),
			protocol: "HTTP/1.1".to_string(),
			query_string: String::new(),
			scheme: "http".to_string(),
			headers: Vec::new(),
			body: None,
			locals: Vec::new(),
		}
	}

	/// Sets the raw query string.
	#[must_use]
	pub fn with_query(mut self, query: impl Into<String>) -> Self {
		self.query_string = query.into();
		self
	}

	/// Adds a scalar header.
	#[must_use]
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), HostHeaderValue::One(value.into())));
		self
	}

	/// Adds a multi-valued header.
	#[must_use]
	pub fn with_header_values(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
		self.headers.push((name.into(), HostHeaderValue::Many(values)));
		self
	}

	/// Sets the buffered request body.
	#[must_use]
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Some(body.into());
		self
	}

	/// Adds a per-request extension value under its unprefixed name.
	#[must_use]
	pub fn with_local(mut self, name: impl Into<String>, value: Value) -> Self {
		self.locals.push((name.into(), value));
		self
	}
}
