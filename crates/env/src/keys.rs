//! Environment key constants and namespace partitioning.
//!
//! Keys are split into the *protocol namespace* (reserved, contract-defined
//! semantics, restricted mutation) and the free *extension namespace*.
//! Protocol keys are everything under the `request.` / `response.` /
//! `gangway.` prefixes plus [`VERSION`].

/// HTTP method of the inbound request, e.g. `"GET"`.
pub const REQUEST_METHOD: &str = "request.method";
/// Request path, without the query string.
pub const REQUEST_PATH: &str = "request.path";
/// Path base the host mounted the application under. Typically empty.
pub const REQUEST_PATH_BASE: &str = "request.pathBase";
/// Request protocol, e.g. `"HTTP/1.1"`.
pub const REQUEST_PROTOCOL: &str = "request.protocol";
/// Raw query string without the leading `?`.
pub const REQUEST_QUERY_STRING: &str = "request.queryString";
/// Request scheme, `"http"` or `"https"`.
pub const REQUEST_SCHEME: &str = "request.scheme";
/// Inbound [`HeaderMap`](crate::HeaderMap).
pub const REQUEST_HEADERS: &str = "request.headers";
/// Inbound [`RequestBody`](crate::RequestBody) view.
pub const REQUEST_BODY: &str = "request.body";

/// Numeric response status code. Setting this key fires the status hook.
pub const RESPONSE_STATUS_CODE: &str = "response.statusCode";
/// Outbound [`ResponseHeaders`](crate::ResponseHeaders) handle. Mutate through
/// the handle, never by assigning this key.
pub const RESPONSE_HEADERS: &str = "response.headers";
/// Outbound [`ResponseStream`](crate::ResponseStream) handle. Mutate through
/// the handle, never by assigning this key.
pub const RESPONSE_BODY: &str = "response.body";
/// Cancellation signal for the request. Currently an inert placeholder: it is
/// not connected to any host-side abort mechanism.
pub const RESPONSE_CANCELLATION: &str = "response.cancellationSignal";

/// Environment contract version key.
pub const VERSION: &str = "version";
/// Value stored under [`VERSION`].
pub const CONTRACT_VERSION: &str = "1.0";

/// Continuation flag: `true` means the application deferred handling and the
/// host should continue its own pipeline. Defaults to `false`.
pub const CONTINUE: &str = "gangway.continue";
/// Registry handle the request was dispatched to.
pub const HANDLE: &str = "gangway.handle";

/// Prefix for bridge-owned protocol keys.
pub const BRIDGE_PREFIX: &str = "gangway.";
/// Prefix for caller-supplied extension values and capabilities.
pub const EXTENSION_PREFIX: &str = "host.";

/// Returns true when `key` belongs to the protocol namespace.
#[must_use]
pub fn is_protocol(key: &str) -> bool {
	key.starts_with("request.") || key.starts_with("response.") || key.starts_with(BRIDGE_PREFIX) || key == VERSION
}

/// Builds an extension-namespace key: `host.<name>`.
#[must_use]
pub fn extension(name: &str) -> String {
	format!("{EXTENSION_PREFIX}{name}")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn protocol_namespace_covers_reserved_prefixes() {
		assert!(is_protocol(REQUEST_METHOD));
		assert!(is_protocol(RESPONSE_STATUS_CODE));
		assert!(is_protocol(CONTINUE));
		assert!(is_protocol(VERSION));
		assert!(!is_protocol("host.key"));
		assert!(!is_protocol("versioned"));
	}

	#[test]
	fn extension_keys_are_prefixed() {
		assert_eq!(extension("func"), "host.func");
	}
}
