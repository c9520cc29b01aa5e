//! Error types for the environment contract.

use thiserror::Error;

/// Mutation-contract violations, surfaced immediately at the point of the
/// violation rather than at dispatch completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
	/// A protocol-namespace key cannot be removed.
	#[error("protocol key '{0}' cannot be removed")]
	ReservedKey(String),

	/// `response.headers` and `response.body` may only be mutated through
	/// their dedicated response objects.
	#[error("'{0}' must be mutated through its dedicated response object")]
	ReservedObject(String),

	/// The environment cannot be cleared while protocol keys are present,
	/// which is always.
	#[error("the environment cannot be cleared")]
	ClearForbidden,

	/// `response.statusCode` accepts only numeric or status-wrapped values.
	#[error("response status must be a numeric value, got {0}")]
	InvalidStatus(String),
}

/// Failure of a host-supplied forwarding callback (status, header or body
/// write round-trip).
#[derive(Debug, Clone, Error)]
#[error("host {operation} callback failed: {message}")]
pub struct ForwardError {
	/// Which host callback failed, e.g. `"write"` or `"set_header"`.
	pub operation: &'static str,
	/// Host-reported failure detail.
	pub message: String,
}

impl ForwardError {
	/// Creates a forwarding error for the named host callback.
	pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
		Self {
			operation,
			message: message.into(),
		}
	}
}

/// A response body write failed while forwarding to the host.
#[derive(Debug, Clone, Error)]
#[error("response body write failed: {0}")]
pub struct WriteError(#[from] pub ForwardError);

/// A host capability call failed. Capabilities are asynchronous round-trips
/// with their own error channel, separate from dispatch errors.
#[derive(Debug, Clone, Error)]
#[error("host capability '{name}' failed: {message}")]
pub struct CapabilityError {
	/// Extension-namespace name of the capability.
	pub name: String,
	/// Host-reported failure detail.
	pub message: String,
}

impl CapabilityError {
	/// Creates a capability error for the named function.
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
		}
	}
}
