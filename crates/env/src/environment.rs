//! Per-request instrumented environment map.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::body::RequestBody;
use crate::effects::PendingEffects;
use crate::error::MutationError;
use crate::forward::StatusFn;
use crate::header::HeaderMap;
use crate::keys;
use crate::response_headers::ResponseHeaders;
use crate::stream::ResponseStream;
use crate::value::{HostFunction, Value};

/// Mutation hooks injected at construction.
///
/// Hooks are constructor-injected closures, not trait inheritance: the
/// environment does not know what a host is, only which hook to fire.
#[derive(Clone, Default)]
pub struct EnvHooks {
	/// Fired when `response.statusCode` is assigned, with the normalized
	/// numeric code. The returned effect is queued, not awaited.
	pub on_status: Option<StatusFn>,
}

impl std::fmt::Debug for EnvHooks {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EnvHooks")
			.field("on_status", &self.on_status.is_some())
			.finish()
	}
}

/// Observable per-request key/value environment.
///
/// Keys in the protocol namespace (see [`keys`]) carry contract-defined
/// semantics and restricted mutation; everything else is a plain map entry.
/// Instances are built per request, handed to the hosted application by
/// value, and discarded when the request completes. They are never shared
/// across requests.
#[derive(Debug)]
pub struct Environment {
	map: HashMap<String, Value>,
	effects: PendingEffects,
	hooks: EnvHooks,
}

impl Environment {
	/// Creates an environment from seed entries, bypassing mutation hooks
	/// and namespace checks. Intended for per-request construction.
	#[must_use]
	pub fn from_seed(seed: impl IntoIterator<Item = (String, Value)>, effects: PendingEffects, hooks: EnvHooks) -> Self {
		Self {
			map: seed.into_iter().collect(),
			effects,
			hooks,
		}
	}

	/// An empty environment with no hooks wired. Useful for tests and for
	/// application setup that never reaches a host.
	#[must_use]
	pub fn detached() -> Self {
		Self::from_seed([], PendingEffects::new(), EnvHooks::default())
	}

	/// Looks up a value by key.
	#[must_use]
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.map.get(key)
	}

	/// Returns true when `key` is present.
	#[must_use]
	pub fn contains(&self, key: &str) -> bool {
		self.map.contains_key(key)
	}

	/// Sets a key.
	///
	/// Protocol-namespace rules:
	/// * `response.statusCode` normalizes enum-like wrapped values to their
	///   underlying number and fires the status hook.
	/// * `response.headers` and `response.body` cannot be assigned directly;
	///   mutate through the dedicated response objects.
	/// * every other protocol key stores plainly.
	///
	/// Extension-namespace keys behave as a plain map.
	pub fn set(&mut self, key: &str, value: Value) -> Result<(), MutationError> {
		if !keys::is_protocol(key) {
			self.map.insert(key.to_string(), value);
			return Ok(());
		}
		match key {
			keys::RESPONSE_STATUS_CODE => {
				let code = normalize_status(&value)?;
				self.map.insert(key.to_string(), Value::Int(i64::from(code)));
				if let Some(hook) = &self.hooks.on_status {
					self.effects.push((hook)(code));
				}
				Ok(())
			}
			keys::RESPONSE_HEADERS | keys::RESPONSE_BODY => Err(MutationError::ReservedObject(key.to_string())),
			_ => {
				self.map.insert(key.to_string(), value);
				Ok(())
			}
		}
	}

	/// Removes a key. Fails for any protocol-namespace key.
	pub fn remove(&mut self, key: &str) -> Result<Option<Value>, MutationError> {
		if keys::is_protocol(key) {
			return Err(MutationError::ReservedKey(key.to_string()));
		}
		Ok(self.map.remove(key))
	}

	/// Clearing always fails: protocol keys are always present.
	pub fn clear(&mut self) -> Result<(), MutationError> {
		Err(MutationError::ClearForbidden)
	}

	/// The request's pending-effects queue.
	#[must_use]
	pub fn effects(&self) -> &PendingEffects {
		&self.effects
	}

	// Typed protocol accessors.

	/// `request.method`.
	#[must_use]
	pub fn request_method(&self) -> Option<&str> {
		self.get(keys::REQUEST_METHOD).and_then(Value::as_str)
	}

	/// `request.path`.
	#[must_use]
	pub fn request_path(&self) -> Option<&str> {
		self.get(keys::REQUEST_PATH).and_then(Value::as_str)
	}

	/// `request.pathBase`.
	#[must_use]
	pub fn request_path_base(&self) -> Option<&str> {
		self.get(keys::REQUEST_PATH_BASE).and_then(Value::as_str)
	}

	/// `request.protocol`.
	#[must_use]
	pub fn request_protocol(&self) -> Option<&str> {
		self.get(keys::REQUEST_PROTOCOL).and_then(Value::as_str)
	}

	/// `request.queryString`.
	#[must_use]
	pub fn request_query_string(&self) -> Option<&str> {
		self.get(keys::REQUEST_QUERY_STRING).and_then(Value::as_str)
	}

	/// `request.scheme`.
	#[must_use]
	pub fn request_scheme(&self) -> Option<&str> {
		self.get(keys::REQUEST_SCHEME).and_then(Value::as_str)
	}

	/// Inbound request headers.
	#[must_use]
	pub fn request_headers(&self) -> Option<&HeaderMap> {
		self.get(keys::REQUEST_HEADERS).and_then(Value::as_headers)
	}

	/// Inbound request body view.
	#[must_use]
	pub fn request_body(&self) -> Option<&RequestBody> {
		self.get(keys::REQUEST_BODY).and_then(Value::as_request_body)
	}

	/// Normalized response status code, if one was set.
	#[must_use]
	pub fn status_code(&self) -> Option<u16> {
		self.get(keys::RESPONSE_STATUS_CODE)
			.and_then(Value::as_int)
			.and_then(|n| u16::try_from(n).ok())
	}

	/// Sets `response.statusCode`, firing the status hook.
	pub fn set_status(&mut self, code: u16) -> Result<(), MutationError> {
		self.set(keys::RESPONSE_STATUS_CODE, Value::Status(code))
	}

	/// Instrumented response header handle.
	#[must_use]
	pub fn response_headers(&self) -> Option<ResponseHeaders> {
		match self.get(keys::RESPONSE_HEADERS) {
			Some(Value::ResponseHeaders(headers)) => Some(headers.clone()),
			_ => None,
		}
	}

	/// Write-only response body handle.
	#[must_use]
	pub fn response_stream(&self) -> Option<ResponseStream> {
		match self.get(keys::RESPONSE_BODY) {
			Some(Value::Body(stream)) => Some(stream.clone()),
			_ => None,
		}
	}

	/// The request's cancellation signal. Inert in the current design.
	#[must_use]
	pub fn cancellation(&self) -> Option<CancellationToken> {
		match self.get(keys::RESPONSE_CANCELLATION) {
			Some(Value::Cancellation(token)) => Some(token.clone()),
			_ => None,
		}
	}

	/// Environment contract version.
	#[must_use]
	pub fn version(&self) -> Option<&str> {
		self.get(keys::VERSION).and_then(Value::as_str)
	}

	/// Continuation flag; defaults to `false` when unset.
	#[must_use]
	pub fn continuation(&self) -> bool {
		self.get(keys::CONTINUE).and_then(Value::as_bool).unwrap_or(false)
	}

	/// Sets the continuation flag. `true` asks the host to keep running its
	/// own pipeline after dispatch returns.
	pub fn set_continue(&mut self, value: bool) {
		self.map.insert(keys::CONTINUE.to_string(), Value::Bool(value));
	}

	/// Looks up a host capability by its unprefixed name.
	#[must_use]
	pub fn capability(&self, name: &str) -> Option<HostFunction> {
		self.get(&keys::extension(name)).and_then(Value::as_function).cloned()
	}
}

fn normalize_status(value: &Value) -> Result<u16, MutationError> {
	match value {
		Value::Status(code) => Ok(*code),
		Value::Int(n) => u16::try_from(*n)
			.ok()
			.filter(|code| (100..=999).contains(code))
			.ok_or_else(|| MutationError::InvalidStatus(format!("{value:?}"))),
		other => Err(MutationError::InvalidStatus(format!("{other:?}"))),
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use parking_lot::Mutex;

	use super::*;

	fn env_with_status_hook() -> (Environment, Arc<Mutex<Vec<u16>>>) {
		let effects = PendingEffects::new();
		let log = Arc::new(Mutex::new(Vec::new()));
		let hook_log = Arc::clone(&log);
		let on_status: StatusFn = Arc::new(move |code| {
			let log = Arc::clone(&hook_log);
			Box::pin(async move {
				log.lock().push(code);
				Ok(())
			})
		});
		let env = Environment::from_seed(
			[(keys::VERSION.to_string(), Value::from(keys::CONTRACT_VERSION))],
			effects,
			EnvHooks {
				on_status: Some(on_status),
			},
		);
		(env, log)
	}

	#[tokio::test]
	async fn setting_status_enqueues_the_forward() {
		let (mut env, log) = env_with_status_hook();
		env.set(keys::RESPONSE_STATUS_CODE, Value::Int(200)).unwrap();
		assert_eq!(env.status_code(), Some(200));
		assert_eq!(env.effects().len(), 1);
		env.effects().drain().await.unwrap();
		assert_eq!(*log.lock(), vec![200]);
	}

	#[test]
	fn status_enum_values_normalize_to_their_number() {
		let (mut env, _) = env_with_status_hook();
		env.set(keys::RESPONSE_STATUS_CODE, Value::Status(201)).unwrap();
		assert_eq!(env.get(keys::RESPONSE_STATUS_CODE).and_then(Value::as_int), Some(201));
	}

	#[test]
	fn non_numeric_status_is_rejected() {
		let (mut env, _) = env_with_status_hook();
		let err = env.set(keys::RESPONSE_STATUS_CODE, Value::from("200")).unwrap_err();
		assert!(matches!(err, MutationError::InvalidStatus(_)));
		let err = env.set(keys::RESPONSE_STATUS_CODE, Value::Int(42)).unwrap_err();
		assert!(matches!(err, MutationError::InvalidStatus(_)));
	}

	#[test]
	fn response_objects_cannot_be_assigned_directly() {
		let (mut env, _) = env_with_status_hook();
		let err = env.set(keys::RESPONSE_HEADERS, Value::Null).unwrap_err();
		assert_eq!(err, MutationError::ReservedObject(keys::RESPONSE_HEADERS.to_string()));
		let err = env.set(keys::RESPONSE_BODY, Value::Null).unwrap_err();
		assert_eq!(err, MutationError::ReservedObject(keys::RESPONSE_BODY.to_string()));
	}

	#[test]
	fn protocol_keys_cannot_be_removed_and_clear_fails() {
		let (mut env, _) = env_with_status_hook();
		let err = env.remove(keys::VERSION).unwrap_err();
		assert_eq!(err, MutationError::ReservedKey(keys::VERSION.to_string()));
		assert_eq!(env.clear().unwrap_err(), MutationError::ClearForbidden);
		assert_eq!(env.version(), Some("1.0"));
	}

	#[test]
	fn extension_keys_are_a_plain_map() {
		let mut env = Environment::detached();
		env.set("host.key", Value::from("value")).unwrap();
		assert_eq!(env.get("host.key").and_then(Value::as_str), Some("value"));
		assert_eq!(env.remove("host.key").unwrap().and_then(|v| v.as_str().map(str::to_string)), Some("value".to_string()));
		assert!(env.remove("host.key").unwrap().is_none());
	}

	#[test]
	fn continuation_defaults_to_false() {
		let mut env = Environment::detached();
		assert!(!env.continuation());
		env.set_continue(true);
		assert!(env.continuation());
	}
}
