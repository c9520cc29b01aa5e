//! Instrumented response header handle.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::effects::PendingEffects;
use crate::forward::HeaderForwarders;
use crate::header::HeaderMap;

/// Shared, observable response header map.
///
/// Every mutation updates the local map and enqueues the matching forwarding
/// operation into the request's pending-effects queue, so header changes
/// reach the host in issue order relative to status changes and body writes.
/// Clones share the same map and queue.
#[derive(Clone)]
pub struct ResponseHeaders {
	inner: Arc<Mutex<HeaderMap>>,
	effects: PendingEffects,
	forwarders: HeaderForwarders,
}

impl ResponseHeaders {
	/// Creates an empty instrumented header map.
	#[must_use]
	pub fn new(effects: PendingEffects, forwarders: HeaderForwarders) -> Self {
		Self {
			inner: Arc::new(Mutex::new(HeaderMap::new())),
			effects,
			forwarders,
		}
	}

	/// A handle with no forwarding, for setup code and tests that never
	/// reach a host.
	#[must_use]
	pub fn detached() -> Self {
		Self::new(PendingEffects::new(), HeaderForwarders::discard())
	}

	/// Replaces all values for `name` with a single value.
	pub fn insert(&self, name: impl Into<String>, value: impl Into<String>) {
		self.insert_values(name, vec![value.into()]);
	}

	/// Replaces all values for `name`.
	pub fn insert_values(&self, name: impl Into<String>, values: Vec<String>) {
		let name = name.into();
		self.inner.lock().insert_values(name.clone(), values.clone());
		self.effects.push((self.forwarders.set)(name, values));
	}

	/// Appends one value to `name` and forwards the full value list.
	pub fn append(&self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let values = {
			let mut map = self.inner.lock();
			map.append(name.clone(), value);
			map.get_all(&name).map(<[String]>::to_vec).unwrap_or_default()
		};
		self.effects.push((self.forwarders.set)(name, values));
	}

	/// Removes `name`, forwarding the removal to the host.
	pub fn remove(&self, name: &str) -> Option<Vec<String>> {
		let removed = self.inner.lock().remove(name);
		if removed.is_some() {
			self.effects.push((self.forwarders.remove)(name.to_string()));
		}
		removed
	}

	/// Removes all headers, forwarding a single remove-all to the host.
	pub fn clear(&self) {
		self.inner.lock().clear();
		self.effects.push((self.forwarders.remove_all)());
	}

	/// First value for `name`, cloned.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<String> {
		self.inner.lock().get(name).map(str::to_string)
	}

	/// All values for `name`, cloned.
	#[must_use]
	pub fn get_all(&self, name: &str) -> Option<Vec<String>> {
		self.inner.lock().get_all(name).map(<[String]>::to_vec)
	}

	/// Comma-joined value for `name`.
	#[must_use]
	pub fn joined(&self, name: &str) -> Option<String> {
		self.inner.lock().joined(name)
	}

	/// Returns true when `name` is present.
	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.inner.lock().contains(name)
	}

	/// Number of distinct header names.
	#[must_use]
	pub fn len(&self) -> usize {
		self.inner.lock().len()
	}

	/// Returns true when no headers are set.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.inner.lock().is_empty()
	}

	/// Point-in-time copy of the underlying map.
	#[must_use]
	pub fn snapshot(&self) -> HeaderMap {
		self.inner.lock().clone()
	}
}

impl std::fmt::Debug for ResponseHeaders {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResponseHeaders").field("headers", &self.snapshot()).finish()
	}
}
