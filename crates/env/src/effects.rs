//! Request-scoped queue of in-flight forwarding operations.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::error::ForwardError;

/// One queued forwarding operation.
pub type Effect = BoxFuture<'static, Result<(), ForwardError>>;

/// Ordered, request-scoped queue of pending forwarding operations.
///
/// Mutation hooks push effects synchronously; [`PendingEffects::drain`]
/// settles them strictly in push order. This is the core ordering guarantee:
/// status, header and body mutations reach the host in the order the hosted
/// application issued them. A queue is never shared across requests.
#[derive(Clone, Default)]
pub struct PendingEffects {
	queue: Arc<Mutex<VecDeque<Effect>>>,
}

impl PendingEffects {
	/// Creates an empty queue.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Enqueues one effect. Never blocks.
	pub fn push(&self, effect: Effect) {
		self.queue.lock().push_back(effect);
	}

	/// Awaits every queued effect in FIFO order.
	///
	/// The first forwarding failure aborts the remaining drain; effects
	/// queued after the failure are dropped with the request.
	pub async fn drain(&self) -> Result<(), ForwardError> {
		loop {
			// The lock must not be held across the await below.
			let next = self.queue.lock().pop_front();
			let Some(effect) = next else {
				return Ok(());
			};
			effect.await?;
		}
	}

	/// Number of effects currently queued.
	#[must_use]
	pub fn len(&self) -> usize {
		self.queue.lock().len()
	}

	/// Returns true when nothing is pending.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.queue.lock().is_empty()
	}
}

impl std::fmt::Debug for PendingEffects {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PendingEffects").field("pending", &self.len()).finish()
	}
}
