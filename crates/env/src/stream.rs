//! Write-only streaming channel over the response body.

use bytes::Bytes;

use crate::effects::PendingEffects;
use crate::error::WriteError;
use crate::forward::WriteFn;

/// Write-only byte sink forwarding to a host-supplied asynchronous writer.
///
/// Every write first settles all currently pending effects, so body bytes are
/// never reordered relative to prior header/status mutations or prior writes.
/// Clones share the same underlying channel. Reading and seeking are not
/// supported.
#[derive(Clone)]
pub struct ResponseStream {
	effects: PendingEffects,
	forward: WriteFn,
}

impl ResponseStream {
	/// Creates a channel over the shared effects queue and host write hook.
	#[must_use]
	pub fn new(effects: PendingEffects, forward: WriteFn) -> Self {
		Self { effects, forward }
	}

	/// Forwards exactly `count` bytes of `buf` to the host.
	///
	/// A zero `count` is a no-op. The input is trimmed to the requested byte
	/// count and copied before forwarding. Awaits drainage of all pending
	/// effects, then issues the forward as a new pending effect and awaits it.
	pub async fn write(&self, buf: &[u8], count: usize) -> Result<(), WriteError> {
		let count = count.min(buf.len());
		if count == 0 {
			return Ok(());
		}
		let chunk = Bytes::copy_from_slice(&buf[..count]);
		tracing::trace!(len = chunk.len(), "forwarding body chunk");

		self.effects.drain().await?;
		self.effects.push((self.forward)(chunk));
		self.effects.drain().await?;
		Ok(())
	}

	/// Forwards the whole buffer.
	pub async fn write_all(&self, buf: &[u8]) -> Result<(), WriteError> {
		self.write(buf, buf.len()).await
	}

	/// No-op: forwarding is synchronous per write by construction.
	pub fn flush(&self) -> Result<(), WriteError> {
		Ok(())
	}
}

impl std::fmt::Debug for ResponseStream {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResponseStream").field("effects", &self.effects).finish()
	}
}
