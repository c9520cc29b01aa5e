//! Inbound request body view.

use bytes::Bytes;

/// Readable view over the inbound request body.
///
/// A missing or zero-length inbound body maps to [`RequestBody::Absent`], the
/// canonical no-body sentinel, so applications can branch on presence without
/// inspecting lengths. Host-side body parsing is out of scope; the host hands
/// the bridge an already-buffered byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
	/// No body was sent with the request.
	Absent,
	/// The complete buffered body bytes.
	Buffered(Bytes),
}

impl RequestBody {
	/// Builds a body view from an optional host buffer. Empty buffers
	/// collapse to [`RequestBody::Absent`].
	#[must_use]
	pub fn from_host(buffer: Option<Bytes>) -> Self {
		match buffer {
			Some(bytes) if !bytes.is_empty() => Self::Buffered(bytes),
			_ => Self::Absent,
		}
	}

	/// Returns the buffered bytes, or `None` when absent.
	#[must_use]
	pub fn bytes(&self) -> Option<&Bytes> {
		match self {
			Self::Absent => None,
			Self::Buffered(bytes) => Some(bytes),
		}
	}

	/// Returns true when no body was sent.
	#[must_use]
	pub fn is_absent(&self) -> bool {
		matches!(self, Self::Absent)
	}

	/// Body length in bytes. Zero when absent.
	#[must_use]
	pub fn len(&self) -> usize {
		self.bytes().map_or(0, Bytes::len)
	}

	/// Returns true when the body carries no bytes.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_and_missing_buffers_are_absent() {
		assert!(RequestBody::from_host(None).is_absent());
		assert!(RequestBody::from_host(Some(Bytes::new())).is_absent());
	}

	#[test]
	fn buffered_bytes_round_trip() {
		let body = RequestBody::from_host(Some(Bytes::from_static(b"Hello gangway!")));
		assert!(!body.is_absent());
		assert_eq!(body.bytes().unwrap().as_ref(), b"Hello gangway!");
		assert_eq!(body.len(), 14);
	}
}
