//! Canonical hosted-application environment contract.
//!
//! This crate holds the per-request data plane shared between a host and a
//! hosted application:
//! * [`HeaderMap`]: case-insensitive, multi-valued header storage
//! * [`Environment`]: observable key/value map with a reserved protocol namespace
//! * [`PendingEffects`]: ordered queue of in-flight forwarding operations
//! * [`ResponseStream`]: write-only, order-preserving response body sink
//! * [`ResponseHeaders`]: instrumented response header handle
//!
//! The registry and dispatcher that drive this contract live in
//! `gangway-bridge`.

#![warn(missing_docs)]

pub mod body;
pub mod effects;
pub mod environment;
pub mod error;
pub mod forward;
pub mod header;
pub mod keys;
pub mod response_headers;
pub mod stream;
pub mod value;

pub use body::RequestBody;
pub use effects::{Effect, PendingEffects};
pub use environment::{EnvHooks, Environment};
pub use error::{CapabilityError, ForwardError, MutationError, WriteError};
pub use forward::{HeaderForwarders, RemoveAllHeadersFn, RemoveHeaderFn, SetHeaderFn, StatusFn, WriteFn};
pub use header::HeaderMap;
pub use response_headers::ResponseHeaders;
pub use stream::ResponseStream;
pub use value::{HostFunction, Value, host_fn};
