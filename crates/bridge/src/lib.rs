//! Hosted-application bridge layer.
//!
//! Lets an application written against the canonical environment contract
//! (`gangway-env`) run as a stage inside an unrelated host's
//! request-processing pipeline:
//! * [`AppRegistry`]: resolves an [`AppDescriptor`] into a normalized
//!   callable and stores it at a stable integer [`AppHandle`]
//! * [`ModuleCatalog`] / [`AppModule`]: the seam a host uses to expose
//!   application modules to the registry
//! * [`AppBuilder`]: ordered middleware composition with a
//!   continue-to-host default terminal stage
//! * [`Dispatcher`]: per-request environment construction, invocation and
//!   side-effect drainage, reporting a [`Continuation`] decision
//!
//! Neither side sees the other's native runtime: the host drives requests
//! through [`HostResponse`] callbacks, the application through one
//! asynchronous call over the environment.

#![warn(missing_docs)]

pub mod app;
pub mod builder;
pub mod dispatch;
pub mod host;
pub mod module;
pub mod registry;

pub use app::{AppError, AppFn, AppFuture, AppResult, BuilderAsyncFn, BuilderSyncFn, RawEntry, app_fn};
pub use builder::{AppBuilder, Stage, around};
pub use dispatch::{Continuation, DispatchError, Dispatcher};
pub use host::{HostHeaderValue, HostRequest, HostResponse};
pub use module::{AppModule, ModuleCatalog, StartupType, StaticCatalog, StaticModule};
pub use registry::{AppDescriptor, AppHandle, AppRegistry, ResolveError};
