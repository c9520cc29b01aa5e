//! Application registry: descriptor resolution and handle storage.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::Mutex;

use gangway_env::{Value, keys};

use crate::app::{AppError, AppFn, BuilderAsyncFn, BuilderSyncFn, RawEntry};
use crate::builder::AppBuilder;
use crate::module::{DEFAULT_METHOD_NAME, DEFAULT_TYPE_NAME, ModuleCatalog};

/// Identifies a hosted application's entry point.
///
/// `type_name` and `method_name` fall back to the well-known conventions
/// ([`DEFAULT_TYPE_NAME`], [`DEFAULT_METHOD_NAME`]) when absent. `options`
/// are forwarded into the extension namespace under the `host.` prefix and
/// become ambient configuration visible to the application; they do not
/// participate in descriptor identity.
#[derive(Debug, Clone, Default)]
pub struct AppDescriptor {
	/// Locator of the application module.
	pub locator: String,
	/// Startup type name override.
	pub type_name: Option<String>,
	/// Entry method name override.
	pub method_name: Option<String>,
	/// Caller-supplied values and capabilities, unprefixed names.
	pub options: Vec<(String, Value)>,
}

impl AppDescriptor {
	/// Creates a descriptor for `locator` with conventional names.
	#[must_use]
	pub fn new(locator: impl Into<String>) -> Self {
		Self {
			locator: locator.into(),
			..Self::default()
		}
	}

	/// Overrides the startup type name.
	#[must_use]
	pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
		self.type_name = Some(type_name.into());
		self
	}

	/// Overrides the entry method name.
	#[must_use]
	pub fn with_method(mut self, method_name: impl Into<String>) -> Self {
		self.method_name = Some(method_name.into());
		self
	}

	/// Adds a caller-supplied option under its unprefixed name.
	#[must_use]
	pub fn with_option(mut self, name: impl Into<String>, value: Value) -> Self {
		self.options.push((name.into(), value));
		self
	}

	fn identity(&self) -> DescriptorKey {
		DescriptorKey {
			locator: self.locator.clone(),
			type_name: self.type_name.clone(),
			method_name: self.method_name.clone(),
		}
	}

	/// Registration-time properties: every descriptor field projected into
	/// the extension namespace.
	fn globals(&self) -> Vec<(String, Value)> {
		let mut globals = vec![(keys::extension("locator"), Value::from(self.locator.as_str()))];
		if let Some(type_name) = &self.type_name {
			globals.push((keys::extension("typeName"), Value::from(type_name.as_str())));
		}
		if let Some(method_name) = &self.method_name {
			globals.push((keys::extension("methodName"), Value::from(method_name.as_str())));
		}
		for (name, value) in &self.options {
			globals.push((keys::extension(name), value.clone()));
		}
		globals
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DescriptorKey {
	locator: String,
	type_name: Option<String>,
	method_name: Option<String>,
}

/// Stable integer identifier of a registered application.
///
/// Valid iff its index is below the registry length; handles are never
/// reused or invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppHandle(usize);

impl AppHandle {
	/// Index into the registry's entry list.
	#[must_use]
	pub const fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for AppHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A registered application: the normalized callable plus its
/// registration-time extension values.
pub struct Entry {
	app: AppFn,
	globals: Arc<Vec<(String, Value)>>,
}

impl Entry {
	/// The normalized callable.
	#[must_use]
	pub fn app(&self) -> &AppFn {
		&self.app
	}

	/// Extension values seeded into every request environment, prefixed.
	#[must_use]
	pub fn globals(&self) -> &Arc<Vec<(String, Value)>> {
		&self.globals
	}
}

/// Resolution failures. Fatal to registration: no entry is created and no
/// partial registry state remains.
#[derive(Debug, Error)]
pub enum ResolveError {
	/// No module is registered at the descriptor's locator.
	#[error("no application module registered at locator '{0}'")]
	ModuleNotFound(String),

	/// The module does not expose the startup type.
	#[error("startup type '{type_name}' not found in module '{locator}'")]
	TypeNotFound {
		/// The descriptor's locator.
		locator: String,
		/// The startup type name that was looked up.
		type_name: String,
	},

	/// The startup type does not expose the entry method.
	#[error("entry method '{method_name}' not found on startup type '{type_name}'")]
	MethodNotFound {
		/// The startup type name.
		type_name: String,
		/// The entry method name that was looked up.
		method_name: String,
	},

	/// The entry method matched none of the accepted shapes.
	#[error(
		"entry method '{type_name}.{method_name}' matches neither a builder entry (sync or async) nor a direct application callable"
	)]
	SignatureMismatch {
		/// The startup type name.
		type_name: String,
		/// The entry method name.
		method_name: String,
	},

	/// Asynchronous builder setup failed.
	#[error("application setup failed: {0}")]
	Setup(anyhow::Error),
}

/// Append-only store of resolved applications.
///
/// Resolution is memoized per descriptor identity. First-time registration
/// is serialized by an internal lock (the single-initiator assumption made
/// explicit); dispatch-time lookups against existing handles are concurrent
/// and lock-light.
pub struct AppRegistry {
	catalog: Arc<dyn ModuleCatalog>,
	entries: RwLock<Vec<Arc<Entry>>>,
	registration: Mutex<HashMap<DescriptorKey, AppHandle>>,
}

impl AppRegistry {
	/// Creates a registry over a module catalog.
	#[must_use]
	pub fn new(catalog: Arc<dyn ModuleCatalog>) -> Self {
		Self {
			catalog,
			entries: RwLock::new(Vec::new()),
			registration: Mutex::new(HashMap::new()),
		}
	}

	/// Resolves a descriptor to a handle, creating the entry on first use.
	///
	/// Identical descriptors resolve to the same handle without
	/// re-resolving. The composed callable is built once and immutable
	/// thereafter.
	pub async fn resolve(&self, descriptor: &AppDescriptor) -> Result<AppHandle, ResolveError> {
		let mut memo = self.registration.lock().await;
		let key = descriptor.identity();
		if let Some(&handle) = memo.get(&key) {
			tracing::debug!(locator = %descriptor.locator, %handle, "descriptor already registered");
			return Ok(handle);
		}

		let app = self.compose(descriptor).await?;
		let globals = Arc::new(descriptor.globals());
		let handle = {
			let mut entries = self.entries.write();
			entries.push(Arc::new(Entry { app, globals }));
			AppHandle(entries.len() - 1)
		};
		memo.insert(key, handle);
		tracing::debug!(locator = %descriptor.locator, %handle, "registered hosted application");
		Ok(handle)
	}

	/// Builds the normalized callable for a descriptor.
	async fn compose(&self, descriptor: &AppDescriptor) -> Result<AppFn, ResolveError> {
		let module = self
			.catalog
			.load(&descriptor.locator)
			.ok_or_else(|| ResolveError::ModuleNotFound(descriptor.locator.clone()))?;

		let type_name = descriptor.type_name.as_deref().unwrap_or(DEFAULT_TYPE_NAME);
		let startup = module
			.startup_type(type_name)
			.ok_or_else(|| ResolveError::TypeNotFound {
				locator: descriptor.locator.clone(),
				type_name: type_name.to_string(),
			})?;

		let method_name = descriptor.method_name.as_deref().unwrap_or(DEFAULT_METHOD_NAME);
		let raw = startup
			.entry_method(method_name)
			.ok_or_else(|| ResolveError::MethodNotFound {
				type_name: type_name.to_string(),
				method_name: method_name.to_string(),
			})?;

		let mut builder = AppBuilder::with_properties(descriptor.globals());
		match shape_of(raw) {
			EntryShape::BuilderSync(entry) => entry(&mut builder),
			EntryShape::BuilderAsync(entry) => {
				builder = entry(builder).await.map_err(|err| match err {
					AppError::Fault(fault) => ResolveError::Setup(fault),
					AppError::Cancelled => ResolveError::Setup(anyhow::anyhow!("setup was cancelled")),
				})?;
			}
			// Direct calling convention: wrap into a single-stage pipeline.
			EntryShape::Direct(app) => {
				builder.use_stage(move |_next| app);
			}
			EntryShape::Unknown => {
				return Err(ResolveError::SignatureMismatch {
					type_name: type_name.to_string(),
					method_name: method_name.to_string(),
				});
			}
		}
		Ok(builder.build())
	}

	/// Looks up a registered entry by handle.
	#[must_use]
	pub fn entry(&self, handle: AppHandle) -> Option<Arc<Entry>> {
		self.entries.read().get(handle.index()).cloned()
	}

	/// Number of registered applications.
	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns true when nothing is registered.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

enum EntryShape {
	BuilderSync(BuilderSyncFn),
	BuilderAsync(BuilderAsyncFn),
	Direct(AppFn),
	Unknown,
}

/// Selects the strategy for a type-erased entry by downcasting against the
/// accepted shapes in order.
fn shape_of(raw: RawEntry) -> EntryShape {
	let raw = match raw.downcast::<BuilderSyncFn>() {
		Ok(entry) => return EntryShape::BuilderSync(*entry),
		Err(raw) => raw,
	};
	let raw = match raw.downcast::<BuilderAsyncFn>() {
		Ok(entry) => return EntryShape::BuilderAsync(*entry),
		Err(raw) => raw,
	};
	match raw.downcast::<AppFn>() {
		Ok(app) => EntryShape::Direct(*app),
		Err(_) => EntryShape::Unknown,
	}
}

#[cfg(test)]
mod tests {
	use gangway_env::Environment;

	use super::*;
	use crate::app::AppResult;
	use crate::builder::around;
	use crate::module::{StaticCatalog, StaticModule};

	async fn ok_200(mut env: Environment) -> AppResult {
		env.set_status(200)?;
		Ok(env)
	}

	fn registry() -> AppRegistry {
		let module = StaticModule::new()
			.with_direct(DEFAULT_TYPE_NAME, DEFAULT_METHOD_NAME, ok_200)
			.with_direct(DEFAULT_TYPE_NAME, "other", ok_200)
			.with_builder(DEFAULT_TYPE_NAME, "compose", |builder: &mut AppBuilder| {
				builder.use_stage(|_next| crate::app::app_fn(ok_200));
			})
			.with_builder_async(DEFAULT_TYPE_NAME, "compose_async", |mut builder: AppBuilder| async move {
				builder.use_stage(|_next| crate::app::app_fn(ok_200));
				Ok(builder)
			})
			.with_builder_async(DEFAULT_TYPE_NAME, "failing_setup", |_builder: AppBuilder| async move {
				Err(crate::app::AppError::Fault(anyhow::anyhow!("bad setup")))
			})
			.with_raw(DEFAULT_TYPE_NAME, "weird", || Box::new(42u32) as RawEntry);
		AppRegistry::new(Arc::new(StaticCatalog::new().with_module("app", module)))
	}

	#[tokio::test]
	async fn identical_descriptors_share_a_handle() {
		let registry = registry();
		let descriptor = AppDescriptor::new("app");
		let first = registry.resolve(&descriptor).await.unwrap();
		let second = registry.resolve(&descriptor).await.unwrap();
		assert_eq!(first, second);
		assert_eq!(registry.len(), 1);
	}

	#[tokio::test]
	async fn distinct_descriptors_get_distinct_stable_handles() {
		let registry = registry();
		let a = registry.resolve(&AppDescriptor::new("app")).await.unwrap();
		let b = registry
			.resolve(&AppDescriptor::new("app").with_method("other"))
			.await
			.unwrap();
		assert_ne!(a, b);
		assert_eq!(a.index(), 0);
		assert_eq!(b.index(), 1);
		assert!(registry.entry(a).is_some());
		assert!(registry.entry(b).is_some());
	}

	#[tokio::test]
	async fn all_three_shapes_resolve() {
		let registry = registry();
		for method in ["configuration", "compose", "compose_async"] {
			let descriptor = AppDescriptor::new("app").with_method(method);
			registry.resolve(&descriptor).await.unwrap();
		}
		assert_eq!(registry.len(), 3);
	}

	#[tokio::test]
	async fn resolution_errors_are_distinct_and_leave_no_entry() {
		let registry = registry();

		let err = registry.resolve(&AppDescriptor::new("missing")).await.unwrap_err();
		assert!(matches!(err, ResolveError::ModuleNotFound(_)));

		let err = registry
			.resolve(&AppDescriptor::new("app").with_type("Nope"))
			.await
			.unwrap_err();
		assert!(matches!(err, ResolveError::TypeNotFound { .. }));

		let err = registry
			.resolve(&AppDescriptor::new("app").with_method("nope"))
			.await
			.unwrap_err();
		assert!(matches!(err, ResolveError::MethodNotFound { .. }));

		let err = registry
			.resolve(&AppDescriptor::new("app").with_method("weird"))
			.await
			.unwrap_err();
		assert!(matches!(err, ResolveError::SignatureMismatch { .. }));

		let err = registry
			.resolve(&AppDescriptor::new("app").with_method("failing_setup"))
			.await
			.unwrap_err();
		assert!(matches!(err, ResolveError::Setup(_)));

		assert!(registry.is_empty());
	}

	#[tokio::test]
	async fn descriptor_options_become_builder_properties() {
		let module = StaticModule::new().with_builder(DEFAULT_TYPE_NAME, DEFAULT_METHOD_NAME, |builder: &mut AppBuilder| {
			let greeting = builder
				.property("host.key")
				.and_then(Value::as_str)
				.unwrap_or("missing")
				.to_string();
			builder.use_stage(around(move |mut env: Environment, next| {
				let greeting = greeting.clone();
				async move {
					env.set("host.seen", Value::from(greeting))?;
					next(env).await
				}
			}));
		});
		let registry = AppRegistry::new(Arc::new(StaticCatalog::new().with_module("app", module)));
		let descriptor = AppDescriptor::new("app").with_option("key", Value::from("value"));
		let handle = registry.resolve(&descriptor).await.unwrap();

		let entry = registry.entry(handle).unwrap();
		let env = (entry.app())(Environment::detached()).await.unwrap();
		assert_eq!(env.get("host.seen").and_then(Value::as_str), Some("value"));
		// No custom terminal stage, so the default one asks the host to continue.
		assert!(env.continuation());
	}
}
