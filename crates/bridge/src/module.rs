//! The module seam between a host and the registry.
//!
//! A host exposes hosted applications as *modules* addressed by a locator
//! string. Each module groups startup types, each type groups named entry
//! methods. The registry walks locator → type → method during resolution,
//! applying well-known defaults for the optional names.

use std::collections::HashMap;
use std::sync::Arc;

use gangway_env::Environment;

use crate::app::{AppResult, BuilderAsyncFn, BuilderSyncFn, RawEntry, app_fn};
use crate::builder::AppBuilder;

/// Default startup type name when the descriptor names none.
pub const DEFAULT_TYPE_NAME: &str = "Startup";

/// Default entry method name when the descriptor names none.
pub const DEFAULT_METHOD_NAME: &str = "configuration";

/// A hosted-application module: a named group of startup types.
pub trait AppModule: Send + Sync {
	/// Looks up a startup type by name.
	fn startup_type(&self, name: &str) -> Option<&dyn StartupType>;
}

/// A startup type: a named group of entry methods.
pub trait StartupType: Send + Sync {
	/// Produces the type-erased entry point for `name`. Each call yields a
	/// fresh entry, since entry points are consumed by resolution.
	fn entry_method(&self, name: &str) -> Option<RawEntry>;
}

/// Resolves locator strings to modules.
pub trait ModuleCatalog: Send + Sync {
	/// Loads the module at `locator`, or `None` when no such module exists.
	fn load(&self, locator: &str) -> Option<Arc<dyn AppModule>>;
}

type EntryFactory = Box<dyn Fn() -> RawEntry + Send + Sync>;

/// In-process [`StartupType`] backed by registered closures.
#[derive(Default)]
pub struct StaticType {
	methods: HashMap<String, EntryFactory>,
}

impl StartupType for StaticType {
	fn entry_method(&self, name: &str) -> Option<RawEntry> {
		self.methods.get(name).map(|factory| factory())
	}
}

/// In-process [`AppModule`] for hosts that link their applications into the
/// same binary. Entry points are registered under `(type, method)` names.
#[derive(Default)]
pub struct StaticModule {
	types: HashMap<String, StaticType>,
}

impl StaticModule {
	/// Creates an empty module.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a synchronous builder-style entry point.
	#[must_use]
	pub fn with_builder<F>(mut self, type_name: &str, method_name: &str, f: F) -> Self
	where
		F: Fn(&mut AppBuilder) + Clone + Send + Sync + 'static,
	{
		self.insert(type_name, method_name, Box::new(move || {
			let f = f.clone();
			let entry: BuilderSyncFn = Box::new(move |builder| f(builder));
			Box::new(entry) as RawEntry
		}));
		self
	}

	/// Registers an asynchronous builder-style entry point.
	#[must_use]
	pub fn with_builder_async<F, Fut>(mut self, type_name: &str, method_name: &str, f: F) -> Self
	where
		F: Fn(AppBuilder) -> Fut + Clone + Send + Sync + 'static,
		Fut: Future<Output = Result<AppBuilder, crate::app::AppError>> + Send + 'static,
	{
		self.insert(type_name, method_name, Box::new(move || {
			let f = f.clone();
			let entry: BuilderAsyncFn = Box::new(move |builder| Box::pin(f(builder)));
			Box::new(entry) as RawEntry
		}));
		self
	}

	/// Registers a direct-call entry point.
	#[must_use]
	pub fn with_direct<F, Fut>(mut self, type_name: &str, method_name: &str, f: F) -> Self
	where
		F: Fn(Environment) -> Fut + Clone + Send + Sync + 'static,
		Fut: Future<Output = AppResult> + Send + 'static,
	{
		self.insert(type_name, method_name, Box::new(move || {
			Box::new(app_fn(f.clone())) as RawEntry
		}));
		self
	}

	/// Registers a raw type-erased entry point. Mainly useful to exercise
	/// signature matching; prefer the shaped registrars above.
	#[must_use]
	pub fn with_raw<F>(mut self, type_name: &str, method_name: &str, factory: F) -> Self
	where
		F: Fn() -> RawEntry + Send + Sync + 'static,
	{
		self.insert(type_name, method_name, Box::new(factory));
		self
	}

	fn insert(&mut self, type_name: &str, method_name: &str, factory: EntryFactory) {
		self.types
			.entry(type_name.to_string())
			.or_default()
			.methods
			.insert(method_name.to_string(), factory);
	}
}

impl AppModule for StaticModule {
	fn startup_type(&self, name: &str) -> Option<&dyn StartupType> {
		self.types.get(name).map(|ty| ty as &dyn StartupType)
	}
}

/// In-process [`ModuleCatalog`] backed by a locator map.
#[derive(Default, Clone)]
pub struct StaticCatalog {
	modules: HashMap<String, Arc<dyn AppModule>>,
}

impl StaticCatalog {
	/// Creates an empty catalog.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a module under `locator`, replacing any existing one.
	#[must_use]
	pub fn with_module(mut self, locator: &str, module: impl AppModule + 'static) -> Self {
		self.modules.insert(locator.to_string(), Arc::new(module));
		self
	}
}

impl ModuleCatalog for StaticCatalog {
	fn load(&self, locator: &str) -> Option<Arc<dyn AppModule>> {
		self.modules.get(locator).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn noop(env: Environment) -> AppResult {
		Ok(env)
	}

	#[test]
	fn catalog_resolves_registered_locators() {
		let catalog = StaticCatalog::new()
			.with_module("app", StaticModule::new().with_direct(DEFAULT_TYPE_NAME, DEFAULT_METHOD_NAME, noop));
		assert!(catalog.load("app").is_some());
		assert!(catalog.load("missing").is_none());
	}

	#[test]
	fn entry_methods_yield_fresh_entries_per_call() {
		let module = StaticModule::new().with_direct(DEFAULT_TYPE_NAME, DEFAULT_METHOD_NAME, noop);
		let ty = module.startup_type(DEFAULT_TYPE_NAME).unwrap();
		assert!(ty.entry_method(DEFAULT_METHOD_NAME).is_some());
		assert!(ty.entry_method(DEFAULT_METHOD_NAME).is_some());
		assert!(ty.entry_method("missing").is_none());
	}
}
