//! Pipeline composition for hosted applications.

use indexmap::IndexMap;

use gangway_env::Value;

use crate::app::{AppFn, AppFuture, app_fn};

/// One pipeline stage: wraps the downstream callable into a new one.
pub type Stage = Box<dyn FnOnce(AppFn) -> AppFn + Send>;

/// Ordered middleware composition supplied to builder-style entry points.
///
/// The builder carries the registration-time properties (descriptor options
/// under the `host.` prefix) and a stage list. [`AppBuilder::build`] folds
/// the stages around a default terminal stage that sets the continuation
/// flag to true, signalling "no protocol match, let the host continue".
#[derive(Default)]
pub struct AppBuilder {
	properties: IndexMap<String, Value>,
	stages: Vec<Stage>,
}

impl AppBuilder {
	/// Creates an empty builder.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a builder carrying registration-time properties.
	#[must_use]
	pub fn with_properties(properties: impl IntoIterator<Item = (String, Value)>) -> Self {
		Self {
			properties: properties.into_iter().collect(),
			stages: Vec::new(),
		}
	}

	/// Looks up a registration-time property.
	#[must_use]
	pub fn property(&self, key: &str) -> Option<&Value> {
		self.properties.get(key)
	}

	/// Iterates all registration-time properties in insertion order.
	pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.properties.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Sets a property, replacing any existing value.
	pub fn set_property(&mut self, key: impl Into<String>, value: Value) {
		self.properties.insert(key.into(), value);
	}

	/// Appends one pipeline stage. Stages run in the order they were added.
	pub fn use_stage<F>(&mut self, stage: F) -> &mut Self
	where
		F: FnOnce(AppFn) -> AppFn + Send + 'static,
	{
		self.stages.push(Box::new(stage));
		self
	}

	/// Number of stages added so far.
	#[must_use]
	pub fn stage_count(&self) -> usize {
		self.stages.len()
	}

	/// Composes the pipeline into a single normalized callable.
	#[must_use]
	pub fn build(self) -> AppFn {
		let mut app: AppFn = app_fn(continue_stage);
		for stage in self.stages.into_iter().rev() {
			app = stage(app);
		}
		app
	}
}

impl std::fmt::Debug for AppBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppBuilder")
			.field("properties", &self.properties)
			.field("stages", &self.stages.len())
			.finish()
	}
}

/// Default terminal stage: defer to the host's own pipeline.
async fn continue_stage(mut env: gangway_env::Environment) -> crate::app::AppResult {
	env.set_continue(true);
	Ok(env)
}

/// Convenience for stages that only need to run code around the downstream
/// call: wraps `f` so it receives the environment and the next callable.
pub fn around<F, Fut>(f: F) -> impl FnOnce(AppFn) -> AppFn + Send + 'static
where
	F: Fn(gangway_env::Environment, AppFn) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = crate::app::AppResult> + Send + 'static,
{
	move |next: AppFn| {
		let wrapped: AppFn = std::sync::Arc::new(move |env| Box::pin(f(env, next.clone())) as AppFuture);
		wrapped
	}
}

#[cfg(test)]
mod tests {
	use gangway_env::{Environment, Value, keys};

	use super::*;
	use crate::app::AppResult;

	async fn set_ok(mut env: Environment) -> AppResult {
		env.set_status(200)?;
		Ok(env)
	}

	#[tokio::test]
	async fn default_terminal_stage_sets_the_continuation_flag() {
		let app = AppBuilder::new().build();
		let env = app(Environment::detached()).await.unwrap();
		assert!(env.continuation());
	}

	#[tokio::test]
	async fn stages_run_in_registration_order() {
		let mut builder = AppBuilder::new();
		builder.use_stage(around(|mut env: Environment, next: AppFn| async move {
			env.set("host.trace", Value::from("outer"))?;
			next(env).await
		}));
		builder.use_stage(around(|mut env: Environment, next: AppFn| async move {
			let seen = env.get("host.trace").and_then(Value::as_str).unwrap_or("").to_string();
			env.set("host.trace", Value::from(format!("{seen},inner")))?;
			next(env).await
		}));
		let app = builder.build();
		let env = app(Environment::detached()).await.unwrap();
		assert_eq!(env.get("host.trace").and_then(Value::as_str), Some("outer,inner"));
		assert!(env.continuation());
	}

	#[tokio::test]
	async fn a_terminal_custom_stage_shadows_the_default() {
		let mut builder = AppBuilder::new();
		builder.use_stage(|_next| app_fn(set_ok));
		let app = builder.build();
		let env = app(Environment::detached()).await.unwrap();
		assert!(!env.continuation());
		assert_eq!(env.get(keys::RESPONSE_STATUS_CODE).and_then(Value::as_int), Some(200));
	}

	#[test]
	fn properties_are_visible_at_setup_time() {
		let builder = AppBuilder::with_properties([("host.key".to_string(), Value::from("value"))]);
		assert_eq!(builder.property("host.key").and_then(Value::as_str), Some("value"));
	}
}
