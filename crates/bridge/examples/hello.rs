//! Minimal host: registers one application and dispatches one request,
//! printing every forwarded effect.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use gangway_bridge::{
	AppDescriptor, AppRegistry, Dispatcher, HostRequest, HostResponse, StaticCatalog, StaticModule,
};
use gangway_env::ForwardError;

/// Host that prints effects instead of writing to a socket.
struct PrintingHost;

#[async_trait]
impl HostResponse for PrintingHost {
	async fn set_status(&self, status: u16) -> Result<(), ForwardError> {
		println!("status: {status}");
		Ok(())
	}

	async fn set_header(&self, name: &str, values: &[String]) -> Result<(), ForwardError> {
		println!("header: {name}: {}", values.join(","));
		Ok(())
	}

	async fn remove_header(&self, name: &str) -> Result<(), ForwardError> {
		println!("remove header: {name}");
		Ok(())
	}

	async fn remove_all_headers(&self) -> Result<(), ForwardError> {
		println!("remove all headers");
		Ok(())
	}

	async fn write(&self, chunk: Bytes) -> Result<(), ForwardError> {
		println!("body chunk: {}", String::from_utf8_lossy(&chunk));
		Ok(())
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

	let module = StaticModule::new().with_direct("Startup", "configuration", |mut env: gangway_env::Environment| async move {
		env.set_status(200)?;
		let headers = env.response_headers().expect("response headers");
		headers.insert("Content-Type", "text/plain");
		let stream = env.response_stream().expect("response stream");
		stream.write_all(b"Hello from the other side!\n").await.map_err(anyhow::Error::new)?;
		Ok(env)
	});
	let registry = Arc::new(AppRegistry::new(Arc::new(StaticCatalog::new().with_module("hello", module))));
	let dispatcher = Dispatcher::new(Arc::clone(&registry));

	let handle = registry.resolve(&AppDescriptor::new("hello")).await?;
	let continuation = dispatcher
		.dispatch(handle, HostRequest::new("GET", "/hello"), Arc::new(PrintingHost))
		.await?;
	println!("continuation: {continuation:?}");
	Ok(())
}
