#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use trellis_dispatch::{
	CategoryDecl, CommandDecl, ContextRegistry, Dispatcher, DispatcherBuilder, ExecutionContext, Feedback, NodeDecl,
	ParamDecl, User,
};

/// A user with a fixed permission set that records what it is sent.
pub struct TestUser {
	name: String,
	permissions: Vec<String>,
	pub messages: Mutex<Vec<String>>,
	pub feedback: Mutex<Vec<Feedback>>,
}

impl TestUser {
	pub fn new(name: &str, permissions: &[&str]) -> Arc<Self> {
		Arc::new(Self {
			name: name.to_string(),
			permissions: permissions.iter().map(|p| p.to_string()).collect(),
			messages: Mutex::new(Vec::new()),
			feedback: Mutex::new(Vec::new()),
		})
	}

	pub fn guest() -> Arc<Self> {
		Self::new("guest", &[])
	}

	pub fn admin() -> Arc<Self> {
		Self::new("root", &["admin.admin", "admin reload.reload"])
	}
}

impl User for TestUser {
	fn name(&self) -> &str {
		&self.name
	}

	fn has_permission(&self, node: &str) -> bool {
		self.permissions.iter().any(|p| p == node)
	}

	fn send_message(&self, message: &str) {
		self.messages.lock().push(message.to_string());
	}

	fn feedback(&self, kind: Feedback) {
		self.feedback.lock().push(kind);
	}
}

/// Resolved from the invoking user.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller(pub String);

/// Counts how often the `test count` command ran.
pub static COUNT_RUNS: AtomicUsize = AtomicUsize::new(0);

pub fn test_root() -> Vec<NodeDecl> {
	vec![
		CategoryDecl::new("Test")
			.alias("t")
			.description("Commands for testing")
			.child(
				CommandDecl::new("Add", |inv| {
					let a = inv.arg::<String>("string1")?;
					let b = inv.arg::<String>("string2")?;
					Ok(Some(format!("{a}{b}")))
				})
				.description("Concatenates two strings")
				.param(ParamDecl::new::<String>("string1"))
				.param(ParamDecl::new::<String>("string2").default_literal("Yeet")),
			)
			.child(
				CommandDecl::new("Multiplication", |inv| {
					let product = inv.arg::<i32>("input1")? * inv.arg::<i32>("input2")?;
					Ok(Some(product.to_string()))
				})
				.alias("mul")
				.param(ParamDecl::new::<i32>("input1").alias("a"))
				.param(ParamDecl::new::<i32>("input2").alias("b")),
			)
			.child(
				CommandDecl::new("MultiplicationTable", |inv| {
					let size = *inv.arg::<u8>("size")?;
					Ok(Some(format!("{size}x{size}")))
				})
				.param(ParamDecl::new::<u8>("size").default_literal("3")),
			)
			.child(CommandDecl::new("Toggle", |inv| Ok(Some(inv.arg::<bool>("on")?.to_string()))).param(ParamDecl::new::<bool>("on")))
			.child(CommandDecl::new("Echo", |inv| Ok(Some(inv.arg::<String>("text")?.clone()))).param(ParamDecl::new::<String>("text")))
			.child(
				CommandDecl::new("Whoami", |inv| Ok(Some(inv.arg::<Caller>("caller")?.0.clone())))
					.param(ParamDecl::new::<Caller>("caller").contextual()),
			)
			.child(CommandDecl::new("Fail", |_| Err(anyhow::anyhow!("database exploded"))))
			.child(CommandDecl::new("Panic", |_| -> trellis_dispatch::CommandResult { panic!("boom") }))
			.child(CommandDecl::new("Count", |_| {
				COUNT_RUNS.fetch_add(1, Ordering::SeqCst);
				Ok(None)
			}))
			.into(),
		CategoryDecl::new("Main")
			.sync(true)
			.child(CommandDecl::new("Thread", |_| Ok(std::thread::current().name().map(str::to_string))))
			.child(CommandDecl::new("Slow", |_| {
				std::thread::sleep(Duration::from_millis(300));
				Ok(Some("done".to_string()))
			}))
			.into(),
		CategoryDecl::new("Admin")
			.permission("admin")
			.description("Server administration")
			.child(CommandDecl::new("Reload", |_| Ok(Some("reloaded".to_string()))).permission("reload"))
			.child(CommandDecl::new("Status", |_| Ok(Some("ok".to_string()))))
			.into(),
	]
}

pub fn contexts() -> ContextRegistry {
	let mut contexts = ContextRegistry::new();
	contexts
		.register(|cx: &ExecutionContext| Some(Caller(cx.user().name().to_string())))
		.expect("first registration");
	contexts
}

pub fn builder() -> DispatcherBuilder {
	Dispatcher::builder("test").commands(test_root()).contexts(contexts())
}

pub fn dispatcher() -> Dispatcher {
	builder().build().expect("fixture builds")
}
