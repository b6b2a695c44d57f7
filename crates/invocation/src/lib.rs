//! Canonical invocation types for command dispatch.
//!
//! A resolved command line becomes an [`Invocation`]: the command path, the
//! typed arguments bound to its parameters, and the per-dispatch
//! [`ExecutionContext`]. Command targets receive nothing else.

mod args;
mod context;
mod settings;
mod user;

use std::sync::Arc;

pub use args::{ArgError, Args, Value};
pub use context::ExecutionContext;
pub use settings::{Settings, SettingsError};
pub use user::{Feedback, User};

/// Result returned by a command target: an optional success message.
pub type CommandResult = anyhow::Result<Option<String>>;

/// A command body. Shared across dispatches and worker threads.
pub type CommandFn = Arc<dyn Fn(&Invocation) -> CommandResult + Send + Sync>;

/// A fully resolved command call handed to the command target.
#[derive(Debug)]
pub struct Invocation {
	path: String,
	args: Args,
	context: Arc<ExecutionContext>,
}

impl Invocation {
	/// Creates an invocation for the command at `path`.
	pub fn new(path: impl Into<String>, args: Args, context: Arc<ExecutionContext>) -> Self {
		Self {
			path: path.into(),
			args,
			context,
		}
	}

	/// Space-separated command path, root first.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Typed arguments keyed by parameter name.
	pub fn args(&self) -> &Args {
		&self.args
	}

	/// Typed argument lookup, shorthand for `self.args().get(name)`.
	pub fn arg<T: 'static>(&self, name: &str) -> Result<&T, ArgError> {
		self.args.get(name)
	}

	/// The context of the dispatch that produced this invocation.
	pub fn context(&self) -> &ExecutionContext {
		&self.context
	}

	/// The user who issued the command.
	pub fn user(&self) -> &dyn User {
		self.context.user()
	}

	/// Whether the dispatch was cancelled. Long-running targets should poll this.
	pub fn is_cancelled(&self) -> bool {
		self.context.is_cancelled()
	}

	/// Short description for tracing/logging.
	pub fn describe(&self) -> String {
		if self.args.is_empty() {
			format!("cmd:{}", self.path)
		} else {
			format!("cmd:{} {}", self.path, self.args.names().collect::<Vec<_>>().join(","))
		}
	}
}
