use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{Settings, User};

/// Ambient state for one dispatch.
///
/// Created when a dispatch starts and dropped when it ends; nothing in it
/// outlives the invocation except clones the command target takes itself.
pub struct ExecutionContext {
	user: Arc<dyn User>,
	settings: Arc<Settings>,
	center: Arc<str>,
	cancel: CancellationToken,
}

impl ExecutionContext {
	/// Creates a context for `user` under the dispatcher named `center`.
	pub fn new(user: Arc<dyn User>, settings: Arc<Settings>, center: Arc<str>, cancel: CancellationToken) -> Self {
		Self {
			user,
			settings,
			center,
			cancel,
		}
	}

	/// The invoking user.
	pub fn user(&self) -> &dyn User {
		&*self.user
	}

	/// Shared handle to the invoking user.
	pub fn user_arc(&self) -> &Arc<dyn User> {
		&self.user
	}

	/// Settings snapshot taken when the dispatch started.
	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	/// Name of the dispatcher that owns this dispatch.
	pub fn center(&self) -> &str {
		&self.center
	}

	/// Cancellation token of this dispatch.
	pub fn cancel_token(&self) -> &CancellationToken {
		&self.cancel
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}
}

impl std::fmt::Debug for ExecutionContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ExecutionContext")
			.field("user", &self.user.name())
			.field("center", &self.center)
			.field("cancelled", &self.cancel.is_cancelled())
			.finish()
	}
}
