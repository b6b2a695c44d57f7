use std::any::Any;

/// Audible or visual cue the host may play after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
	Success,
	Failure,
}

/// The party issuing commands: a player, console operator, remote shell session.
///
/// Permission storage lives with the host; dispatch only queries it.
pub trait User: Any + Send + Sync {
	/// Identifier used in logs.
	fn name(&self) -> &str;

	/// Whether the user holds the permission node `node`.
	fn has_permission(&self, node: &str) -> bool;

	/// Delivers a line of text to the user.
	fn send_message(&self, message: &str);

	/// Plays a feedback cue. Hosts without feedback channels ignore it.
	fn feedback(&self, _kind: Feedback) {}
}

impl dyn User {
	/// Downcasts to the host's concrete user type.
	pub fn downcast_ref<T: User>(&self) -> Option<&T> {
		(self as &dyn Any).downcast_ref::<T>()
	}
}

impl std::fmt::Debug for dyn User {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("User").field("name", &self.name()).finish_non_exhaustive()
	}
}
