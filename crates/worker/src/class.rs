/// Execution classes used for scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work marshalled onto the host's serial main context.
	Serial,
	/// Command bodies running on the shared worker pool.
	Background,
	/// Dispatch bookkeeping: resolution, completion and result delivery.
	Dispatch,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Serial => "serial",
			Self::Background => "background",
			Self::Dispatch => "dispatch",
		}
	}
}
