use std::time::Duration;

use trellis_registry::{HandlerError, ParseError};

/// Why a dispatch did not run its command to a successful end.
///
/// The `Display` text of every variant is suitable for the invoking user.
/// [`DispatchError::Internal`] deliberately says nothing about the cause; the
/// cause is logged where it is caught.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
	#[error(transparent)]
	Parse(#[from] ParseError),

	#[error("'{input}' is ambiguous: {}", .candidates.join(", "))]
	Ambiguous { input: String, candidates: Vec<String> },

	#[error("missing argument '{parameter}' for '{command}'")]
	MissingArgument { command: String, parameter: String },

	#[error("'{command}' has no parameter named '{name}'")]
	UnknownParameter { command: String, name: String },

	#[error("too many arguments for '{command}': {}", .extra.join(" "))]
	TooManyArguments { command: String, extra: Vec<String> },

	#[error("{}", denied_message(.node.as_deref()))]
	PermissionDenied {
		/// First node on the path the user may not use; `None` when hidden.
		node: Option<String>,
	},

	#[error("{}", unknown_message(.input, .suggestions))]
	UnknownCommand { input: String, suggestions: Vec<String> },

	#[error("command did not finish within {0:?}")]
	TimedOut(Duration),

	#[error("command was cancelled")]
	Cancelled,

	#[error("an internal error occurred while running '{command}'")]
	Internal { command: String },

	#[error("the main context is not available")]
	MainContextClosed,
}

fn denied_message(node: Option<&str>) -> String {
	match node {
		Some(node) => format!("you do not have permission to use '{node}'"),
		None => "you do not have permission to do that".to_string(),
	}
}

fn unknown_message(input: &str, suggestions: &[String]) -> String {
	if suggestions.is_empty() {
		format!("unknown command '{input}'")
	} else {
		format!("unknown command '{input}', did you mean: {}?", suggestions.join(", "))
	}
}

impl From<HandlerError> for DispatchError {
	fn from(err: HandlerError) -> Self {
		match err {
			HandlerError::Parse(err) => Self::Parse(err),
			HandlerError::Which { input, options, .. } => Self::Ambiguous {
				input,
				candidates: options,
			},
			HandlerError::Other(err) => Self::Parse(ParseError::new("", "value", format!("{err:#}"))),
		}
	}
}

/// Structured result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
	pub success: bool,
	/// One line for the user: the command's message, or the failure text.
	pub message: Option<String>,
	/// The failure, for hosts that want to branch on it.
	pub error: Option<DispatchError>,
}

impl Outcome {
	pub fn succeeded(message: Option<String>) -> Self {
		Self {
			success: true,
			message,
			error: None,
		}
	}

	pub fn failed(error: DispatchError) -> Self {
		Self {
			success: false,
			message: Some(error.to_string()),
			error: Some(error),
		}
	}

	pub fn message(&self) -> Option<&str> {
		self.message.as_deref()
	}

	pub fn into_result(self) -> Result<Option<String>, DispatchError> {
		match self.error {
			Some(err) => Err(err),
			None => Ok(self.message),
		}
	}
}

impl From<Result<Option<String>, DispatchError>> for Outcome {
	fn from(result: Result<Option<String>, DispatchError>) -> Self {
		match result {
			Ok(message) => Self::succeeded(message),
			Err(err) => Self::failed(err),
		}
	}
}
