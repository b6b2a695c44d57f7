//! Error types for parsing, handler registration and tree construction.

/// Text could not be converted to a parameter type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not parse '{input}' as {type_name}: {reason}")]
pub struct ParseError {
	/// The offending text.
	pub input: String,
	/// Short name of the target type.
	pub type_name: &'static str,
	/// Why the conversion failed.
	pub reason: String,
}

impl ParseError {
	pub fn new(input: impl Into<String>, type_name: &'static str, reason: impl Into<String>) -> Self {
		Self {
			input: input.into(),
			type_name,
			reason: reason.into(),
		}
	}
}

/// Failure reported by a parameter handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
	/// The text does not describe a value of the type.
	#[error(transparent)]
	Parse(#[from] ParseError),

	/// The text matches more than one value; the user has to pick.
	#[error("'{input}' matches several {type_name} values: {}", .options.join(", "))]
	Which {
		input: String,
		type_name: &'static str,
		options: Vec<String>,
	},

	/// Any other failure inside a handler. `safe_parse` turns this into [`HandlerError::Parse`].
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl HandlerError {
	/// Shorthand for a [`HandlerError::Parse`].
	pub fn parse(input: impl Into<String>, type_name: &'static str, reason: impl Into<String>) -> Self {
		Self::Parse(ParseError::new(input, type_name, reason))
	}
}

/// Handler registration failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
	/// A handler for the exact type is already registered. The first one stays.
	#[error("a handler for {type_name} is already registered")]
	Duplicate { type_name: &'static str },

	/// Collection types have no handlers.
	#[error("collection type {type_name} cannot have a parameter handler")]
	UnsupportedCollection { type_name: &'static str },
}

/// Failure to assemble declarations into a virtual tree.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
	#[error("blank node name under '{parent}'")]
	EmptyName { parent: String },

	#[error("'{name}' is declared more than once under '{parent}'")]
	DuplicateName { parent: String, name: String },

	#[error("parameter '{name}' is declared more than once on '{command}'")]
	DuplicateParameter { command: String, name: String },

	#[error("no parameter handler for {type_name} (parameter '{parameter}' on '{command}')")]
	MissingHandler {
		command: String,
		parameter: String,
		type_name: &'static str,
	},

	#[error("no context handler for {type_name} (contextual parameter '{parameter}' on '{command}')")]
	MissingContextHandler {
		command: String,
		parameter: String,
		type_name: &'static str,
	},

	#[error("collection type {type_name} is not supported (parameter '{parameter}' on '{command}')")]
	UnsupportedCollection {
		command: String,
		parameter: String,
		type_name: &'static str,
	},

	#[error("default '{literal}' of parameter '{parameter}' on '{command}' does not parse: {source}")]
	InvalidDefault {
		command: String,
		parameter: String,
		literal: String,
		#[source]
		source: HandlerError,
	},
}
