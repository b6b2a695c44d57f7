use std::sync::Arc;

use trellis_invocation::{ExecutionContext, Value};
use trellis_worker::MemoCell;

use crate::context::ErasedContextHandler;
use crate::decl::ParamDecl;
use crate::error::HandlerError;
use crate::handler::{ErasedHandler, short_type_name};

/// A parameter of a built command, with its handlers resolved.
pub struct ParamNode {
	decl: ParamDecl,
	handler: Option<Arc<dyn ErasedHandler>>,
	context: Option<Arc<dyn ErasedContextHandler>>,
	examples: MemoCell<Vec<String>>,
}

impl std::fmt::Debug for ParamNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ParamNode")
			.field("name", &self.decl.name)
			.field("type", &self.type_name())
			.field("default", &self.decl.default)
			.field("contextual", &self.decl.contextual)
			.finish()
	}
}

impl ParamNode {
	pub(crate) fn new(
		decl: ParamDecl,
		handler: Option<Arc<dyn ErasedHandler>>,
		context: Option<Arc<dyn ErasedContextHandler>>,
	) -> Self {
		Self {
			decl,
			handler,
			context,
			examples: MemoCell::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.decl.name
	}

	pub fn aliases(&self) -> &[String] {
		&self.decl.aliases
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.decl.names()
	}

	/// Case-insensitive comparison against the name and aliases.
	pub fn matches_name(&self, name: &str) -> bool {
		self.names().any(|n| n.eq_ignore_ascii_case(name))
	}

	pub fn description(&self) -> &str {
		&self.decl.description
	}

	/// Short name of the parameter type.
	pub fn type_name(&self) -> &'static str {
		short_type_name(self.decl.type_name)
	}

	pub fn default_literal(&self) -> Option<&str> {
		self.decl.default()
	}

	pub fn is_contextual(&self) -> bool {
		self.decl.contextual
	}

	pub fn is_required(&self) -> bool {
		self.decl.is_required()
	}

	/// Parses a literal through the type's handler.
	///
	/// Contextual parameters without a text handler reject every literal.
	pub fn parse(&self, text: &str) -> Result<Value, HandlerError> {
		match &self.handler {
			Some(handler) => handler.parse_value(text),
			None => Err(HandlerError::parse(text, self.type_name(), "value only comes from context")),
		}
	}

	/// Value supplied by the context handler, if any.
	pub fn resolve_context(&self, context: &ExecutionContext) -> Option<Value> {
		self.context.as_ref().and_then(|handler| handler.resolve_value(context))
	}

	/// Parses the default literal. `None` when there is no default.
	pub fn default_value(&self) -> Option<Result<Value, HandlerError>> {
		self.default_literal().map(|literal| self.parse(literal))
	}

	/// Formats a value of this parameter's type.
	pub fn format(&self, value: &Value) -> Option<String> {
		self.handler.as_ref().and_then(|handler| handler.format_any(value.as_ref()))
	}

	/// Every possible value, formatted. Computed once per tree.
	pub fn examples(&self) -> Arc<Vec<String>> {
		self.examples
			.get_or_compute(|| self.handler.as_ref().map(|handler| handler.examples()).unwrap_or_default())
	}

	/// Possible values for `input`, as the handler filters them.
	pub fn examples_for(&self, input: &str) -> Vec<String> {
		match &self.handler {
			Some(handler) => handler.examples_for(input),
			None => Vec::new(),
		}
	}

	/// A placeholder literal for usage text.
	pub fn random_literal(&self) -> Option<String> {
		self.handler.as_ref().map(|handler| handler.random_literal())
	}

	/// `<name: type = default>` for required and optional parameters alike.
	pub fn usage(&self) -> String {
		let mut usage = format!("<{}: {}", self.decl.name, self.type_name());
		if let Some(default) = self.default_literal() {
			usage.push_str(" = ");
			usage.push_str(default);
		}
		if self.is_contextual() {
			usage.push_str(" @context");
		}
		usage.push('>');
		usage
	}
}
