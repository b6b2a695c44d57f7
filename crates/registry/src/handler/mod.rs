//! Parameter handlers: text to typed value and back.
//!
//! A [`ParameterHandler`] serves exactly one value type. The
//! [`HandlerRegistry`] stores handlers type-erased as [`ErasedHandler`] and
//! resolves them by exact [`TypeId`]; there is no subtype or collection
//! fallback.

mod builtins;
mod multiplier;
mod registry;

use std::any::{Any, TypeId};
use std::panic::AssertUnwindSafe;

pub use builtins::{
	BoolHandler, CharHandler, F32Handler, F64Handler, I8Handler, I16Handler, I32Handler, I64Handler, IsizeHandler,
	StringHandler, U8Handler, U16Handler, U32Handler, U64Handler, UsizeHandler,
};
pub use multiplier::{MULTIPLIER_C, MULTIPLIER_H, MULTIPLIER_K, MULTIPLIER_M, MULTIPLIER_R, multiplier_for, split_multiplier};
pub use registry::HandlerRegistry;
use trellis_invocation::Value;
use trellis_worker::panic_message;

use crate::error::{HandlerError, ParseError};

/// Parse, format and enumerate values of one type.
pub trait ParameterHandler: Send + Sync + 'static {
	/// The exact type this handler serves.
	type Value: Send + Sync + 'static;

	/// Converts text to a value.
	///
	/// Return [`HandlerError::Which`] when the text matches several values and
	/// [`HandlerError::Parse`] when it matches none. Any other error is
	/// folded into a parse error by [`ParameterHandler::safe_parse`].
	fn parse(&self, text: &str) -> Result<Self::Value, HandlerError>;

	/// Converts a value back to text that [`ParameterHandler::parse`] accepts.
	fn format(&self, value: &Self::Value) -> String;

	/// Every value of the type, for completion. Keep this list small; it is
	/// not meant for domains with millions of values.
	fn possibilities(&self) -> Vec<Self::Value> {
		Vec::new()
	}

	/// Possibilities whose formatted text starts or ends with the trimmed
	/// `input`. Blank input returns everything.
	///
	/// The two-sided filter is deliberately loose; the fuzzy matcher ranks
	/// the survivors afterwards.
	fn possibilities_for(&self, input: &str) -> Vec<Self::Value> {
		let input = input.trim();
		let all = self.possibilities();
		if input.is_empty() {
			return all;
		}
		all.into_iter()
			.filter(|value| {
				let text = self.format(value);
				text.starts_with(input) || text.ends_with(input)
			})
			.collect()
	}

	/// A literal suitable as an example or placeholder default.
	fn random_default(&self) -> String;

	/// Short type name used in messages.
	fn type_name(&self) -> &'static str {
		short_type_name(std::any::type_name::<Self::Value>())
	}

	/// [`ParameterHandler::parse`] with every failure other than ambiguity
	/// reported as [`HandlerError::Parse`], including panics.
	fn safe_parse(&self, text: &str) -> Result<Self::Value, HandlerError> {
		match std::panic::catch_unwind(AssertUnwindSafe(|| self.parse(text))) {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(HandlerError::Other(err))) => Err(ParseError::new(text, self.type_name(), format!("{err:#}")).into()),
			Ok(Err(err)) => Err(err),
			Err(payload) => Err(ParseError::new(text, self.type_name(), panic_message(payload.as_ref())).into()),
		}
	}
}

/// Object-safe view of a [`ParameterHandler`] used by the registry and tree.
pub trait ErasedHandler: Send + Sync {
	/// `TypeId` of the served value type.
	fn value_type_id(&self) -> TypeId;

	/// Short name of the served value type.
	fn value_type_name(&self) -> &'static str;

	/// Safely parses `text` into a boxed value.
	fn parse_value(&self, text: &str) -> Result<Value, HandlerError>;

	/// Formats a boxed value. Returns `None` if it is not of the served type.
	fn format_any(&self, value: &(dyn Any + Send + Sync)) -> Option<String>;

	/// Formatted possibilities.
	fn examples(&self) -> Vec<String>;

	/// Formatted possibilities filtered by `input`.
	fn examples_for(&self, input: &str) -> Vec<String>;

	/// See [`ParameterHandler::random_default`].
	fn random_literal(&self) -> String;
}

impl<H: ParameterHandler> ErasedHandler for H {
	fn value_type_id(&self) -> TypeId {
		TypeId::of::<H::Value>()
	}

	fn value_type_name(&self) -> &'static str {
		self.type_name()
	}

	fn parse_value(&self, text: &str) -> Result<Value, HandlerError> {
		self.safe_parse(text).map(|value| Box::new(value) as Value)
	}

	fn format_any(&self, value: &(dyn Any + Send + Sync)) -> Option<String> {
		value.downcast_ref::<H::Value>().map(|value| self.format(value))
	}

	fn examples(&self) -> Vec<String> {
		self.possibilities().iter().map(|value| self.format(value)).collect()
	}

	fn examples_for(&self, input: &str) -> Vec<String> {
		self.possibilities_for(input).iter().map(|value| self.format(value)).collect()
	}

	fn random_literal(&self) -> String {
		self.random_default()
	}
}

/// Last path segment of a non-generic type name.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
	if full.contains('<') {
		return full;
	}
	full.rsplit("::").next().unwrap_or(full)
}

/// Whether `type_name` names a collection, which never gets a handler.
pub(crate) fn is_collection(type_name: &str) -> bool {
	const PREFIXES: &[&str] = &[
		"alloc::vec::Vec<",
		"alloc::collections::",
		"std::collections::",
		"hashbrown::",
		"indexmap::",
		"smallvec::",
		"[",
		"&[",
	];
	PREFIXES.iter().any(|p| type_name.starts_with(p))
}
