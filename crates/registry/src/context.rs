//! Context handlers resolve contextual parameters from the execution context.

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use trellis_invocation::{ExecutionContext, Value};

use crate::error::RegisterError;
use crate::handler::short_type_name;

/// Produces a value of one type from the ambient [`ExecutionContext`].
///
/// Returning `None` means the context has nothing to offer; the parameter
/// then falls back to its default literal.
pub trait ContextHandler: Send + Sync + 'static {
	type Value: Send + Sync + 'static;

	fn resolve(&self, context: &ExecutionContext) -> Option<Self::Value>;
}

impl<T, F> ContextHandler for F
where
	T: Send + Sync + 'static,
	F: Fn(&ExecutionContext) -> Option<T> + Send + Sync + 'static,
{
	type Value = T;

	fn resolve(&self, context: &ExecutionContext) -> Option<T> {
		self(context)
	}
}

/// Object-safe view of a [`ContextHandler`].
pub trait ErasedContextHandler: Send + Sync {
	fn value_type_name(&self) -> &'static str;

	fn resolve_value(&self, context: &ExecutionContext) -> Option<Value>;
}

struct Erased<H>(H);

impl<H: ContextHandler> ErasedContextHandler for Erased<H> {
	fn value_type_name(&self) -> &'static str {
		short_type_name(std::any::type_name::<H::Value>())
	}

	fn resolve_value(&self, context: &ExecutionContext) -> Option<Value> {
		self.0.resolve(context).map(|value| Box::new(value) as Value)
	}
}

/// Exact-type context handler lookup. First registration wins.
#[derive(Default, Clone)]
pub struct ContextRegistry {
	handlers: FxHashMap<TypeId, Arc<dyn ErasedContextHandler>>,
}

impl std::fmt::Debug for ContextRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContextRegistry").field("len", &self.handlers.len()).finish()
	}
}

impl ContextRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler` for its value type.
	pub fn register<H: ContextHandler>(&mut self, handler: H) -> Result<(), RegisterError> {
		let type_name = short_type_name(std::any::type_name::<H::Value>());
		match self.handlers.entry(TypeId::of::<H::Value>()) {
			Entry::Occupied(_) => {
				tracing::warn!(type_name, "duplicate context handler ignored; first registration wins");
				Err(RegisterError::Duplicate { type_name })
			}
			Entry::Vacant(slot) => {
				slot.insert(Arc::new(Erased(handler)));
				Ok(())
			}
		}
	}

	pub fn get(&self, id: TypeId) -> Option<&Arc<dyn ErasedContextHandler>> {
		self.handlers.get(&id)
	}

	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}
