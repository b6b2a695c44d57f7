use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::builtins::*;
use super::{ErasedHandler, ParameterHandler, is_collection};
use crate::error::RegisterError;

/// Exact-type handler lookup.
///
/// The first handler registered for a type wins; later registrations for the
/// same type are rejected with [`RegisterError::Duplicate`].
#[derive(Default, Clone)]
pub struct HandlerRegistry {
	handlers: FxHashMap<TypeId, Arc<dyn ErasedHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut names: Vec<_> = self.handlers.values().map(|h| h.value_type_name()).collect();
		names.sort_unstable();
		f.debug_struct("HandlerRegistry").field("types", &names).finish()
	}
}

impl HandlerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry holding the primitive handlers.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry.insert(StringHandler);
		registry.insert(BoolHandler);
		registry.insert(CharHandler);
		registry.insert(I8Handler);
		registry.insert(I16Handler);
		registry.insert(I32Handler);
		registry.insert(I64Handler);
		registry.insert(IsizeHandler);
		registry.insert(U8Handler);
		registry.insert(U16Handler);
		registry.insert(U32Handler);
		registry.insert(U64Handler);
		registry.insert(UsizeHandler);
		registry.insert(F32Handler);
		registry.insert(F64Handler);
		registry
	}

	fn insert<H: ParameterHandler>(&mut self, handler: H) {
		self.handlers.insert(TypeId::of::<H::Value>(), Arc::new(handler));
	}

	/// Registers `handler` for its value type.
	pub fn register<H: ParameterHandler>(&mut self, handler: H) -> Result<(), RegisterError> {
		let type_name = handler.type_name();
		if is_collection(std::any::type_name::<H::Value>()) {
			return Err(RegisterError::UnsupportedCollection { type_name });
		}
		match self.handlers.entry(TypeId::of::<H::Value>()) {
			Entry::Occupied(_) => {
				tracing::warn!(type_name, "duplicate parameter handler ignored; first registration wins");
				Err(RegisterError::Duplicate { type_name })
			}
			Entry::Vacant(slot) => {
				tracing::trace!(type_name, "registered parameter handler");
				slot.insert(Arc::new(handler));
				Ok(())
			}
		}
	}

	/// Handler for the exact type `id`.
	pub fn get(&self, id: TypeId) -> Option<&Arc<dyn ErasedHandler>> {
		self.handlers.get(&id)
	}

	/// Handler for the exact type `T`.
	pub fn get_for<T: 'static>(&self) -> Option<&Arc<dyn ErasedHandler>> {
		self.get(TypeId::of::<T>())
	}

	pub fn contains(&self, id: TypeId) -> bool {
		self.handlers.contains_key(&id)
	}

	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}
}
