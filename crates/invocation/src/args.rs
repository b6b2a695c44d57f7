use std::any::Any;

/// A type-erased parsed argument value.
pub type Value = Box<dyn Any + Send + Sync>;

/// Typed argument access failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
	#[error("no argument named '{0}'")]
	Missing(String),
	#[error("argument '{name}' is not a {expected}")]
	Type { name: String, expected: &'static str },
}

/// Arguments bound to a command's parameters, in declaration order.
#[derive(Default)]
pub struct Args {
	entries: Vec<(String, Value)>,
}

impl Args {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a value under `name`. A later value with the same name shadows earlier ones.
	pub fn insert(&mut self, name: impl Into<String>, value: Value) {
		let name = name.into();
		self.entries.retain(|(existing, _)| *existing != name);
		self.entries.push((name, value));
	}

	/// Returns the value for `name` as `T`.
	pub fn get<T: 'static>(&self, name: &str) -> Result<&T, ArgError> {
		let (_, value) = self
			.entries
			.iter()
			.find(|(n, _)| n == name)
			.ok_or_else(|| ArgError::Missing(name.to_string()))?;
		value.downcast_ref::<T>().ok_or_else(|| ArgError::Type {
			name: name.to_string(),
			expected: std::any::type_name::<T>(),
		})
	}

	/// Parameter names in declaration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(n, _)| n.as_str())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl std::fmt::Debug for Args {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(self.names()).finish()
	}
}
