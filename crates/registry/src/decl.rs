//! Host-facing declarations.
//!
//! Declarations are plain builders. Category and command names, and
//! permissions, are normalized to kebab-case when set; aliases and parameter
//! names are kept as written (matching is case-insensitive anyway).

use std::any::TypeId;
use std::sync::Arc;

use trellis_invocation::{CommandFn, CommandResult, Invocation};

use crate::name::normalize;

/// Description used when a declaration does not provide one.
pub const DEFAULT_DESCRIPTION: &str = "No Description Provided";

/// Metadata shared by categories and commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
	/// Normalized name.
	pub name: String,
	/// Non-blank aliases.
	pub aliases: Vec<String>,
	pub description: String,
	/// Own permission segment. Empty means public.
	pub permission: String,
	/// Whether commands must run on the main context. `None` inherits from the parent.
	pub sync: Option<bool>,
}

impl Meta {
	fn new(name: &str) -> Self {
		Self {
			name: normalize(name.trim()),
			aliases: Vec::new(),
			description: DEFAULT_DESCRIPTION.to_string(),
			permission: String::new(),
			sync: None,
		}
	}

	/// Name followed by aliases.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
	}
}

fn push_alias(aliases: &mut Vec<String>, alias: &str) {
	let alias = alias.trim();
	if !alias.is_empty() && !aliases.iter().any(|a| a == alias) {
		aliases.push(alias.to_string());
	}
}

macro_rules! meta_builders {
	($ty:ty) => {
		impl $ty {
			/// Adds an alternative name.
			pub fn alias(mut self, alias: impl AsRef<str>) -> Self {
				push_alias(&mut self.meta.aliases, alias.as_ref());
				self
			}

			/// Adds several alternative names.
			pub fn aliases<I, S>(mut self, aliases: I) -> Self
			where
				I: IntoIterator<Item = S>,
				S: AsRef<str>,
			{
				for alias in aliases {
					push_alias(&mut self.meta.aliases, alias.as_ref());
				}
				self
			}

			/// Sets the description shown in help listings.
			pub fn description(mut self, description: impl Into<String>) -> Self {
				let description = description.into();
				if !description.trim().is_empty() {
					self.meta.description = description;
				}
				self
			}

			/// Sets the permission segment. An empty string makes the node public.
			pub fn permission(mut self, permission: impl AsRef<str>) -> Self {
				self.meta.permission = normalize(permission.as_ref().trim());
				self
			}

			/// Requires (or releases) execution on the main context.
			pub fn sync(mut self, sync: bool) -> Self {
				self.meta.sync = Some(sync);
				self
			}

			pub fn meta(&self) -> &Meta {
				&self.meta
			}
		}
	};
}

/// A grouping node holding subcategories and commands.
pub struct CategoryDecl {
	pub(crate) meta: Meta,
	pub(crate) children: Vec<NodeDecl>,
}

meta_builders!(CategoryDecl);

impl CategoryDecl {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self {
			meta: Meta::new(name.as_ref()),
			children: Vec::new(),
		}
	}

	/// Appends a child category or command.
	pub fn child(mut self, child: impl Into<NodeDecl>) -> Self {
		self.children.push(child.into());
		self
	}

	pub fn children(&self) -> &[NodeDecl] {
		&self.children
	}
}

/// An invocable leaf.
pub struct CommandDecl {
	pub(crate) meta: Meta,
	pub(crate) params: Vec<ParamDecl>,
	pub(crate) target: CommandFn,
}

meta_builders!(CommandDecl);

impl CommandDecl {
	pub fn new<F>(name: impl AsRef<str>, target: F) -> Self
	where
		F: Fn(&Invocation) -> CommandResult + Send + Sync + 'static,
	{
		Self {
			meta: Meta::new(name.as_ref()),
			params: Vec::new(),
			target: Arc::new(target),
		}
	}

	/// Appends a parameter. Positional arguments fill parameters in this order.
	pub fn param(mut self, param: ParamDecl) -> Self {
		self.params.push(param);
		self
	}

	pub fn params(&self) -> &[ParamDecl] {
		&self.params
	}
}

/// Either kind of tree declaration.
pub enum NodeDecl {
	Category(CategoryDecl),
	Command(CommandDecl),
}

impl NodeDecl {
	pub fn meta(&self) -> &Meta {
		match self {
			Self::Category(c) => &c.meta,
			Self::Command(c) => &c.meta,
		}
	}
}

impl From<CategoryDecl> for NodeDecl {
	fn from(decl: CategoryDecl) -> Self {
		Self::Category(decl)
	}
}

impl From<CommandDecl> for NodeDecl {
	fn from(decl: CommandDecl) -> Self {
		Self::Command(decl)
	}
}

/// A typed command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
	pub(crate) name: String,
	pub(crate) aliases: Vec<String>,
	pub(crate) type_id: TypeId,
	pub(crate) type_name: &'static str,
	pub(crate) description: String,
	pub(crate) default: Option<String>,
	pub(crate) contextual: bool,
}

impl ParamDecl {
	/// Declares a parameter of type `T`. A handler for exactly `T` must be registered.
	pub fn new<T: 'static>(name: impl Into<String>) -> Self {
		Self {
			name: name.into().trim().to_string(),
			aliases: Vec::new(),
			type_id: TypeId::of::<T>(),
			type_name: std::any::type_name::<T>(),
			description: DEFAULT_DESCRIPTION.to_string(),
			default: None,
			contextual: false,
		}
	}

	pub fn alias(mut self, alias: impl AsRef<str>) -> Self {
		push_alias(&mut self.aliases, alias.as_ref());
		self
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		let description = description.into();
		if !description.trim().is_empty() {
			self.description = description;
		}
		self
	}

	/// Literal parsed when the parameter is not given. Blank literals are ignored.
	pub fn default_literal(mut self, literal: impl AsRef<str>) -> Self {
		let literal = literal.as_ref().trim();
		self.default = (!literal.is_empty()).then(|| literal.to_string());
		self
	}

	/// Resolves the value from the execution context when it is not given.
	pub fn contextual(mut self) -> Self {
		self.contextual = true;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn aliases(&self) -> &[String] {
		&self.aliases
	}

	/// Name followed by aliases.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	/// Full Rust type name of the parameter.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub fn description_text(&self) -> &str {
		&self.description
	}

	pub fn default(&self) -> Option<&str> {
		self.default.as_deref()
	}

	pub fn is_contextual(&self) -> bool {
		self.contextual
	}

	/// Required parameters have neither a default nor a context source.
	pub fn is_required(&self) -> bool {
		self.default.is_none() && !self.contextual
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_are_normalized_once() {
		let cmd = CommandDecl::new("ComplicatedMultiplication", |_| Ok(None)).permission("Admin");
		assert_eq!(cmd.meta().name, "complicated-multiplication");
		assert_eq!(cmd.meta().permission, "admin");
	}

	#[test]
	fn blank_aliases_and_descriptions_are_ignored() {
		let cat = CategoryDecl::new("test").aliases(["", " t ", "t"]).description("  ");
		assert_eq!(cat.meta().aliases, vec!["t".to_string()]);
		assert_eq!(cat.meta().description, DEFAULT_DESCRIPTION);
	}

	#[test]
	fn required_means_no_default_and_not_contextual() {
		assert!(ParamDecl::new::<i32>("a").is_required());
		assert!(!ParamDecl::new::<i32>("a").default_literal("3").is_required());
		assert!(!ParamDecl::new::<i32>("a").contextual().is_required());
		assert!(ParamDecl::new::<i32>("a").default_literal("  ").is_required());
	}
}
