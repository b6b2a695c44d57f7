use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::{Node, NodeId, NodeKind, ParamNode, VirtualTree};
use crate::context::ContextRegistry;
use crate::decl::{CommandDecl, Meta, NodeDecl};
use crate::error::BuildError;
use crate::handler::{HandlerRegistry, is_collection, short_type_name};

impl VirtualTree {
	/// Assembles top-level declarations into a tree.
	///
	/// Every parameter type must have a handler in `handlers`, and every
	/// contextual parameter a context handler in `contexts`. Default literals
	/// are parsed here so a bad default fails the build instead of a dispatch.
	pub fn build<I>(decls: I, handlers: &HandlerRegistry, contexts: &ContextRegistry) -> Result<Self, BuildError>
	where
		I: IntoIterator,
		I::Item: Into<NodeDecl>,
	{
		let mut builder = Builder {
			nodes: vec![Node::root()],
			handlers,
			contexts,
		};
		for decl in decls {
			builder.add(NodeId::ROOT, decl.into())?;
		}
		let tree = VirtualTree { nodes: builder.nodes };
		tracing::debug!(nodes = tree.len(), commands = tree.commands().count(), "built virtual tree");
		Ok(tree)
	}
}

struct Builder<'r> {
	nodes: Vec<Node>,
	handlers: &'r HandlerRegistry,
	contexts: &'r ContextRegistry,
}

fn display_path(path: &str) -> String {
	if path.is_empty() { "<root>".to_string() } else { path.to_string() }
}

impl Builder<'_> {
	fn add(&mut self, parent: NodeId, decl: NodeDecl) -> Result<(), BuildError> {
		let meta = decl.meta().clone();
		let parent_node = &self.nodes[parent.index()];
		if meta.name.is_empty() {
			return Err(BuildError::EmptyName {
				parent: display_path(&parent_node.path),
			});
		}
		self.check_sibling_names(parent, &meta)?;

		let parent_node = &self.nodes[parent.index()];
		let path = if parent_node.path.is_empty() {
			meta.name.clone()
		} else {
			format!("{} {}", parent_node.path, meta.name)
		};
		let (permission, chain) = match (meta.permission.as_str(), parent_node.chain.as_str()) {
			("", inherited) => (String::new(), inherited.to_string()),
			(own, "") => (own.to_string(), own.to_string()),
			(own, inherited) => {
				let composed = format!("{inherited}.{own}");
				(composed.clone(), composed)
			}
		};
		let sync = meta.sync.unwrap_or(parent_node.sync);

		let (kind, children) = match decl {
			NodeDecl::Category(category) => (NodeKind::Category, category.children),
			NodeDecl::Command(command) => (self.command_kind(&path, command)?, Vec::new()),
		};

		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(Node {
			meta,
			parent: Some(parent),
			children: Vec::new(),
			kind,
			path,
			permission,
			chain,
			sync,
		});
		self.nodes[parent.index()].children.push(id);

		for child in children {
			self.add(id, child)?;
		}
		Ok(())
	}

	fn check_sibling_names(&self, parent: NodeId, meta: &Meta) -> Result<(), BuildError> {
		let parent_node = &self.nodes[parent.index()];
		let taken: FxHashSet<String> = parent_node
			.children
			.iter()
			.flat_map(|id| self.nodes[id.index()].meta.names())
			.map(str::to_lowercase)
			.collect();
		match meta.names().find(|name| taken.contains(&name.to_lowercase())) {
			Some(name) => Err(BuildError::DuplicateName {
				parent: display_path(&parent_node.path),
				name: name.to_string(),
			}),
			None => Ok(()),
		}
	}

	fn command_kind(&self, path: &str, command: CommandDecl) -> Result<NodeKind, BuildError> {
		let mut seen = FxHashSet::default();
		let mut params = Vec::with_capacity(command.params.len());

		for decl in command.params {
			if decl.name.is_empty() {
				return Err(BuildError::EmptyName { parent: path.to_string() });
			}
			let mut own = FxHashSet::default();
			for name in decl.names() {
				let lower = name.to_lowercase();
				if own.insert(lower.clone()) && !seen.insert(lower) {
					return Err(BuildError::DuplicateParameter {
						command: path.to_string(),
						name: name.to_string(),
					});
				}
			}

			let type_name = short_type_name(decl.type_name);
			if is_collection(decl.type_name) {
				return Err(BuildError::UnsupportedCollection {
					command: path.to_string(),
					parameter: decl.name,
					type_name,
				});
			}

			let handler = self.handlers.get(decl.type_id).cloned();
			let context = if decl.contextual {
				let Some(context) = self.contexts.get(decl.type_id) else {
					return Err(BuildError::MissingContextHandler {
						command: path.to_string(),
						parameter: decl.name,
						type_name,
					});
				};
				Some(Arc::clone(context))
			} else {
				None
			};
			if handler.is_none() && (!decl.contextual || decl.default.is_some()) {
				return Err(BuildError::MissingHandler {
					command: path.to_string(),
					parameter: decl.name,
					type_name,
				});
			}

			let param = ParamNode::new(decl, handler, context);
			if let Some(Err(source)) = param.default_value() {
				return Err(BuildError::InvalidDefault {
					command: path.to_string(),
					parameter: param.name().to_string(),
					literal: param.default_literal().unwrap_or_default().to_string(),
					source,
				});
			}
			params.push(param);
		}

		Ok(NodeKind::Command {
			params,
			target: command.target,
		})
	}
}
