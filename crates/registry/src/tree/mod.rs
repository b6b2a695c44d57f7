//! The immutable virtual command tree.
//!
//! Nodes live in one arena and refer to each other by [`NodeId`]. Index zero
//! is a synthetic root with an empty name and path; host declarations hang
//! below it. Paths, composed permissions and effective sync flags are computed
//! once at build time.

mod build;
mod param;

use std::fmt::Write as _;

pub use param::ParamNode;
use trellis_invocation::{CommandFn, User};

use crate::decl::Meta;

/// Index of a node in its [`VirtualTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
	pub const ROOT: Self = Self(0);

	fn index(self) -> usize {
		self.0 as usize
	}
}

pub(crate) enum NodeKind {
	Root,
	Category,
	Command { params: Vec<ParamNode>, target: CommandFn },
}

pub(crate) struct Node {
	meta: Meta,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	kind: NodeKind,
	path: String,
	permission: String,
	/// Composed permission handed down to children; public nodes pass their parent's on.
	chain: String,
	sync: bool,
}

/// Categories and commands frozen into a read-only tree.
///
/// Lookups never lock; share the tree behind an `Arc` and replace it
/// wholesale when the declarations change.
pub struct VirtualTree {
	nodes: Vec<Node>,
}

impl std::fmt::Debug for VirtualTree {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VirtualTree").field("nodes", &self.nodes.len()).finish()
	}
}

impl VirtualTree {
	/// A tree with only the root.
	pub fn empty() -> Self {
		Self {
			nodes: vec![Node::root()],
		}
	}

	pub fn root(&self) -> NodeRef<'_> {
		self.node(NodeId::ROOT)
	}

	/// # Panics
	///
	/// Panics if `id` belongs to another tree.
	pub fn node(&self, id: NodeId) -> NodeRef<'_> {
		assert!(id.index() < self.nodes.len(), "node {id:?} is not part of this tree");
		NodeRef { tree: self, id }
	}

	/// Follows a space-separated path of exact names or aliases.
	pub fn find(&self, path: &str) -> Option<NodeRef<'_>> {
		path.split_whitespace()
			.try_fold(self.root(), |node, segment| node.child_named(segment))
	}

	/// Number of nodes including the root.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the tree holds no declarations.
	pub fn is_empty(&self) -> bool {
		self.nodes.len() == 1
	}

	/// Every command, depth first in declaration order.
	pub fn commands(&self) -> impl Iterator<Item = NodeRef<'_>> {
		self.root().descendants().filter(|node| node.is_command())
	}

	/// Renders the whole tree as indented lines.
	pub fn listing(&self) -> String {
		let mut out = String::new();
		for node in self.root().descendants() {
			let depth = node.depth() - 1;
			let indent = "  ".repeat(depth);
			let marker = if node.is_command() { '>' } else { '+' };
			let _ = write!(out, "{indent}{marker} {}", node.name());
			if !node.aliases().is_empty() {
				let _ = write!(out, " ({})", node.aliases().join(", "));
			}
			if !node.permission().is_empty() {
				let _ = write!(out, " [{}]", node.permission());
			}
			if node.is_sync() {
				out.push_str(" sync");
			}
			let _ = writeln!(out, ": {}", node.description());
			for param in node.params() {
				let _ = writeln!(out, "{indent}    {}: {}", param.usage(), param.description());
			}
		}
		out
	}
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
	tree: &'a VirtualTree,
	id: NodeId,
}

impl std::fmt::Debug for NodeRef<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("NodeRef").field(&self.id).field(&self.path()).finish()
	}
}

impl PartialEq for NodeRef<'_> {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.tree, other.tree) && self.id == other.id
	}
}

impl Eq for NodeRef<'_> {}

/// Result of matching one token against a node's children.
#[derive(Debug)]
pub enum ChildMatch<'a> {
	/// Exactly one child: an exact name or alias, or the only prefix match.
	One(NodeRef<'a>),
	/// Several children share the prefix and none matches exactly.
	Ambiguous(Vec<NodeRef<'a>>),
	None,
}

impl<'a> NodeRef<'a> {
	fn node(&self) -> &'a Node {
		&self.tree.nodes[self.id.index()]
	}

	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn tree(&self) -> &'a VirtualTree {
		self.tree
	}

	pub fn meta(&self) -> &'a Meta {
		&self.node().meta
	}

	pub fn name(&self) -> &'a str {
		&self.node().meta.name
	}

	pub fn aliases(&self) -> &'a [String] {
		&self.node().meta.aliases
	}

	pub fn names(&self) -> impl Iterator<Item = &'a str> + use<'a> {
		self.meta().names()
	}

	pub fn description(&self) -> &'a str {
		&self.node().meta.description
	}

	pub fn is_root(&self) -> bool {
		matches!(self.node().kind, NodeKind::Root)
	}

	pub fn is_category(&self) -> bool {
		matches!(self.node().kind, NodeKind::Category)
	}

	pub fn is_command(&self) -> bool {
		matches!(self.node().kind, NodeKind::Command { .. })
	}

	pub fn parent(&self) -> Option<NodeRef<'a>> {
		self.node().parent.map(|id| self.tree.node(id))
	}

	/// This node followed by its parents up to, but excluding, the root.
	pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
		std::iter::successors(Some(*self), |node| node.parent()).filter(|node| !node.is_root())
	}

	/// Distance from the root; the root itself is zero.
	pub fn depth(&self) -> usize {
		self.ancestors().count()
	}

	pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + ExactSizeIterator + use<'a> {
		let tree = self.tree;
		self.node().children.iter().map(move |&id| tree.node(id))
	}

	/// Pre-order walk below this node, excluding the node itself.
	pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> + use<'a> {
		let mut stack: Vec<NodeRef<'a>> = self.children().rev().collect();
		std::iter::from_fn(move || {
			let node = stack.pop()?;
			stack.extend(node.children().rev());
			Some(node)
		})
	}

	/// Space-separated names from the root down. Empty for the root.
	pub fn path(&self) -> &'a str {
		&self.node().path
	}

	/// Own permission segment. Empty means public.
	pub fn own_permission(&self) -> &'a str {
		&self.node().meta.permission
	}

	/// Own segment prefixed by the nearest restricted ancestor's composed
	/// permission, dot-joined. Public nodes have an empty permission, but
	/// their restricted descendants still compose through them.
	pub fn permission(&self) -> &'a str {
		&self.node().permission
	}

	/// Whether `user` may use this node on its own; ancestors are not consulted.
	pub fn does_match_user(&self, user: &dyn User) -> bool {
		let own = self.own_permission();
		own.is_empty() || user.has_permission(&format!("{}.{own}", self.path()))
	}

	/// Whether `user` may use this node and every ancestor.
	pub fn is_accessible_by(&self, user: &dyn User) -> bool {
		self.ancestors().all(|node| node.does_match_user(user))
	}

	/// Effective sync flag: own setting, else the nearest ancestor's, else `false`.
	pub fn is_sync(&self) -> bool {
		self.node().sync
	}

	/// Parameters in declaration order; empty for categories.
	pub fn params(&self) -> &'a [ParamNode] {
		match &self.node().kind {
			NodeKind::Command { params, .. } => params,
			_ => &[],
		}
	}

	/// The command body, for commands.
	pub fn target(&self) -> Option<&'a CommandFn> {
		match &self.node().kind {
			NodeKind::Command { target, .. } => Some(target),
			_ => None,
		}
	}

	/// Case-insensitive comparison against the name and aliases.
	pub fn matches_name(&self, token: &str) -> bool {
		self.names().any(|name| name.eq_ignore_ascii_case(token))
	}

	/// Child whose name or alias equals `token`, ignoring case.
	pub fn child_named(&self, token: &str) -> Option<NodeRef<'a>> {
		self.children().find(|child| child.matches_name(token))
	}

	/// Resolves `token` against the children.
	///
	/// An exact name or alias wins outright. Otherwise every child with a
	/// name or alias starting with `token` is a candidate.
	pub fn match_child(&self, token: &str) -> ChildMatch<'a> {
		if token.is_empty() {
			return ChildMatch::None;
		}
		if let Some(child) = self.child_named(token) {
			return ChildMatch::One(child);
		}
		let token = token.to_lowercase();
		let mut candidates: Vec<_> = self
			.children()
			.filter(|child| child.names().any(|name| name.to_lowercase().starts_with(&token)))
			.collect();
		match candidates.len() {
			0 => ChildMatch::None,
			1 => ChildMatch::One(candidates.remove(0)),
			_ => ChildMatch::Ambiguous(candidates),
		}
	}

	/// `name (aliases): description`, one line.
	pub fn summary(&self) -> String {
		let mut line = self.name().to_string();
		if !self.aliases().is_empty() {
			let _ = write!(line, " ({})", self.aliases().join(", "));
		}
		if self.is_command() && !self.params().is_empty() {
			for param in self.params() {
				line.push(' ');
				line.push_str(&param.usage());
			}
		}
		let _ = write!(line, ": {}", self.description());
		line
	}
}

impl Node {
	fn root() -> Self {
		Self {
			meta: Meta {
				name: String::new(),
				aliases: Vec::new(),
				description: String::new(),
				permission: String::new(),
				sync: None,
			},
			parent: None,
			children: Vec::new(),
			kind: NodeKind::Root,
			path: String::new(),
			permission: String::new(),
			chain: String::new(),
			sync: false,
		}
	}
}
