//! Declaration model, parameter handling and the virtual command tree.
//!
//! Hosts describe their commands with [`CategoryDecl`], [`CommandDecl`] and
//! [`ParamDecl`], register [`ParameterHandler`]s for every parameter type in a
//! [`HandlerRegistry`] (and [`ContextHandler`]s for contextual parameters),
//! then freeze everything into a [`VirtualTree`]. The tree is immutable after
//! [`VirtualTree::build`]; replacing commands means building a new tree.

pub mod context;
pub mod decl;
pub mod error;
pub mod handler;
pub mod name;
pub mod tree;

pub use context::{ContextHandler, ContextRegistry, ErasedContextHandler};
pub use decl::{CategoryDecl, CommandDecl, DEFAULT_DESCRIPTION, Meta, NodeDecl, ParamDecl};
pub use error::{BuildError, HandlerError, ParseError, RegisterError};
pub use handler::{ErasedHandler, HandlerRegistry, ParameterHandler};
pub use name::normalize;
pub use tree::{ChildMatch, NodeId, NodeRef, ParamNode, VirtualTree};
