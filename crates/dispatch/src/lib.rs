//! Command-line resolution and execution.
//!
//! A [`Dispatcher`] owns an immutable [`VirtualTree`] built from host
//! declarations. [`Dispatcher::dispatch`] tokenizes a line, walks the tree,
//! checks permissions, binds arguments and runs the command on a worker or,
//! for sync commands, on the host's [`MainContext`]. Every failure comes back
//! as an [`Outcome`]; nothing panics or propagates out of a dispatch.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use trellis_dispatch::{CommandDecl, Dispatcher, ParamDecl, User};
//!
//! struct Console;
//!
//! impl User for Console {
//! 	fn name(&self) -> &str {
//! 		"console"
//! 	}
//!
//! 	fn has_permission(&self, _: &str) -> bool {
//! 		true
//! 	}
//!
//! 	fn send_message(&self, message: &str) {
//! 		println!("{message}");
//! 	}
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let dispatcher = Dispatcher::builder("console")
//! 	.command(
//! 		CommandDecl::new("Echo", |inv| Ok(Some(inv.arg::<String>("text")?.clone())))
//! 			.param(ParamDecl::new::<String>("text")),
//! 	)
//! 	.build()?;
//! let outcome = dispatcher.dispatch(Arc::new(Console), "echo hello").await;
//! assert_eq!(outcome.message(), Some("hello"));
//! # Ok(())
//! # }
//! ```

mod complete;
mod dispatcher;
mod error;
mod resolve;
mod tokenizer;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::{DispatchError, Outcome};
pub use tokenizer::{QuotedTokenizer, Token, Tokenizer};
pub use trellis_invocation::{
	ArgError, Args, CommandResult, ExecutionContext, Feedback, Invocation, Settings, SettingsError, User,
};
pub use trellis_registry::{
	BuildError, CategoryDecl, CommandDecl, ContextHandler, ContextRegistry, HandlerError, HandlerRegistry, NodeDecl,
	ParamDecl, ParameterHandler, ParseError, RegisterError, VirtualTree,
};
pub use trellis_worker::{MainContext, MainLoop};
