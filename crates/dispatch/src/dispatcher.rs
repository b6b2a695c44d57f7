use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use trellis_invocation::{CommandFn, ExecutionContext, Feedback, Invocation, Settings, User};
use trellis_registry::{BuildError, ContextRegistry, HandlerRegistry, NodeDecl, VirtualTree};
use trellis_worker::{CallError, MainContext, TaskClass, join_error_panic_message, panic_message};

use crate::complete;
use crate::error::{DispatchError, Outcome};
use crate::resolve::{bind, check_access, help, walk};
use crate::tokenizer::{QuotedTokenizer, Tokenizer};

/// Resolves command lines against a [`VirtualTree`] and runs the matched command.
///
/// Cheap to clone; clones share the tree, settings and main context. The tree
/// and settings are snapshots behind [`ArcSwap`]: each dispatch loads both
/// once when it starts and keeps them until it ends.
#[derive(Clone)]
pub struct Dispatcher {
	inner: Arc<Inner>,
}

struct Inner {
	center: Arc<str>,
	tree: ArcSwap<VirtualTree>,
	settings: ArcSwap<Settings>,
	tokenizer: Box<dyn Tokenizer>,
	main: Option<MainContext>,
	handlers: HandlerRegistry,
	contexts: ContextRegistry,
}

impl std::fmt::Debug for Dispatcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Dispatcher")
			.field("center", &self.inner.center)
			.field("nodes", &self.inner.tree.load().len())
			.field("main", &self.inner.main.is_some())
			.finish_non_exhaustive()
	}
}

/// Collects everything a [`Dispatcher`] needs before the tree is built.
pub struct DispatcherBuilder {
	center: String,
	decls: Vec<NodeDecl>,
	handlers: HandlerRegistry,
	contexts: ContextRegistry,
	settings: Settings,
	tokenizer: Box<dyn Tokenizer>,
	main: Option<MainContext>,
}

impl DispatcherBuilder {
	/// Declares a top-level category or command.
	pub fn command(mut self, decl: impl Into<NodeDecl>) -> Self {
		self.decls.push(decl.into());
		self
	}

	pub fn commands<I>(mut self, decls: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<NodeDecl>,
	{
		self.decls.extend(decls.into_iter().map(Into::into));
		self
	}

	/// Replaces the handler registry. Defaults to [`HandlerRegistry::with_builtins`].
	pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
		self.handlers = handlers;
		self
	}

	/// Handler registry to add custom handlers to before building.
	pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
		&mut self.handlers
	}

	pub fn contexts(mut self, contexts: ContextRegistry) -> Self {
		self.contexts = contexts;
		self
	}

	pub fn contexts_mut(&mut self) -> &mut ContextRegistry {
		&mut self.contexts
	}

	pub fn settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	pub fn tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
		self.tokenizer = Box::new(tokenizer);
		self
	}

	/// Serial context that runs sync commands. Without one, sync commands
	/// fail with [`DispatchError::MainContextClosed`].
	pub fn main_context(mut self, main: MainContext) -> Self {
		self.main = Some(main);
		self
	}

	/// Builds the tree and the dispatcher.
	pub fn build(self) -> Result<Dispatcher, BuildError> {
		let tree = VirtualTree::build(self.decls, &self.handlers, &self.contexts)?;
		tracing::info!(center = %self.center, commands = tree.commands().count(), "dispatcher ready");
		Ok(Dispatcher {
			inner: Arc::new(Inner {
				center: Arc::from(self.center),
				tree: ArcSwap::from_pointee(tree),
				settings: ArcSwap::from_pointee(self.settings),
				tokenizer: self.tokenizer,
				main: self.main,
				handlers: self.handlers,
				contexts: self.contexts,
			}),
		})
	}
}

impl Dispatcher {
	/// Starts a builder for a dispatcher named `center`.
	pub fn builder(center: impl Into<String>) -> DispatcherBuilder {
		DispatcherBuilder {
			center: center.into(),
			decls: Vec::new(),
			handlers: HandlerRegistry::with_builtins(),
			contexts: ContextRegistry::new(),
			settings: Settings::default(),
			tokenizer: Box::new(QuotedTokenizer),
			main: None,
		}
	}

	pub fn center(&self) -> &str {
		&self.inner.center
	}

	/// Current tree snapshot.
	pub fn tree(&self) -> Arc<VirtualTree> {
		self.inner.tree.load_full()
	}

	/// Current settings snapshot.
	pub fn settings(&self) -> Arc<Settings> {
		self.inner.settings.load_full()
	}

	/// Replaces the settings for dispatches started from now on.
	pub fn update_settings(&self, settings: Settings) {
		self.inner.settings.store(Arc::new(settings));
	}

	/// Replaces the tree. In-flight dispatches finish on the old one.
	pub fn swap_tree(&self, tree: VirtualTree) -> Arc<VirtualTree> {
		let previous = self.inner.tree.swap(Arc::new(tree));
		tracing::info!(center = %self.inner.center, "command tree swapped");
		previous
	}

	/// Builds a new tree from `decls` with this dispatcher's registries and swaps it in.
	/// The current tree stays in place if the build fails.
	pub fn rebuild<I>(&self, decls: I) -> Result<(), BuildError>
	where
		I: IntoIterator,
		I::Item: Into<NodeDecl>,
	{
		let tree = VirtualTree::build(decls, &self.inner.handlers, &self.inner.contexts)?;
		self.swap_tree(tree);
		Ok(())
	}

	/// Resolves and runs `input` for `user`.
	pub async fn dispatch(&self, user: Arc<dyn User>, input: &str) -> Outcome {
		self.dispatch_with_cancel(user, input, CancellationToken::new()).await
	}

	/// Like [`Dispatcher::dispatch`], observing `cancel`.
	///
	/// Cancellation before the command starts yields
	/// [`DispatchError::Cancelled`]. A running command only sees it through
	/// [`Invocation::is_cancelled`].
	pub async fn dispatch_with_cancel(&self, user: Arc<dyn User>, input: &str, cancel: CancellationToken) -> Outcome {
		let settings = self.inner.settings.load_full();
		let context = Arc::new(ExecutionContext::new(
			user,
			Arc::clone(&settings),
			Arc::clone(&self.inner.center),
			cancel,
		));

		let outcome = Outcome::from(self.run(&context, input).await);
		match &outcome.error {
			None => tracing::debug!(user = context.user().name(), input, "dispatch succeeded"),
			Some(err) => tracing::debug!(user = context.user().name(), input, error = %err, "dispatch failed"),
		}
		if settings.feedback {
			let kind = if outcome.success { Feedback::Success } else { Feedback::Failure };
			context.user().feedback(kind);
		}
		outcome
	}

	/// Runs a dispatch on the worker runtime without waiting for it.
	pub fn spawn_dispatch(&self, user: Arc<dyn User>, input: impl Into<String>) -> JoinHandle<Outcome> {
		let this = self.clone();
		let input = input.into();
		trellis_worker::spawn(TaskClass::Dispatch, async move { this.dispatch(user, &input).await })
	}

	/// Candidate next tokens for a partial line, best first.
	///
	/// Only reads the current tree; never touches the main context.
	pub fn complete(&self, user: &dyn User, input: &str) -> Vec<String> {
		let tree = self.inner.tree.load();
		let settings = self.inner.settings.load();
		let tokens = self.inner.tokenizer.tokenize(input);
		complete::complete(&tree, &tokens, input.len(), user, &settings)
	}

	async fn run(&self, context: &Arc<ExecutionContext>, input: &str) -> Result<Option<String>, DispatchError> {
		let tree = self.inner.tree.load_full();
		let settings = context.settings();
		let user = context.user();
		let tokens = self.inner.tokenizer.tokenize(input);

		let (node, consumed) = walk(&tree, &tokens, user, settings)?;
		check_access(node, user, settings.hide_denied_node)?;
		let Some(target) = node.target() else {
			return Ok(Some(help(node, user)));
		};

		let args = bind(node, &tokens[consumed..], context)?;
		if context.is_cancelled() {
			return Err(DispatchError::Cancelled);
		}

		let path = node.path().to_string();
		let invocation = Invocation::new(path.clone(), args, Arc::clone(context));
		if node.is_sync() {
			self.run_sync(Arc::clone(target), invocation, &path, settings).await
		} else {
			run_background(Arc::clone(target), invocation, &path).await
		}
	}

	async fn run_sync(
		&self,
		target: CommandFn,
		invocation: Invocation,
		path: &str,
		settings: &Settings,
	) -> Result<Option<String>, DispatchError> {
		let Some(main) = &self.inner.main else {
			tracing::warn!(path, "sync command dispatched without a main context");
			return Err(DispatchError::MainContextClosed);
		};
		tracing::trace!(path, worker_class = "serial", "running command");

		// Whoever takes the invocation first owns it: the job runs the target,
		// the dispatch drops it once it stops waiting.
		let cancel = invocation.context().cancel_token().clone();
		let slot = Arc::new(Mutex::new(Some(invocation)));
		let job = {
			let slot = Arc::clone(&slot);
			move || {
				let invocation = slot.lock().take();
				invocation.map(|invocation| target(&invocation))
			}
		};

		let reply = tokio::select! {
			reply = main.call(job, settings.sync_timeout()) => reply,
			() = cancel.cancelled() => {
				abandon(&slot);
				tracing::debug!(path, "sync command cancelled while waiting for the main context");
				return Err(DispatchError::Cancelled);
			}
		};
		match reply {
			Ok(Some(result)) => command_result(result, path),
			Ok(None) => Err(DispatchError::Cancelled),
			Err(CallError::TimedOut(after)) => {
				abandon(&slot);
				tracing::warn!(path, ?after, "sync command timed out");
				Err(DispatchError::TimedOut(after))
			}
			Err(CallError::Closed) => {
				abandon(&slot);
				Err(DispatchError::MainContextClosed)
			}
			Err(CallError::Panicked(message)) => Err(internal(path, &message)),
		}
	}
}

/// Drops a queued invocation so the job skips its target when it finally runs.
fn abandon(slot: &Mutex<Option<Invocation>>) {
	drop(slot.lock().take());
}

async fn run_background(target: CommandFn, invocation: Invocation, path: &str) -> Result<Option<String>, DispatchError> {
	tracing::trace!(path, worker_class = "background", "running command");
	let handle = trellis_worker::spawn_blocking(TaskClass::Background, move || {
		std::panic::catch_unwind(AssertUnwindSafe(|| target(&invocation)))
	});
	match handle.await {
		Ok(Ok(result)) => command_result(result, path),
		Ok(Err(payload)) => Err(internal(path, &panic_message(payload.as_ref()))),
		Err(err) => {
			let message = join_error_panic_message(err).unwrap_or_else(|| "worker task cancelled".to_string());
			Err(internal(path, &message))
		}
	}
}

fn command_result(result: anyhow::Result<Option<String>>, path: &str) -> Result<Option<String>, DispatchError> {
	result.map_err(|err| internal(path, &format!("{err:#}")))
}

fn internal(path: &str, detail: &str) -> DispatchError {
	tracing::error!(path, detail, "command failed");
	DispatchError::Internal {
		command: path.to_string(),
	}
}
