//! Serial execution context for commands that must run on the host's main thread.
//!
//! [`MainContext`] is a cloneable submission handle; [`MainLoop`] is the
//! receiving end the host drives, either by pumping [`MainLoop::run_pending`]
//! from an existing tick loop or by handing it a dedicated thread with
//! [`MainLoop::run`]. Jobs execute strictly one at a time in submission order,
//! which makes the loop the only backpressure point for sync commands.
//!
//! Panics inside a job are caught and reported through the reply channel; the
//! loop itself keeps running.

use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use crate::{TaskClass, panic_message, spawn_named_thread};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Failure to complete a call on the main context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
	/// The loop was dropped or stopped before the job produced a reply.
	#[error("main context is closed")]
	Closed,
	/// No reply arrived before the deadline. The job may still run later.
	#[error("main context did not complete the job within {0:?}")]
	TimedOut(Duration),
	/// The job panicked.
	#[error("job panicked on the main context: {0}")]
	Panicked(String),
}

/// Cloneable handle that submits jobs to the serial main context.
#[derive(Clone)]
pub struct MainContext {
	tx: mpsc::Sender<Job>,
}

impl std::fmt::Debug for MainContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MainContext").finish_non_exhaustive()
	}
}

/// Receiving end of a [`MainContext`], owned by the host's main thread.
pub struct MainLoop {
	rx: mpsc::Receiver<Job>,
}

impl MainContext {
	/// Creates a linked submission handle and loop.
	pub fn new() -> (Self, MainLoop) {
		let (tx, rx) = mpsc::channel();
		(Self { tx }, MainLoop { rx })
	}

	/// Creates a main context served by a dedicated named thread.
	///
	/// The thread exits once every [`MainContext`] clone has been dropped.
	pub fn spawn_thread(name: impl Into<String>) -> std::io::Result<(Self, std::thread::JoinHandle<()>)> {
		let (ctx, main_loop) = Self::new();
		let handle = spawn_named_thread(TaskClass::Serial, name, move || main_loop.run())?;
		Ok((ctx, handle))
	}

	/// Queues `f` and returns a receiver for its result.
	///
	/// Fails with [`CallError::Closed`] if the loop is gone.
	pub fn submit<F, R>(&self, f: F) -> Result<oneshot::Receiver<Result<R, CallError>>, CallError>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		let (reply, rx) = oneshot::channel();
		let span = tracing::Span::current();
		let job: Job = Box::new(move || {
			let _guard = span.enter();
			let result = std::panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| CallError::Panicked(panic_message(payload.as_ref())));
			if reply.send(result).is_err() {
				tracing::debug!(worker_class = TaskClass::Serial.as_str(), "main context reply dropped by caller");
			}
		});
		self.tx.send(job).map_err(|_| CallError::Closed)?;
		Ok(rx)
	}

	/// Runs `f` on the main context and waits for its result up to `timeout`.
	///
	/// The awaiting task is suspended, not the calling thread. On timeout the
	/// job stays queued and its result is discarded when it eventually runs.
	pub async fn call<F, R>(&self, f: F, timeout: Duration) -> Result<R, CallError>
	where
		F: FnOnce() -> R + Send + 'static,
		R: Send + 'static,
	{
		let rx = self.submit(f)?;
		match tokio::time::timeout(timeout, rx).await {
			Ok(Ok(result)) => result,
			Ok(Err(_)) => Err(CallError::Closed),
			Err(_) => Err(CallError::TimedOut(timeout)),
		}
	}
}

impl MainLoop {
	/// Runs every queued job without blocking. Returns the number executed.
	pub fn run_pending(&self) -> usize {
		let mut ran = 0;
		while let Ok(job) = self.rx.try_recv() {
			job();
			ran += 1;
		}
		ran
	}

	/// Runs queued jobs until `deadline`, waiting for new ones in between.
	pub fn run_until(&self, deadline: Instant) -> usize {
		let mut ran = 0;
		loop {
			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining.is_zero() {
				return ran;
			}
			match self.rx.recv_timeout(remaining) {
				Ok(job) => {
					job();
					ran += 1;
				}
				Err(mpsc::RecvTimeoutError::Timeout) => return ran,
				Err(mpsc::RecvTimeoutError::Disconnected) => return ran,
			}
		}
	}

	/// Runs jobs until every submission handle has been dropped.
	pub fn run(self) {
		while let Ok(job) = self.rx.recv() {
			job();
		}
		tracing::debug!(worker_class = TaskClass::Serial.as_str(), "main loop exited");
	}
}
