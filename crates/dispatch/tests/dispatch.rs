mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use common::{COUNT_RUNS, TestUser, builder, dispatcher};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use trellis_dispatch::{
	CategoryDecl, CommandDecl, DispatchError, Dispatcher, Feedback, MainContext, MainLoop, Outcome, Settings,
};

async fn run(input: &str) -> Outcome {
	dispatcher().dispatch(TestUser::guest(), input).await
}

fn error(outcome: Outcome) -> DispatchError {
	assert!(!outcome.success, "expected failure, got {outcome:?}");
	outcome.error.expect("failed outcome carries its error")
}

#[tokio::test]
async fn add_binds_named_arguments() {
	let outcome = run("test add string1=Hi string2=There").await;
	assert_eq!(outcome, Outcome::succeeded(Some("HiThere".to_string())));
}

#[tokio::test]
async fn omitted_parameter_uses_default() {
	assert_eq!(run("test add string1=Hi").await.message(), Some("HiYeet"));
	assert_eq!(run("t add Hi").await.message(), Some("HiYeet"));
	assert_eq!(run("TEST ADD string2=There Hi").await.message(), Some("HiThere"));
}

#[tokio::test]
async fn repeated_named_argument_keeps_the_last() {
	assert_eq!(run("test add string1=a string1=b").await.message(), Some("bYeet"));
}

#[tokio::test]
async fn multiplication_parses_integers() {
	assert_eq!(run("test multiplication input1=3 input2=4").await.message(), Some("12"));
	assert_eq!(run("test multiplication a=3 B=5").await.message(), Some("15"));
	assert_eq!(run("test multiplication 10k 2").await.message(), Some("20000"));
	assert_eq!(run("test multiplication-table").await.message(), Some("3x3"));
}

#[tokio::test]
async fn quoted_values_stay_whole() {
	assert_eq!(run(r#"test echo "hello world""#).await.message(), Some("hello world"));
	assert_eq!(run(r#"test add string1="a=b""#).await.message(), Some("a=bYeet"));
	assert_eq!(run(r#"test echo "k=v""#).await.message(), Some("k=v"));
}

#[tokio::test]
async fn shared_prefix_is_ambiguous() {
	let err = error(run("test multiplicatio 3 4").await);
	assert_eq!(
		err,
		DispatchError::Ambiguous {
			input: "multiplicatio".to_string(),
			candidates: vec!["multiplication".to_string(), "multiplication-table".to_string()],
		}
	);
}

#[tokio::test]
async fn ambiguity_ignores_inaccessible_children() {
	let dispatcher = Dispatcher::builder("ops")
		.command(
			CategoryDecl::new("Server")
				.child(CommandDecl::new("Restart", |_| Ok(Some("restarted".to_string()))).permission("restart"))
				.child(CommandDecl::new("Rescan", |_| Ok(Some("rescanned".to_string())))),
		)
		.build()
		.unwrap();

	let outcome = dispatcher.dispatch(TestUser::guest(), "server res").await;
	assert_eq!(outcome.message(), Some("rescanned"));

	let operator = TestUser::new("operator", &["server restart.restart"]);
	let err = error(dispatcher.dispatch(operator, "server res").await);
	assert_eq!(
		err,
		DispatchError::Ambiguous {
			input: "res".to_string(),
			candidates: vec!["restart".to_string(), "rescan".to_string()],
		}
	);
}

#[tokio::test]
async fn unique_prefix_resolves() {
	assert_eq!(run("test tog on=yes").await.message(), Some("true"));
}

#[tokio::test]
async fn unknown_command_suggests_similar_names() {
	let err = error(run("test addd").await);
	assert_eq!(
		err,
		DispatchError::UnknownCommand {
			input: "addd".to_string(),
			suggestions: vec!["add".to_string()],
		}
	);

	let err = error(run("nothing").await);
	assert!(matches!(err, DispatchError::UnknownCommand { ref suggestions, .. } if suggestions.is_empty()));
}

#[tokio::test]
async fn argument_errors() {
	assert_eq!(
		error(run("test multiplication 3").await),
		DispatchError::MissingArgument {
			command: "test multiplication".to_string(),
			parameter: "input2".to_string(),
		}
	);
	assert_eq!(
		error(run("test add foo=1").await),
		DispatchError::UnknownParameter {
			command: "test add".to_string(),
			name: "foo".to_string(),
		}
	);
	assert_eq!(
		error(run("test multiplication 1 2 3").await),
		DispatchError::TooManyArguments {
			command: "test multiplication".to_string(),
			extra: vec!["3".to_string()],
		}
	);

	let DispatchError::Parse(err) = error(run("test multiplication x 2").await) else {
		panic!("expected a parse error");
	};
	assert_eq!(err.input, "x");
	assert_eq!(err.type_name, "i32");
}

#[tokio::test]
async fn permissions_are_checked_root_down() {
	let dispatcher = dispatcher();

	let err = error(dispatcher.dispatch(TestUser::guest(), "admin reload").await);
	assert_eq!(err, DispatchError::PermissionDenied { node: Some("admin".to_string()) });

	let half = TestUser::new("half", &["admin.admin"]);
	let err = error(dispatcher.dispatch(half.clone(), "admin reload").await);
	assert_eq!(err, DispatchError::PermissionDenied { node: Some("admin reload".to_string()) });
	assert_eq!(dispatcher.dispatch(half, "admin status").await.message(), Some("ok"));

	let outcome = dispatcher.dispatch(TestUser::admin(), "admin reload").await;
	assert_eq!(outcome.message(), Some("reloaded"));
}

#[tokio::test]
async fn denied_node_can_be_hidden() {
	let dispatcher = builder()
		.settings(Settings {
			hide_denied_node: true,
			..Settings::default()
		})
		.build()
		.unwrap();
	let outcome = dispatcher.dispatch(TestUser::guest(), "admin reload").await;
	assert_eq!(outcome.message(), Some("you do not have permission to do that"));
}

#[tokio::test]
async fn sync_commands_run_on_the_main_context() {
	let (main, handle) = MainContext::spawn_thread("host-main").unwrap();
	let dispatcher = builder().main_context(main).build().unwrap();

	let outcome = dispatcher.dispatch(TestUser::guest(), "main thread").await;
	assert_eq!(outcome.message(), Some("host-main"));

	let outcome = dispatcher.dispatch(TestUser::guest(), "test echo x").await;
	assert!(outcome.success);

	drop(dispatcher);
	handle.join().unwrap();
}

#[tokio::test]
async fn busy_main_context_times_out() {
	let (main, _main_loop) = MainContext::new();
	let dispatcher = builder()
		.main_context(main)
		.settings(Settings {
			sync_timeout_ms: 50,
			..Settings::default()
		})
		.build()
		.unwrap();
	let err = error(dispatcher.dispatch(TestUser::guest(), "main thread").await);
	assert_eq!(err, DispatchError::TimedOut(Duration::from_millis(50)));
}

/// A dispatcher whose only command is a sync counter on an unpumped main loop.
fn queued_sync_dispatcher(timeout_ms: u64) -> (Dispatcher, MainLoop, Arc<AtomicUsize>) {
	let runs = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&runs);
	let (main, main_loop) = MainContext::new();
	let dispatcher = Dispatcher::builder("queued")
		.command(
			CommandDecl::new("Tick", move |_| {
				counter.fetch_add(1, Ordering::SeqCst);
				Ok(None)
			})
			.sync(true),
		)
		.main_context(main)
		.settings(Settings {
			sync_timeout_ms: timeout_ms,
			..Settings::default()
		})
		.build()
		.unwrap();
	(dispatcher, main_loop, runs)
}

#[tokio::test]
async fn cancel_while_queued_abandons_the_sync_job() {
	let (dispatcher, main_loop, runs) = queued_sync_dispatcher(5_000);
	let user = TestUser::guest();
	let cancel = CancellationToken::new();
	let trigger = cancel.clone();
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(20)).await;
		trigger.cancel();
	});

	let started = Instant::now();
	let outcome = dispatcher.dispatch_with_cancel(user.clone(), "tick", cancel).await;
	assert_eq!(error(outcome), DispatchError::Cancelled);
	assert!(started.elapsed() < Duration::from_secs(5));
	assert_eq!(Arc::strong_count(&user), 1);

	// The job is still queued but no longer holds the invocation.
	assert_eq!(main_loop.run_pending(), 1);
	assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn timed_out_sync_job_never_runs_its_target() {
	let (dispatcher, main_loop, runs) = queued_sync_dispatcher(30);
	let user = TestUser::guest();

	let err = error(dispatcher.dispatch(user.clone(), "tick").await);
	assert_eq!(err, DispatchError::TimedOut(Duration::from_millis(30)));
	assert_eq!(Arc::strong_count(&user), 1);

	assert_eq!(main_loop.run_pending(), 1);
	assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn sync_without_main_context_fails() {
	assert_eq!(error(run("main thread").await), DispatchError::MainContextClosed);
}

#[tokio::test]
async fn target_failures_become_internal_errors() {
	let outcome = run("test fail").await;
	assert_eq!(outcome.message(), Some("an internal error occurred while running 'test fail'"));
	assert_eq!(error(outcome), DispatchError::Internal { command: "test fail".to_string() });

	let err = error(run("test panic").await);
	assert_eq!(err, DispatchError::Internal { command: "test panic".to_string() });
}

#[tokio::test]
async fn categories_answer_with_help() {
	let outcome = run("test").await;
	assert!(outcome.success);
	let help = outcome.message().unwrap();
	assert!(help.starts_with("test: Commands for testing"), "{help}");
	assert!(help.contains("  add <string1: String> <string2: String = Yeet>: Concatenates two strings"), "{help}");

	let top = run("").await;
	let top = top.message().unwrap();
	assert!(top.contains("test (t)"), "{top}");
	assert!(top.contains("main"), "{top}");
	assert!(!top.contains("admin"), "{top}");

	let admin = dispatcher().dispatch(TestUser::admin(), "admin").await;
	assert!(admin.message().unwrap().contains("reload"));
}

#[tokio::test]
async fn contextual_parameters_come_from_the_user() {
	let dispatcher = dispatcher();
	let outcome = dispatcher.dispatch(TestUser::new("alice", &[]), "test whoami").await;
	assert_eq!(outcome.message(), Some("alice"));

	let err = error(dispatcher.dispatch(TestUser::guest(), "test whoami bob").await);
	assert!(matches!(err, DispatchError::TooManyArguments { .. }));
}

#[tokio::test]
async fn context_is_released_after_dispatch() {
	let dispatcher = dispatcher();
	let user = TestUser::guest();
	for input in ["test add Hi", "test fail", "test multiplication 1", "nothing", "test"] {
		dispatcher.dispatch(user.clone(), input).await;
		assert_eq!(Arc::strong_count(&user), 1, "after {input:?}");
	}
}

#[tokio::test]
async fn cancelled_dispatch_never_runs_the_target() {
	let dispatcher = dispatcher();
	let cancel = CancellationToken::new();
	cancel.cancel();
	let before = COUNT_RUNS.load(Ordering::SeqCst);
	let outcome = dispatcher.dispatch_with_cancel(TestUser::guest(), "test count", cancel).await;
	assert_eq!(error(outcome), DispatchError::Cancelled);
	assert_eq!(COUNT_RUNS.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn feedback_follows_the_outcome() {
	let dispatcher = dispatcher();
	let user = TestUser::guest();
	dispatcher.dispatch(user.clone(), "test echo x").await;
	dispatcher.dispatch(user.clone(), "test nope").await;
	assert_eq!(*user.feedback.lock(), vec![Feedback::Success, Feedback::Failure]);

	dispatcher.update_settings(Settings {
		feedback: false,
		..Settings::default()
	});
	dispatcher.dispatch(user.clone(), "test echo x").await;
	assert_eq!(user.feedback.lock().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_dispatches_are_independent() {
	let dispatcher = dispatcher();
	let handles: Vec<_> = (0..32)
		.map(|i| {
			let user: Arc<dyn trellis_dispatch::User> = TestUser::guest();
			(i, dispatcher.spawn_dispatch(user, format!("test multiplication {i} {}", i + 1)))
		})
		.collect();
	for (i, handle) in handles {
		let outcome = handle.await.unwrap();
		assert_eq!(outcome.message(), Some((i * (i + 1)).to_string().as_str()));
	}
}

#[tokio::test]
async fn rebuild_swaps_the_tree() {
	let dispatcher = dispatcher();
	let before = dispatcher.tree();
	dispatcher
		.rebuild([CommandDecl::new("Ping", |_| Ok(Some("pong".to_string())))])
		.unwrap();

	assert_eq!(run_on(&dispatcher, "ping").await.message(), Some("pong"));
	assert!(matches!(error(run_on(&dispatcher, "test add Hi").await), DispatchError::UnknownCommand { .. }));
	// Snapshots taken earlier are unaffected.
	assert!(before.find("test add").is_some());

	let failed = dispatcher.rebuild([CommandDecl::new("Ping", |_| Ok(None)), CommandDecl::new("ping", |_| Ok(None))]);
	assert!(failed.is_err());
	assert_eq!(run_on(&dispatcher, "ping").await.message(), Some("pong"));
}

async fn run_on(dispatcher: &trellis_dispatch::Dispatcher, input: &str) -> Outcome {
	dispatcher.dispatch(TestUser::guest(), input).await
}

#[tokio::test]
async fn debug_matching_only_adds_traces() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::new("trellis_dispatch=debug"))
		.with_test_writer()
		.try_init();

	let dispatcher = builder()
		.settings(Settings {
			debug_matching: true,
			..Settings::default()
		})
		.build()
		.unwrap();
	let outcome = dispatcher.dispatch(TestUser::guest(), "t mul 6 7").await;
	assert_eq!(outcome.message(), Some("42"));
	assert!(matches!(
		error(dispatcher.dispatch(TestUser::guest(), "test multiplicatio").await),
		DispatchError::Ambiguous { .. }
	));
}
