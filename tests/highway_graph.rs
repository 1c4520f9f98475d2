// tests/highway_graph.rs

mod common;
use crate::common::{FakeExecutor, RecordingReporter, fake_highway, init_tracing};

use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use highway::errors::HighwayError;
use highway::exec::ExecError;
use highway::highway::description::{from_json, to_json};
use highway::highway::{GraphError, Invocation, RunStatus, TaskId, TaskKey};
use highway::types::DependencyPolicy;

type Trace = Arc<Mutex<Vec<String>>>;

const A: TaskKey<()> = TaskKey::new("a");
const B: TaskKey<()> = TaskKey::new("b");
const C: TaskKey<()> = TaskKey::new("c");
const D: TaskKey<()> = TaskKey::new("d");
const BUILD: TaskKey<String> = TaskKey::new("build");
const TEST: TaskKey<String> = TaskKey::new("test");

/// Body that appends `name` to `trace` and succeeds.
fn mark(
    trace: &Trace,
    name: &'static str,
) -> impl Fn(Invocation, highway::highway::TaskContext) -> std::future::Ready<anyhow::Result<()>>
+ Send
+ Sync
+ 'static {
    let trace = trace.clone();
    move |_, _| {
        trace.lock().unwrap().push(name.to_string());
        std::future::ready(Ok(()))
    }
}

fn ids(keys: &[&TaskKey<()>]) -> Vec<TaskId> {
    keys.iter().map(|k| k.id()).collect()
}

#[tokio::test]
async fn dependencies_run_depth_first_in_declaration_order() {
    init_tracing();
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let trace: Trace = Default::default();

    hw.define(&A, "", ids(&[&B, &C]), mark(&trace, "a"));
    hw.define(&B, "", ids(&[&D]), mark(&trace, "b"));
    hw.define(&C, "", [], mark(&trace, "c"));
    hw.define(&D, "", [], mark(&trace, "d"));

    hw.run("a", &Invocation::of("a")).await.unwrap();
    assert_eq!(*trace.lock().unwrap(), vec!["d", "b", "c", "a"]);
    assert_eq!(reporter.count(), 0);
}

#[tokio::test]
async fn diamond_runs_shared_dependency_twice_by_default() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let trace: Trace = Default::default();

    hw.define(&A, "", ids(&[&B, &C]), mark(&trace, "a"));
    hw.define(&B, "", ids(&[&D]), mark(&trace, "b"));
    hw.define(&C, "", ids(&[&D]), mark(&trace, "c"));
    hw.define(&D, "", [], mark(&trace, "d"));

    hw.run("a", &Invocation::of("a")).await.unwrap();
    assert_eq!(*trace.lock().unwrap(), vec!["d", "b", "d", "c", "a"]);
}

#[tokio::test]
async fn shared_dependency_also_listed_directly_runs_twice() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let trace: Trace = Default::default();

    hw.define(&A, "", [], mark(&trace, "a"));
    hw.define(&B, "", ids(&[&A]), mark(&trace, "b"));
    hw.define(&C, "", ids(&[&A, &B]), mark(&trace, "c"));

    hw.run("c", &Invocation::of("c")).await.unwrap();
    assert_eq!(*trace.lock().unwrap(), vec!["a", "a", "b", "c"]);
}

#[tokio::test]
async fn run_once_policy_memoizes_within_a_run() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::RunOnce);
    let trace: Trace = Default::default();

    hw.define(&A, "", ids(&[&B, &C]), mark(&trace, "a"));
    hw.define(&B, "", ids(&[&D]), mark(&trace, "b"));
    hw.define(&C, "", ids(&[&D]), mark(&trace, "c"));
    hw.define(&D, "", [], mark(&trace, "d"));

    hw.run("a", &Invocation::of("a")).await.unwrap();
    assert_eq!(*trace.lock().unwrap(), vec!["d", "b", "c", "a"]);

    // A new top-level run starts from scratch.
    hw.run("a", &Invocation::of("a")).await.unwrap();
    assert_eq!(trace.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn run_once_policy_detects_cycles() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::RunOnce);
    let trace: Trace = Default::default();

    hw.define(&A, "", ids(&[&B]), mark(&trace, "a"));
    hw.define(&B, "", ids(&[&A]), mark(&trace, "b"));

    let err = hw.run("a", &Invocation::of("a")).await.unwrap_err();
    assert_eq!(
        err.graph_error(),
        Some(&GraphError::Cycle("a -> b -> a".to_string()))
    );
    assert!(trace.lock().unwrap().is_empty());
    assert!(matches!(hw.validate(), Err(GraphError::Cycle(_))));
}

#[tokio::test]
async fn missing_dependency_fails_before_any_body() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let trace: Trace = Default::default();

    hw.define(&A, "", vec![B.id(), TaskId::from("missing")], mark(&trace, "a"));
    hw.define(&B, "", [], mark(&trace, "b"));

    let err = hw.run("a", &Invocation::of("a")).await.unwrap_err();
    assert_eq!(
        err.graph_error(),
        Some(&GraphError::UnknownDependency {
            task: "a".to_string(),
            dependency: "missing".to_string(),
        })
    );
    assert!(trace.lock().unwrap().is_empty());
    assert_eq!(reporter.count(), 1);
    assert!(reporter.reports()[0].contains("no such highway is registered"));
}

#[tokio::test]
async fn failing_dependency_stops_the_run() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let trace: Trace = Default::default();

    hw.define(&A, "", ids(&[&B, &C]), mark(&trace, "a"));
    hw.define(&B, "", [], |_, _| async { Err(anyhow!("compiler exploded")) });
    hw.define(&C, "", [], mark(&trace, "c"));

    let status = hw.go(&Invocation::of("a")).await;
    assert_eq!(status, RunStatus::Failure);
    assert!(trace.lock().unwrap().is_empty());

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("highway 'b' failed"));
    assert!(reports[0].contains("caused by: compiler exploded"));
}

#[tokio::test]
async fn results_flow_between_tasks() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);

    hw.define(&BUILD, "Builds", [], |_, _| async { Ok("ok".to_string()) });
    hw.define(&TEST, "Tests", [BUILD.id()], |_, cx| async move {
        let built = cx.result(&BUILD)?;
        anyhow::Ok(format!("{built}-tested"))
    });

    assert_eq!(
        hw.result(&TEST),
        Err(GraphError::NoResult("test".to_string()))
    );
    assert_eq!(hw.go(&Invocation::of("test")).await, RunStatus::Success);
    assert_eq!(hw.result(&BUILD).unwrap(), "ok");
    assert_eq!(hw.result(&TEST).unwrap(), "ok-tested");
}

#[tokio::test]
async fn reading_a_result_with_the_wrong_type_is_an_error() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);

    hw.define(&BUILD, "", [], |_, _| async { Ok("ok".to_string()) });
    hw.run("build", &Invocation::of("build")).await.unwrap();

    let as_number: TaskKey<u32> = TaskKey::named("build");
    assert!(matches!(
        hw.result(&as_number),
        Err(GraphError::ResultTypeMismatch { .. })
    ));
}

#[tokio::test]
async fn bodies_see_their_own_name_and_the_residual_arguments() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let seen: Arc<Mutex<Vec<(String, Vec<String>)>>> = Default::default();

    for key in [&A, &B] {
        let seen = seen.clone();
        let deps = if key.name() == "a" { ids(&[&B]) } else { vec![] };
        hw.define(key, "", deps, move |invocation, _| {
            let seen = seen.clone();
            async move {
                seen.lock().unwrap().push((
                    invocation.highway().unwrap_or_default().to_string(),
                    invocation.arguments().process_values(),
                ));
                Ok(())
            }
        });
    }

    let invocation = Invocation::of("a").with_arguments(["--fast"]).verbose(true);
    assert_eq!(hw.go(&invocation).await, RunStatus::Success);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("b".to_string(), vec!["--fast".to_string()]),
            ("a".to_string(), vec!["--fast".to_string()]),
        ]
    );
}

#[tokio::test]
async fn unrecognized_command_without_fallback_is_reported() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);

    let err = hw.run("deploy", &Invocation::of("deploy")).await.unwrap_err();
    assert!(matches!(
        err,
        HighwayError::Graph(GraphError::UnrecognizedCommand(ref name)) if name == "deploy"
    ));
    // `run` leaves reporting of unknown commands to `go`.
    assert_eq!(reporter.count(), 0);

    assert_eq!(hw.go(&Invocation::of("deploy")).await, RunStatus::Failure);
    assert_eq!(reporter.count(), 1);
    assert!(reporter.reports()[0].contains("unrecognized command 'deploy'"));
}

#[tokio::test]
async fn unrecognized_command_goes_to_the_fallback() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let seen: Arc<Mutex<Option<(String, Vec<String>)>>> = Default::default();

    let sink = seen.clone();
    hw.on_unrecognized(move |command, arguments, _| {
        let sink = sink.clone();
        async move {
            *sink.lock().unwrap() = Some((command, arguments.process_values()));
            Ok(())
        }
    });

    let invocation = Invocation::of("lint").with_arguments(["--fix"]);
    assert_eq!(hw.go(&invocation).await, RunStatus::Success);
    assert_eq!(
        *seen.lock().unwrap(),
        Some(("lint".to_string(), vec!["--fix".to_string()]))
    );
}

#[tokio::test]
async fn empty_invocation_uses_the_empty_handler() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);
    let calls = Arc::new(Mutex::new(0));

    assert_eq!(hw.go(&Invocation::default()).await, RunStatus::Success);

    let counter = calls.clone();
    hw.on_empty(move |_| {
        let counter = counter.clone();
        async move {
            *counter.lock().unwrap() += 1;
            Ok(())
        }
    });
    assert_eq!(hw.go(&Invocation::default()).await, RunStatus::Success);
    assert_eq!(*calls.lock().unwrap(), 1);

    hw.clear_empty_handler();
    assert_eq!(hw.go(&Invocation::default()).await, RunStatus::Failure);
    assert_eq!(reporter.count(), 1);
}

#[tokio::test]
async fn description_lists_tasks_in_registration_order() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&[], &executor, &reporter, DependencyPolicy::Repeat);

    hw.define(&TEST, "Runs the tests", [], |_, _| async { Ok(String::new()) });
    hw.define(&BUILD, "", [], |_, _| async { Ok(String::new()) });

    let description = hw.description();
    let names: Vec<&str> = description.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["test", "build"]);
    assert_eq!(description[0].usage.as_deref(), Some("Runs the tests"));
    assert_eq!(description[1].usage, None);

    let json = to_json(&description).unwrap();
    assert_eq!(from_json(&json).unwrap(), description);
}

#[tokio::test]
async fn tasks_launch_tools_through_the_system() {
    let executor = FakeExecutor::new().with_stdout("git", "abc123\n");
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&["git"], &executor, &reporter, DependencyPolicy::Repeat);

    const REV: TaskKey<String> = TaskKey::new("rev");
    hw.define(&REV, "Current revision", [], |_, cx| async move {
        let rev = cx.system().output_of("git", ["rev-parse", "HEAD"]).await?;
        anyhow::Ok(rev)
    });

    assert_eq!(hw.go(&Invocation::of("rev")).await, RunStatus::Success);
    assert_eq!(hw.result(&REV).unwrap(), "abc123");

    let launches = executor.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].executable, std::path::PathBuf::from("/fake/bin/git"));
    assert_eq!(launches[0].arguments, vec!["rev-parse", "HEAD"]);
}

#[tokio::test]
async fn unknown_tool_fails_the_task_without_launching() {
    let executor = FakeExecutor::new();
    let reporter = RecordingReporter::new();
    let mut hw = fake_highway(&["git"], &executor, &reporter, DependencyPolicy::Repeat);

    hw.define(&A, "", [], |_, cx| async move {
        let mut missing = cx.system().task("doesnotexist123")?;
        cx.system().execute(&mut missing).await?;
        anyhow::Ok(())
    });

    let err = hw.run("a", &Invocation::of("a")).await.unwrap_err();
    match err {
        HighwayError::TaskFailed { task, source } => {
            assert_eq!(task, "a");
            assert!(matches!(
                source.downcast_ref::<ExecError>(),
                Some(ExecError::ToolNotFound { .. })
            ));
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    assert!(executor.launches().is_empty());
}
