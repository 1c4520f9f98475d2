#![allow(dead_code)]

use std::sync::Arc;

use highway::highway::Highway;
use highway::types::DependencyPolicy;
pub use highway_test_utils::builders::{ConfigBuilder, TaskConfigBuilder, fake_system};
pub use highway_test_utils::fake_executor::FakeExecutor;
pub use highway_test_utils::init_tracing;
pub use highway_test_utils::reporter::RecordingReporter;

/// Empty registry on a fake system providing `tools`.
pub fn fake_highway(
    tools: &[&str],
    executor: &FakeExecutor,
    reporter: &RecordingReporter,
    policy: DependencyPolicy,
) -> Highway {
    let system = fake_system(tools, executor.clone());
    Highway::new(system, Arc::new(reporter.clone())).with_policy(policy)
}
