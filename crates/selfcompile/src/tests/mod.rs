//! Crate-level integration and BDD tests.

use std::sync::{Arc, Mutex};

use crate::invoker::{BuildExecutor, InvokeError, Invocation};


/// Executor that records every invocation and optionally fails the build.
#[derive(Clone, Default)]
struct RecordingExecutor {
    calls: Arc<Mutex<Vec<Invocation>>>,
    fail_build: bool,
}

impl RecordingExecutor {
    fn failing_build() -> Self {
        Self {
            fail_build: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl BuildExecutor for RecordingExecutor {
    fn run(&self, invocation: &Invocation) -> Result<(), InvokeError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(invocation.clone());
        let is_fetch = invocation.args().iter().any(|arg| arg == "-d");
        if self.fail_build && !is_fetch {
            return Err(InvokeError::NonZeroExit {
                program: invocation.program().to_path_buf(),
                status: 1,
            });
        }
        Ok(())
    }
}

#[test]
fn recording_executor_keeps_call_order() {
    let executor = RecordingExecutor::default();
    let first = Invocation::new("go", ["get", "-d", "a"], "/work");
    let second = Invocation::new("go", ["get", "a"], "/work");
    executor.run(&first).expect("fetch");
    executor.run(&second).expect("build");
    assert_eq!(executor.calls(), vec![first, second]);
}
