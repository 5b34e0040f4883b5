//! Fire-and-forget side effects.
//!
//! Work dispatched here runs on its own task with its own error boundary: its
//! outcome is logged and never reaches the request that triggered it.

use std::{fmt::Display, future::Future};

use tokio::{runtime::Handle, task::JoinHandle};

/// Spawn `work` without awaiting it. Failures are logged under `task`.
///
/// Returns `None` when called outside a tokio runtime, in which case the work
/// is dropped (and logged) rather than panicking the caller.
pub fn detach<F, E>(task: &'static str, work: F) -> Option<JoinHandle<()>>
where
  F: Future<Output = Result<(), E>> + Send + 'static,
  E: Display + Send + 'static,
{
  let Ok(handle) = Handle::try_current() else {
    tracing::warn!(task, "no runtime available; detached task dropped");
    return None;
  };
  Some(handle.spawn(async move {
    if let Err(error) = work.await {
      tracing::warn!(task, %error, "detached task failed");
    }
  }))
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  };

  use super::*;

  #[tokio::test]
  async fn detached_work_runs_and_failures_stay_contained() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();
    let handle = detach("test", async move {
      flag.store(true, Ordering::SeqCst);
      Err::<(), _>("boom")
    })
    .unwrap();
    handle.await.unwrap();
    assert!(ran.load(Ordering::SeqCst));
  }

  #[test]
  fn outside_a_runtime_work_is_dropped() {
    assert!(detach("test", async { Ok::<(), String>(()) }).is_none());
  }
}
