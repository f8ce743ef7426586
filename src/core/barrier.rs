//! Completion barrier for the clone worker pool

use tokio::sync::watch;

/// Counts outstanding units of work and lets callers wait until none remain
///
/// One credit is allocated per job up front. Workers hand a credit back with
/// [`CompletionBarrier::release`] right after each job they finish, so the
/// barrier opens exactly when the last job is done, independent of when the
/// job queue is closed.
#[derive(Debug)]
pub struct CompletionBarrier {
    remaining: watch::Sender<usize>,
}

impl CompletionBarrier {
    pub fn new(credits: usize) -> Self {
        let (remaining, _) = watch::channel(credits);
        Self { remaining }
    }

    /// Returns one credit. Extra releases past zero are ignored.
    pub fn release(&self) {
        self.remaining.send_modify(|remaining| {
            *remaining = remaining.saturating_sub(1);
        });
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.borrow()
    }

    /// Resolves once every credit has been released
    pub async fn wait(&self) {
        let mut receiver = self.remaining.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(|remaining| *remaining == 0).await;
    }
}
