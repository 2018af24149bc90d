//! The per-pipe background poll loop, grounded on `pipe_worker.py`'s
//! `PipeWorker` and this crate's `CancellationToken` cooperative-stop
//! pattern.

use crate::cancellation::CancellationToken;
use crate::config;
use crate::errors::PollError;
use crate::processor::{generate_event_failure_context, process_events_batch};
use crate::sources::Poller;
use crate::targets::PipeTarget;
use crate::transformer::InputTransformer;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Doubling backoff with no jitter (see DESIGN.md for why jitter was left
/// out) — a poll failure's retry timing should be deterministic and easy
/// to reason about in tests.
struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    attempt: u32,
}

impl ExponentialBackoff {
    fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            attempt: 0,
        }
    }

    fn next_delay(&mut self) -> Duration {
        self.attempt += 1;
        let exponent = (self.attempt - 1).min(16);
        self.initial.saturating_mul(1u32 << exponent).min(self.max)
    }

    fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// Runs one pipe's poll/process/send loop on a dedicated task.
pub struct PipeWorker {
    pipe_name: String,
    cancellation: Arc<CancellationToken>,
    notify: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PipeWorker {
    /// Spawns the poll loop and returns a handle to it.
    #[must_use]
    pub fn start(
        pipe_name: impl Into<String>,
        poller: Arc<dyn Poller>,
        transformer: Option<InputTransformer>,
        target: Arc<dyn PipeTarget>,
    ) -> Self {
        let pipe_name = pipe_name.into();
        let cancellation = Arc::new(CancellationToken::new());
        let notify = Arc::new(Notify::new());

        let notify_for_callback = notify.clone();
        cancellation.on_cancel(move || notify_for_callback.notify_waiters());

        let loop_name = pipe_name.clone();
        let loop_token = cancellation.clone();
        let loop_notify = notify.clone();
        let handle = tokio::spawn(async move {
            Self::run_loop(loop_name, poller, transformer, target, loop_token, loop_notify).await;
        });

        Self {
            pipe_name,
            cancellation,
            notify,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Signals the loop to stop. Does not block awaiting the loop's exit —
    /// the join is watched on a detached task so a slow poll/send in
    /// flight never makes a control-plane caller wait.
    pub async fn stop(&self, reason: impl Into<String>) {
        self.cancellation.cancel(reason);
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let pipe_name = self.pipe_name.clone();
            tokio::spawn(async move {
                if let Err(err) = handle.await {
                    warn!(pipe = %pipe_name, %err, "worker task join failed during stop");
                }
            });
        }
    }

    /// Whether the loop is still running: not cancelled, and its task has
    /// not already exited on its own.
    #[must_use]
    pub fn is_running(&self) -> bool {
        if self.cancellation.is_cancelled() {
            return false;
        }
        match self.handle.lock().as_ref() {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }

    async fn run_loop(
        pipe_name: String,
        poller: Arc<dyn Poller>,
        transformer: Option<InputTransformer>,
        target: Arc<dyn PipeTarget>,
        token: Arc<CancellationToken>,
        notify: Arc<Notify>,
    ) {
        info!(pipe = %pipe_name, "worker loop starting");
        let mut backoff = ExponentialBackoff::new(config::BACKOFF_INITIAL, config::BACKOFF_MAX);

        while !token.is_cancelled() {
            match poller.poll().await {
                Ok(batch) => {
                    match process_events_batch(&batch.events, transformer.as_ref(), target.as_ref())
                        .await
                    {
                        Ok(()) => {
                            if let Err(err) = poller.acknowledge(&batch).await {
                                warn!(pipe = %pipe_name, %err, "failed to acknowledge processed batch");
                            }
                            backoff.reset();
                            Self::wait(&notify, config::poll_interval()).await;
                        }
                        Err(err) => {
                            let context = generate_event_failure_context(&batch.events, &err);
                            error!(pipe = %pipe_name, %err, %context, "batch processing failed");
                            Self::wait(&notify, backoff.next_delay()).await;
                        }
                    }
                }
                Err(PollError::Empty) => {
                    Self::wait(&notify, config::poll_interval()).await;
                }
                Err(err) => {
                    error!(pipe = %pipe_name, %err, "poll failed");
                    Self::wait(&notify, backoff.next_delay()).await;
                }
            }
        }
        info!(pipe = %pipe_name, "worker loop stopped");
    }

    async fn wait(notify: &Notify, duration: Duration) {
        tokio::select! {
            () = tokio::time::sleep(duration) => {}
            () = notify.notified() => {}
        }
    }
}
