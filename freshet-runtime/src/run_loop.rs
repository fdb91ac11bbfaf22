// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::confined::{ConfinedScheduler, SyncConfinedScheduler};
use crate::timer::TimerHandle;
use freshet_core::CancelToken;
use futures_channel::oneshot;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

/// A dedicated thread with a current-thread tokio runtime pinned to it.
///
/// Work scheduled on the run loop executes on that one thread, in FIFO
/// order. Cloning is cheap; all clones drive the same thread. The thread
/// exits when [`shutdown`](RunLoop::shutdown) is called or the last handle
/// drops; from then on every scheduling operation is a silent no-op.
pub struct RunLoop {
    core: Arc<RunLoopCore>,
}

pub(crate) struct RunLoopCore {
    thread_id: ThreadId,
    handle: tokio::runtime::Handle,
    shutdown: CancelToken,
}

impl Drop for RunLoopCore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl RunLoop {
    /// Spawns the run-loop thread.
    ///
    /// # Errors
    ///
    /// Fails if the OS thread or its runtime cannot be created.
    pub fn new(name: &str) -> std::io::Result<Self> {
        let shutdown = CancelToken::new();
        let token = shutdown.clone();
        let (startup_tx, startup_rx) = oneshot::channel();

        thread::Builder::new().name(name.to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(error) => {
                    let _ = startup_tx.send(Err(error));
                    return;
                }
            };
            if startup_tx
                .send(Ok((thread::current().id(), runtime.handle().clone())))
                .is_err()
            {
                return;
            }
            tracing::debug!("run loop started");
            runtime.block_on(token.cancelled());
            tracing::debug!("run loop shutting down");
            // Dropping the runtime here drops any still-pending tasks.
        })?;

        let (thread_id, handle) = futures::executor::block_on(startup_rx)
            .map_err(|_| {
                std::io::Error::other("run loop thread exited during startup")
            })??;

        Ok(Self {
            core: Arc::new(RunLoopCore {
                thread_id,
                handle,
                shutdown,
            }),
        })
    }

    /// Returns `true` when called from the run-loop thread itself.
    #[must_use]
    pub fn is_on_loop(&self) -> bool {
        thread::current().id() == self.core.thread_id
    }

    /// Returns `true` once the run loop has been shut down.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.core.shutdown.is_cancelled()
    }

    /// Stops the run-loop thread. Idempotent.
    ///
    /// Work already queued may still run; everything scheduled afterwards is
    /// dropped.
    pub fn shutdown(&self) {
        self.core.shutdown.cancel();
    }

    /// Runs `task` inline when already on the run-loop thread, otherwise
    /// posts it and returns immediately.
    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        if self.is_on_loop() {
            task();
            return;
        }
        if self.is_shut_down() {
            tracing::debug!("task scheduled after run loop shutdown; dropped");
            return;
        }
        self.core.handle.spawn(async move {
            task();
        });
    }

    /// Runs `task` on the run-loop thread and blocks until it has run,
    /// returning its result. Inline (without blocking) when already on the
    /// run-loop thread; `None` once the run loop has shut down.
    ///
    /// Must not be called while holding a lock that tasks on the run loop
    /// may take.
    pub fn run_sync<R: Send + 'static>(&self, task: impl FnOnce() -> R + Send + 'static) -> Option<R> {
        if self.is_on_loop() {
            return Some(task());
        }
        if self.is_shut_down() {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        self.core.handle.spawn(async move {
            let _ = tx.send(task());
        });
        futures::executor::block_on(rx).ok()
    }

    /// Runs `task` on the run-loop thread after `delay`.
    ///
    /// Cancelling the returned handle before the delay elapses means the
    /// task never runs.
    pub fn schedule_after(
        &self,
        delay: Duration,
        task: impl FnOnce() + Send + 'static,
    ) -> TimerHandle {
        let timer = TimerHandle::new();
        if self.is_shut_down() {
            timer.cancel();
            return timer;
        }
        let token = timer.token();
        self.core.handle.spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    if !token.is_cancelled() {
                        task();
                    }
                }
            }
        });
        timer
    }

    /// Runs `task` on the run-loop thread every `interval`, starting one
    /// interval from now, until the returned handle is cancelled.
    pub fn schedule_repeating(
        &self,
        interval: Duration,
        mut task: impl FnMut() + Send + 'static,
    ) -> TimerHandle {
        let timer = TimerHandle::new();
        if self.is_shut_down() {
            timer.cancel();
            return timer;
        }
        let token = timer.token();
        self.core.handle.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => return,
                    () = tokio::time::sleep(interval) => {
                        if token.is_cancelled() {
                            return;
                        }
                        task();
                    }
                }
            }
        });
        timer
    }

    /// The asynchronous scheduler over this run loop.
    #[must_use]
    pub fn scheduler(&self) -> ConfinedScheduler {
        ConfinedScheduler::new(self.clone())
    }

    /// The blocking scheduler over this run loop.
    #[must_use]
    pub fn sync_scheduler(&self) -> SyncConfinedScheduler {
        SyncConfinedScheduler::new(self.clone())
    }
}

impl Clone for RunLoop {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl core::fmt::Debug for RunLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RunLoop")
            .field("thread_id", &self.core.thread_id)
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
