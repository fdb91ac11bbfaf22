// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::run_loop::RunLoop;
use crate::scheduler::Scheduler;
use crate::timer::TimerHandle;
use std::time::Duration;

/// The asynchronous half of the scheduler pair.
///
/// Runs a task inline when already on the run-loop thread, otherwise posts
/// it and returns immediately. The usual choice for sinks that only need
/// delivery to *end up* on the confined thread.
#[derive(Clone, Debug)]
pub struct ConfinedScheduler {
    run_loop: RunLoop,
}

impl ConfinedScheduler {
    /// A scheduler over the given run loop.
    #[must_use]
    pub fn new(run_loop: RunLoop) -> Self {
        Self { run_loop }
    }

    /// See [`RunLoop::schedule`].
    pub fn schedule(&self, task: impl FnOnce() + Send + 'static) {
        self.run_loop.schedule(task);
    }

    /// See [`RunLoop::schedule_after`].
    pub fn schedule_after(
        &self,
        delay: Duration,
        task: impl FnOnce() + Send + 'static,
    ) -> TimerHandle {
        self.run_loop.schedule_after(delay, task)
    }

    /// See [`RunLoop::schedule_repeating`].
    pub fn schedule_repeating(
        &self,
        interval: Duration,
        task: impl FnMut() + Send + 'static,
    ) -> TimerHandle {
        self.run_loop.schedule_repeating(interval, task)
    }

    /// The run loop this scheduler confines work to.
    #[must_use]
    pub fn run_loop(&self) -> &RunLoop {
        &self.run_loop
    }
}

impl Scheduler for ConfinedScheduler {
    fn schedule(&self, task: Box<dyn FnOnce() + Send>) {
        self.run_loop.schedule(task);
    }
}

/// The blocking half of the scheduler pair.
///
/// `run_sync` blocks the calling thread until the task has run on the
/// run-loop thread and hands back its result - for the cases where an
/// immediate, ordered answer is required, such as reading current target
/// state before binding. Calling it *from* the run-loop thread is the inline
/// fast path, not a deadlock. Calling it while holding a lock that run-loop
/// tasks take is a programmer error.
#[derive(Clone, Debug)]
pub struct SyncConfinedScheduler {
    run_loop: RunLoop,
}

impl SyncConfinedScheduler {
    /// A blocking scheduler over the given run loop.
    #[must_use]
    pub fn new(run_loop: RunLoop) -> Self {
        Self { run_loop }
    }

    /// See [`RunLoop::run_sync`].
    pub fn run_sync<R: Send + 'static>(&self, task: impl FnOnce() -> R + Send + 'static) -> Option<R> {
        self.run_loop.run_sync(task)
    }

    /// The run loop this scheduler confines work to.
    #[must_use]
    pub fn run_loop(&self) -> &RunLoop {
        &self.run_loop
    }
}

impl Scheduler for SyncConfinedScheduler {
    /// Blocks until the task has completed on the run-loop thread.
    fn schedule(&self, task: Box<dyn FnOnce() + Send>) {
        let _ = self.run_loop.run_sync(task);
    }
}
