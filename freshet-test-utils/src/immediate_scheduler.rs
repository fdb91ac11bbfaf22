// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_runtime::Scheduler;

/// A scheduler that runs every task inline on the calling thread.
///
/// Makes thread-confined consumers fully synchronous and deterministic in
/// tests: once a delivery returns, its binding has run.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl ImmediateScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}
