// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// Something that can execute a task, possibly elsewhere.
///
/// The seam consumers program against: a sink that must confine its work to
/// one thread takes any `Scheduler` rather than a concrete run loop, so
/// tests can substitute an immediate scheduler.
///
/// Implementations decide where and when the task runs; the only contract is
/// that it runs at most once, and never concurrently with other tasks
/// scheduled on the same confined scheduler.
pub trait Scheduler: Send + Sync {
    /// Executes `task` according to this scheduler's policy.
    fn schedule(&self, task: Box<dyn FnOnce() + Send>);
}
