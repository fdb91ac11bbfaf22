// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # freshet-runtime
//!
//! Thread confinement for freshet streams.
//!
//! A [`RunLoop`] owns a dedicated OS thread driving a current-thread tokio
//! runtime. The two schedulers derived from it share one policy - run inline
//! when already on the run-loop thread, hand off otherwise - and differ only
//! in whether the caller waits:
//!
//! - [`ConfinedScheduler`] posts the task and returns immediately.
//! - [`SyncConfinedScheduler`] blocks the caller until the task has run,
//!   returning its result.
//!
//! Delayed one-shot and repeating work goes through the run loop's timers,
//! which delegate to `tokio::time` and are cancellable via [`TimerHandle`].
//! Scheduling anything after the run loop has shut down is a safe no-op.

#![allow(clippy::multiple_crate_versions)]

pub mod confined;
pub mod run_loop;
pub mod scheduler;
pub mod timer;

pub use self::confined::{ConfinedScheduler, SyncConfinedScheduler};
pub use self::run_loop::RunLoop;
pub use self::scheduler::Scheduler;
pub use self::timer::TimerHandle;
