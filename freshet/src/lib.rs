// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Freshet
//!
//! A small reactive-stream execution core built around explicit,
//! pull-driven flow-control credit ("demand"), thread-confined delivery,
//! drop-triggered cancellation, and a bounded-replay multicast subject.
//!
//! ## The protocol
//!
//! A [`Publisher`] establishes a [`Subscription`] with each [`Subscriber`];
//! the subscriber grants credit through [`Subscription::request`] and
//! receives, in order, its subscription, values up to the granted demand,
//! and exactly one terminal [`Completion`]. Cancellation is idempotent and
//! safe from any thread.
//!
//! **Retain your subscription.** Letting the last [`AnySubscription`]
//! handle drop releases the producer's resources and silently stops
//! delivery - the most common integration mistake with this library.
//! Consumers like [`Sink`] and [`Binder`] retain it for you.
//!
//! ## Producers
//!
//! - [`Create`]: defers to a factory closure, started on first demand.
//! - [`TaskBridge`]: runs an async operation per subscription, bridging
//!   structured concurrency into push delivery with cooperative cancellation.
//! - [`OnDeinit`]: emits once when a [`Watched`] object is deallocated.
//! - [`ReplaySubject`]: multicasts to many subscribers, replaying the last
//!   N values to late ones.
//! - [`Just`], [`Empty`], [`Fail`]: trivial single-shot publishers.
//!
//! ## Consumers
//!
//! - [`Sink`]: closure consumer with unlimited demand.
//! - [`Binder`]: binds values onto a weakly-held target on a confined
//!   scheduler ([`RunLoop`]), cancelling upstream when the target drops.
//!
//! ## Quick start
//!
//! ```
//! use freshet::prelude::*;
//!
//! let subject = ReplaySubject::<i32, Never>::new(2);
//! subject.send(1);
//! subject.send(2);
//! subject.send(3);
//!
//! let sink = Sink::values(|value| println!("got {value}"));
//! subject.subscribe(sink); // replays 2, 3, then follows live sends
//! ```

#![allow(clippy::multiple_crate_versions)]

pub use freshet_core::{
    AnySubscriber, AnySubscription, CancelHandle, CancelToken, Completion, Create, Demand, Emitter,
    Empty, Fail, FreshetError, Guarded, Just, Never, OnDeinit, Publisher, ReplaySubject, Result,
    Subscriber, Subscription, TaskBridge, Watched, WatchedRef,
};
pub use freshet_exec::{Binder, Sink};
pub use freshet_runtime::{ConfinedScheduler, RunLoop, Scheduler, SyncConfinedScheduler, TimerHandle};

/// Prelude for convenient imports.
pub mod prelude {
    pub use freshet_core::{
        Completion, Create, Demand, Empty, Fail, Just, Never, OnDeinit, Publisher, ReplaySubject,
        Subscriber, Subscription, TaskBridge, Watched, WatchedRef,
    };
    pub use freshet_exec::{Binder, Sink};
    pub use freshet_runtime::{ConfinedScheduler, RunLoop, Scheduler};
}
