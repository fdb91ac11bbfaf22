// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # freshet-core
//!
//! The demand-driven publisher/subscriber protocol underlying the freshet
//! workspace, together with the producers built directly on it.
//!
//! The protocol is a three-party contract:
//!
//! - A [`Publisher`] establishes a [`Subscription`] with each subscriber.
//! - A [`Subscriber`] receives, in order: its subscription, zero or more
//!   values (each return value grants additional [`Demand`]), and exactly one
//!   terminal [`Completion`].
//! - The [`Subscription`] carries demand upstream via
//!   [`request`](Subscription::request) and supports idempotent, concurrency-safe
//!   [`cancel`](Subscription::cancel).
//!
//! A subscriber that lets its last [`AnySubscription`] handle drop releases
//! the producer's resources: background work stops and no further delivery
//! occurs. Keep the handle alive for as long as you want values.

#![allow(clippy::multiple_crate_versions)]

pub mod cancel_handle;
pub mod cancel_token;
pub mod completion;
pub mod create;
pub mod demand;
pub mod error;
pub mod factory;
pub mod lock;
pub mod on_deinit;
pub mod publisher;
pub mod replay_subject;
pub mod subscriber;
pub mod subscription;
pub mod task_bridge;
pub mod watched;

pub use self::cancel_handle::CancelHandle;
pub use self::cancel_token::CancelToken;
pub use self::completion::{Completion, Never};
pub use self::create::Create;
pub use self::demand::Demand;
pub use self::error::{FreshetError, Result};
pub use self::factory::{Empty, Fail, Just};
pub use self::lock::Guarded;
pub use self::on_deinit::OnDeinit;
pub use self::publisher::Publisher;
pub use self::replay_subject::ReplaySubject;
pub use self::subscriber::{AnySubscriber, Subscriber};
pub use self::subscription::{AnySubscription, Subscription};
pub use self::task_bridge::{Emitter, TaskBridge};
pub use self::watched::{Watched, WatchedRef};
