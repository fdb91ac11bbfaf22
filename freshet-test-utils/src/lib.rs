// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # freshet-test-utils
//!
//! Test doubles and assertion helpers for the freshet workspace: a
//! recording [`TestConsumer`] with configurable demand, an
//! [`ImmediateScheduler`] that makes thread-confined sinks deterministic,
//! and async polling helpers.

#![allow(clippy::multiple_crate_versions)]

pub mod helpers;
pub mod immediate_scheduler;
pub mod test_consumer;

pub use self::helpers::{assert_stable, wait_until};
pub use self::immediate_scheduler::ImmediateScheduler;
pub use self::test_consumer::{TestConsumer, TestEvent};
