// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # freshet-exec
//!
//! Terminal consumers for freshet streams.
//!
//! [`Binder`] drives a weakly-held target from a stream, marshalling every
//! delivery onto a confined scheduler and tearing the subscription down when
//! the target is deallocated. [`Sink`] is the plain closure consumer for
//! everything else.

#![allow(clippy::multiple_crate_versions)]

pub mod binder;
pub mod sink;

pub use self::binder::Binder;
pub use self::sink::Sink;
