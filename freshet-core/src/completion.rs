// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

/// The one-time terminal signal ending a subscription's value stream.
///
/// A subscriber receives exactly one `Completion` per subscription, after
/// which no further values or signals arrive on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion<E> {
    /// The stream ended normally.
    Finished,
    /// The stream ended with an error.
    Failed(E),
}

impl<E> Completion<E> {
    /// Returns `true` if the stream ended normally.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Completion::Finished)
    }

    /// Returns `true` if the stream ended with an error.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Completion::Failed(_))
    }

    /// Converts into the failure, discarding a normal finish.
    pub fn failure(self) -> Option<E> {
        match self {
            Completion::Finished => None,
            Completion::Failed(e) => Some(e),
        }
    }

    /// Maps the failure type, leaving a normal finish untouched.
    pub fn map_failure<F, M>(self, f: M) -> Completion<F>
    where
        M: FnOnce(E) -> F,
    {
        match self {
            Completion::Finished => Completion::Finished,
            Completion::Failed(e) => Completion::Failed(f(e)),
        }
    }
}

/// An uninhabited failure type for streams that cannot fail.
///
/// A publisher with `Failure = Never` statically guarantees its terminal
/// signal is [`Completion::Finished`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Never {}

impl core::fmt::Display for Never {
    fn fmt(&self, _f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {}
    }
}

impl std::error::Error for Never {}

impl<E> From<Result<(), E>> for Completion<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Completion::Finished,
            Err(e) => Completion::Failed(e),
        }
    }
}
