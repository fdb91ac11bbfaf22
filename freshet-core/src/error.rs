// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The concrete error type for applications that need one.
//!
//! Stream failure channels stay generic: a publisher's `Failure` type can be
//! any error, and [`Never`](crate::Never) forbids failure statically.
//! `FreshetError` is the canonical choice when nothing more specific exists.

/// Convenience alias using [`FreshetError`] as the error type.
pub type Result<T> = core::result::Result<T, FreshetError>;

/// Root error type for freshet operations.
///
/// Cloneable so it can serve as the stored terminal of a multicast subject,
/// which replays one failure to many subscribers.
#[derive(Clone, Debug, thiserror::Error)]
pub enum FreshetError {
    /// A bridged operation failed.
    #[error("operation failed: {context}")]
    Operation {
        /// Description of what went wrong.
        context: String,
    },

    /// A subscription could not make progress.
    #[error("subscription error: {context}")]
    Subscription {
        /// Details about the subscription failure.
        context: String,
    },

    /// An operation was attempted in an inappropriate state.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// An error produced by user code, carried through the stream.
    #[error("user error: {0}")]
    User(std::sync::Arc<dyn std::error::Error + Send + Sync>),
}

impl FreshetError {
    /// Creates an operation error with the given context.
    pub fn operation(context: impl Into<String>) -> Self {
        Self::Operation {
            context: context.into(),
        }
    }

    /// Creates a subscription error with the given context.
    pub fn subscription(context: impl Into<String>) -> Self {
        Self::Subscription {
            context: context.into(),
        }
    }

    /// Creates an invalid-state error with the given message.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Wraps an arbitrary error produced by user code.
    pub fn user(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::User(std::sync::Arc::new(err))
    }
}
