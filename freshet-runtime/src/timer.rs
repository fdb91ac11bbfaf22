// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::CancelToken;

/// Handle to a delayed or repeating task scheduled on a run loop.
///
/// Cancellation is idempotent and final: once `cancel` returns, the timer
/// will not fire again (a tick already executing may finish). Dropping the
/// handle does *not* cancel the timer; fire-and-forget is allowed.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    token: CancelToken,
}

impl TimerHandle {
    pub(crate) fn new() -> Self {
        Self {
            token: CancelToken::new(),
        }
    }

    pub(crate) fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Stops the timer.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the timer has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
