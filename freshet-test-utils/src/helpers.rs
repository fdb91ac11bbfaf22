// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;

/// Polls `condition` every few milliseconds until it holds or `timeout`
/// elapses. Returns whether it held.
pub async fn wait_until(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Asserts that `probe` returns the same value at the start and end of the
/// window - for checking that cancelled work really stopped.
///
/// # Panics
///
/// Panics if the probed value changes within the window.
pub async fn assert_stable<V>(probe: impl Fn() -> V, window: Duration)
where
    V: PartialEq + core::fmt::Debug,
{
    let before = probe();
    tokio::time::sleep(window).await;
    let after = probe();
    assert_eq!(before, after, "probed value changed within the window");
}
