// Copyright 2026 Freshet contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridges a structured-concurrency task into push-based delivery.

use crate::cancel_token::CancelToken;
use crate::completion::{Completion, Never};
use crate::demand::Demand;
use crate::lock::Guarded;
use crate::publisher::Publisher;
use crate::subscriber::{AnySubscriber, Subscriber};
use crate::subscription::{AnySubscription, Subscription};
use core::future::Future;
use core::pin::Pin;
use std::sync::{Arc, Weak};

type BoxFuture<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send>>;
type Operation<T, E> = dyn Fn(Emitter<T>) -> BoxFuture<E> + Send + Sync;

/// A publisher that runs an async operation per subscription.
///
/// The operation receives an [`Emitter`] through which it pushes zero or
/// more values, and terminates by returning: `Ok(())` becomes
/// [`Completion::Finished`], `Err(e)` becomes [`Completion::Failed`].
///
/// Exactly one task is spawned per subscription, on the first positive
/// demand request; further requests while it runs are no-ops. Cancelling the
/// subscription cooperatively cancels the task and suppresses every signal
/// from then on - when cancellation races natural completion, cancellation
/// wins. Dropping the last subscription handle cancels the task too, so no
/// background work outlives its subscription.
///
/// Must be subscribed from within a tokio runtime; the task is spawned with
/// `tokio::spawn`.
///
/// ```no_run
/// use freshet_core::TaskBridge;
///
/// let ticks = TaskBridge::<u32, freshet_core::FreshetError>::new(|emitter| async move {
///     for n in 0..5 {
///         emitter.send(n);
///         tokio::time::sleep(std::time::Duration::from_millis(100)).await;
///     }
///     Ok(())
/// });
/// ```
pub struct TaskBridge<T, E> {
    operation: Arc<Operation<T, E>>,
}

impl<T, E> TaskBridge<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wraps a multi-emission async operation.
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn(Emitter<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
    {
        Self {
            operation: Arc::new(move |emitter| Box::pin(operation(emitter))),
        }
    }

    /// Wraps an async operation producing a single value.
    pub fn from_future<F, Fut>(future: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::new(move |emitter| {
            let fut = future();
            async move {
                let value = fut.await?;
                emitter.send(value);
                Ok(())
            }
        })
    }
}

impl<T> TaskBridge<T, Never>
where
    T: Send + 'static,
{
    /// Wraps a multi-emission operation that cannot fail.
    pub fn infallible<F, Fut>(operation: F) -> Self
    where
        F: Fn(Emitter<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::new(move |emitter| {
            let fut = operation(emitter);
            async move {
                fut.await;
                Ok(())
            }
        })
    }

    /// Wraps a single-value operation that cannot fail.
    pub fn infallible_future<F, Fut>(future: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::infallible(move |emitter| {
            let fut = future();
            async move {
                emitter.send(fut.await);
            }
        })
    }
}

impl<T, E> Clone for TaskBridge<T, E> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation.clone(),
        }
    }
}

impl<T, E> Publisher for TaskBridge<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Failure = E;

    fn subscribe<S>(&self, subscriber: S)
    where
        S: Subscriber<Input = T, Failure = E> + 'static,
    {
        let downstream = AnySubscriber::new(subscriber);
        let shared = Arc::new(BridgeShared {
            state: Guarded::new(BridgeState {
                downstream: Some(downstream.clone()),
                started: false,
            }),
            token: CancelToken::new(),
        });
        downstream.receive_subscription(AnySubscription::new(BridgeSubscription {
            shared,
            operation: self.operation.clone(),
        }));
    }
}

struct BridgeState<T, E> {
    downstream: Option<AnySubscriber<T, E>>,
    started: bool,
}

struct BridgeShared<T, E> {
    state: Guarded<BridgeState<T, E>>,
    token: CancelToken,
}

impl<T, E> BridgeShared<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn shut_down(&self) {
        let downstream = self.state.with_lock(|s| s.downstream.take());
        self.token.cancel();
        drop(downstream);
    }
}

trait EmitSink<T>: Send + Sync {
    fn emit(&self, value: T);
}

impl<T, E> EmitSink<T> for BridgeShared<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn emit(&self, value: T) {
        // Emissions racing cancellation are dropped, not delayed.
        if self.token.is_cancelled() {
            return;
        }
        let downstream = self.state.with_lock(|s| s.downstream.clone());
        if let Some(downstream) = downstream {
            let _ = downstream.receive(value);
        }
    }
}

/// The push side handed to a [`TaskBridge`] operation.
///
/// Holds no strong reference to the subscription: once the subscription is
/// cancelled or dropped, `send` becomes a no-op.
pub struct Emitter<T> {
    sink: Weak<dyn EmitSink<T>>,
}

impl<T> Emitter<T> {
    /// Delivers one value downstream, unless the subscription is gone.
    pub fn send(&self, value: T) {
        if let Some(sink) = self.sink.upgrade() {
            sink.emit(value);
        }
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

struct BridgeSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    shared: Arc<BridgeShared<T, E>>,
    operation: Arc<Operation<T, E>>,
}

impl<T, E> Subscription for BridgeSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn request(&self, demand: Demand) {
        if demand.is_none() {
            return;
        }
        let start = self.shared.state.with_lock(|s| {
            if s.started || s.downstream.is_none() {
                false
            } else {
                s.started = true;
                true
            }
        });
        if !start {
            return;
        }

        let strong: Arc<dyn EmitSink<T>> = self.shared.clone();
        let sink: Weak<dyn EmitSink<T>> = Arc::downgrade(&strong);
        let emitter = Emitter { sink };
        let future = (self.operation)(emitter);
        let shared = Arc::downgrade(&self.shared);
        let token = self.shared.token.clone();

        tracing::trace!("spawning bridge task");
        tokio::spawn(async move {
            tokio::select! {
                // Cancellation wins when both are ready.
                biased;
                () = token.cancelled() => {
                    tracing::trace!("bridge task cancelled");
                }
                result = future => {
                    let downstream = shared
                        .upgrade()
                        .and_then(|shared| shared.state.with_lock(|s| s.downstream.take()));
                    if let Some(downstream) = downstream {
                        downstream.receive_completion(Completion::from(result));
                    }
                }
            }
        });
    }

    fn cancel(&self) {
        self.shared.shut_down();
    }
}

impl<T, E> Drop for BridgeSubscription<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn drop(&mut self) {
        // The task is owned by this subscription; never orphan it.
        self.shared.shut_down();
    }
}
