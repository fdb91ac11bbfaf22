use freshet::prelude::*;
use freshet::{CancelHandle, Guarded};
use freshet_test_utils::{wait_until, ImmediateScheduler, TestConsumer};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn create_through_subject_to_binder() {
    // A manual producer feeding a replay subject feeding a UI-style binder.
    let source = Create::<u32, Never>::new(|subscriber| {
        for n in [1, 2, 3] {
            subscriber.receive(n);
        }
        subscriber.receive_completion(Completion::Finished);
        CancelHandle::noop()
    });

    let subject = ReplaySubject::<u32, Never>::new(3);
    source.subscribe(subject.clone());

    let sum = Watched::new(AtomicU32::new(0));
    let observed = sum.clone();
    subject.subscribe(Binder::new(&sum, ImmediateScheduler, |sum, value| {
        sum.fetch_add(value, Ordering::SeqCst);
    }));

    // The subject replays its buffer to the binder even though the source
    // completed before the binder attached.
    assert_eq!(observed.load(Ordering::SeqCst), 6);
    assert!(subject.is_terminated());
}

#[tokio::test]
async fn task_bridge_to_sink() {
    let bridge = TaskBridge::<u32, anyhow::Error>::new(|emitter| async move {
        for n in 1..=4 {
            emitter.send(n);
            tokio::task::yield_now().await;
        }
        Ok(())
    });

    let values = Arc::new(Guarded::new(Vec::new()));
    let done = Arc::new(AtomicU32::new(0));

    let recorded = values.clone();
    let finished = done.clone();
    let sink = Sink::<u32, anyhow::Error>::new(
        move |value| recorded.with_lock(|v| v.push(value)),
        move |_completion| {
            finished.fetch_add(1, Ordering::SeqCst);
        },
    );
    bridge.subscribe(sink);

    assert!(
        wait_until(
            || done.load(Ordering::SeqCst) == 1,
            Duration::from_secs(2)
        )
        .await
    );
    assert_eq!(values.cloned(), vec![1, 2, 3, 4]);
}

#[test]
fn on_deinit_drives_cleanup_through_a_subject() {
    // Deallocation of a session object fans out to every interested party.
    let session = Watched::new("session".to_string());
    let notifications = ReplaySubject::<(), Never>::default();
    OnDeinit::of(&session).subscribe(notifications.clone());

    let first = TestConsumer::<(), Never>::unlimited();
    let second = TestConsumer::<(), Never>::unlimited();
    notifications.subscribe(first.clone());
    notifications.subscribe(second.clone());

    assert_eq!(first.value_count(), 0);
    drop(session);

    assert_eq!(first.value_count(), 1);
    assert_eq!(second.value_count(), 1);
    assert_eq!(first.completion_count(), 1);
    assert!(notifications.is_terminated());
}

#[test]
fn demand_is_conserved_across_the_pipeline() {
    let subject = ReplaySubject::<i32, Never>::default();
    let consumer = TestConsumer::<i32, Never>::with_demand(Demand::max(2));
    subject.subscribe(consumer.clone());

    for n in 1..=5 {
        subject.send(n);
    }
    assert_eq!(consumer.values(), vec![1, 2]);

    consumer.request(Demand::max(2));
    assert_eq!(consumer.values(), vec![1, 2, 3, 4]);

    consumer.request(Demand::Unlimited);
    assert_eq!(consumer.values(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn additional_demand_policy_drains_one_by_one() {
    let subject = ReplaySubject::<i32, Never>::new(4);
    for n in 1..=4 {
        subject.send(n);
    }

    // One unit up front, one more granted from inside each delivery: the
    // whole replay drains through the trampoline.
    let consumer = TestConsumer::<i32, Never>::with_demand(Demand::max(1))
        .additional_demand(|_count| Demand::max(1));
    subject.subscribe(consumer.clone());

    assert_eq!(consumer.values(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn binder_on_a_run_loop_sees_bridge_values() {
    let run_loop = RunLoop::new("composition").unwrap();

    let total = Watched::new(AtomicU32::new(0));
    let observed = total.clone();

    let bridge = TaskBridge::<u32, Never>::infallible(|emitter| async move {
        for n in [10, 20, 30] {
            emitter.send(n);
        }
    });
    bridge.subscribe(Binder::new(&total, run_loop.scheduler(), |total, value| {
        total.fetch_add(value, Ordering::SeqCst);
    }));

    assert!(
        wait_until(
            || observed.load(Ordering::SeqCst) == 60,
            Duration::from_secs(2)
        )
        .await
    );
}
