mod common;

use common::{Event, Recorder};
use freshet_core::{
    AnySubscriber, CancelHandle, Completion, Create, Demand, Guarded, Never, Publisher,
    Subscriber,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

#[test]
fn factory_runs_only_after_first_positive_request() {
    let started = Arc::new(AtomicBool::new(false));
    let flag = started.clone();
    let publisher = Create::<i32, Never>::new(move |_subscriber| {
        flag.store(true, Ordering::SeqCst);
        CancelHandle::noop()
    });

    let recorder = Recorder::<i32, Never>::with_demand(Demand::none(), Demand::none());
    publisher.subscribe(recorder.clone());

    assert!(recorder.has_subscription());
    assert!(!started.load(Ordering::SeqCst));

    recorder.request(Demand::max(1));
    assert!(started.load(Ordering::SeqCst));
}

#[test]
fn repeated_requests_start_the_factory_once() {
    let starts = Arc::new(AtomicU32::new(0));
    let counter = starts.clone();
    let publisher = Create::<i32, Never>::new(move |_subscriber| {
        counter.fetch_add(1, Ordering::SeqCst);
        CancelHandle::noop()
    });

    let recorder = Recorder::<i32, Never>::unlimited();
    publisher.subscribe(recorder.clone());
    recorder.request(Demand::max(3));
    recorder.request(Demand::Unlimited);

    assert_eq!(starts.load(Ordering::SeqCst), 1);
}

#[test]
fn delivers_values_and_exactly_one_terminal() {
    let publisher = Create::<i32, Never>::new(|subscriber| {
        subscriber.receive(1);
        subscriber.receive(2);
        subscriber.receive_completion(Completion::Finished);
        // Anything after the terminal must be swallowed.
        subscriber.receive(3);
        subscriber.receive_completion(Completion::Finished);
        CancelHandle::noop()
    });

    let recorder = Recorder::<i32, Never>::unlimited();
    publisher.subscribe(recorder.clone());

    assert_eq!(
        recorder.events(),
        vec![
            Event::Value(1),
            Event::Value(2),
            Event::Completion(Completion::Finished),
        ]
    );
}

#[test]
fn cancel_runs_the_handle_exactly_once_and_stops_delivery() {
    let cancelled = Arc::new(AtomicU32::new(0));
    let retained: Arc<Guarded<Option<AnySubscriber<i32, Never>>>> = Arc::new(Guarded::new(None));

    let counter = cancelled.clone();
    let stash = retained.clone();
    let publisher = Create::<i32, Never>::new(move |subscriber| {
        stash.with_lock(|slot| *slot = Some(subscriber));
        let counter = counter.clone();
        CancelHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });

    let recorder = Recorder::<i32, Never>::unlimited();
    publisher.subscribe(recorder.clone());

    let driver = retained.cloned().expect("factory ran");
    driver.receive(1);

    recorder.cancel();
    recorder.cancel();
    assert_eq!(cancelled.load(Ordering::SeqCst), 1);

    // Emissions from the still-running factory work go nowhere.
    assert_eq!(driver.receive(2), Demand::none());
    assert_eq!(recorder.values(), vec![1]);
    assert_eq!(recorder.completion_count(), 0);
}

#[test]
fn releasing_the_subscription_runs_the_handle() {
    let cancelled = Arc::new(AtomicU32::new(0));
    let counter = cancelled.clone();
    let publisher = Create::<i32, Never>::new(move |_subscriber| {
        let counter = counter.clone();
        CancelHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });

    let recorder = Recorder::<i32, Never>::unlimited();
    publisher.subscribe(recorder.clone());
    assert_eq!(cancelled.load(Ordering::SeqCst), 0);

    recorder.release_subscription();
    assert_eq!(cancelled.load(Ordering::SeqCst), 1);
}

#[test]
fn terminal_from_factory_releases_the_handle() {
    let cancelled = Arc::new(AtomicU32::new(0));
    let counter = cancelled.clone();
    let publisher = Create::<i32, Never>::new(move |subscriber| {
        subscriber.receive_completion(Completion::Finished);
        let counter = counter.clone();
        CancelHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });

    let recorder = Recorder::<i32, Never>::unlimited();
    publisher.subscribe(recorder.clone());

    assert_eq!(recorder.completion_count(), 1);
    assert_eq!(cancelled.load(Ordering::SeqCst), 1);
}
