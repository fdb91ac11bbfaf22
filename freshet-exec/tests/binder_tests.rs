use freshet_core::{Completion, Guarded, Never, Publisher, ReplaySubject, Watched};
use freshet_exec::Binder;
use freshet_runtime::RunLoop;
use freshet_test_utils::ImmediateScheduler;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread::ThreadId;

#[test]
fn binds_every_value_to_the_target() {
    let counter = Watched::new(AtomicU32::new(0));
    let subject = ReplaySubject::<i32, Never>::default();
    subject.subscribe(Binder::new(&counter, ImmediateScheduler, |counter, _value| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    for n in 1..=5 {
        subject.send(n);
    }

    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn target_deallocation_cancels_the_upstream_subscription() {
    let counter = Watched::new(AtomicU32::new(0));
    let observed = counter.clone();

    let subject = ReplaySubject::<i32, Never>::default();
    subject.subscribe(Binder::new(&counter, ImmediateScheduler, |counter, _value| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(subject.subscriber_count(), 1);

    for n in 1..=5 {
        subject.send(n);
    }
    assert_eq!(observed.load(Ordering::SeqCst), 5);

    drop(counter);
    drop(observed);
    assert_eq!(subject.subscriber_count(), 0);

    // Nothing left to bind to; nothing is delivered.
    subject.send(6);
}

#[test]
fn dead_target_at_subscribe_time_cancels_immediately() {
    let target = Watched::new(AtomicU32::new(0));
    let weak = target.downgrade();
    drop(target);

    let subject = ReplaySubject::<i32, Never>::default();
    subject.subscribe(Binder::from_ref(weak, ImmediateScheduler, |counter, _value| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(subject.subscriber_count(), 0);
}

#[test]
fn binder_needs_no_explicit_demand() {
    // The binder requests unlimited demand itself; the subject can push
    // freely without anyone calling request().
    let sum = Watched::new(AtomicU32::new(0));
    let observed = sum.clone();
    let subject = ReplaySubject::<u32, Never>::default();
    subject.subscribe(Binder::new(&sum, ImmediateScheduler, |sum, value| {
        sum.fetch_add(value, Ordering::SeqCst);
    }));

    for n in [1, 2, 3, 4] {
        subject.send(n);
    }
    assert_eq!(observed.load(Ordering::SeqCst), 10);
}

#[test]
fn completion_is_ignored() {
    let counter = Watched::new(AtomicU32::new(0));
    let observed = counter.clone();
    let subject = ReplaySubject::<i32, Never>::default();
    subject.subscribe(Binder::new(&counter, ImmediateScheduler, |counter, _value| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    subject.send(1);
    subject.send_completion(Completion::Finished);

    assert_eq!(observed.load(Ordering::SeqCst), 1);
    assert!(subject.is_terminated());
}

#[test]
fn bindings_run_on_the_confined_thread() {
    let run_loop = RunLoop::new("binder-test").unwrap();
    let loop_thread = run_loop.run_sync(std::thread::current).unwrap().id();

    let seen = Watched::new(Guarded::<Vec<ThreadId>>::new(Vec::new()));
    let observed = seen.clone();
    let subject = ReplaySubject::<i32, Never>::default();
    subject.subscribe(Binder::new(&seen, run_loop.scheduler(), |seen, _value| {
        seen.with_lock(|threads| threads.push(std::thread::current().id()));
    }));

    subject.send(1);
    subject.send(2);

    // Barrier: the posted bindings have run once this returns.
    run_loop.run_sync(|| ()).unwrap();
    assert_eq!(
        observed.cloned(),
        vec![loop_thread, loop_thread]
    );
}

#[test]
fn late_replay_reaches_a_binder() {
    let counter = Watched::new(AtomicU32::new(0));
    let observed = counter.clone();
    let subject = ReplaySubject::<i32, Never>::new(2);
    subject.send(1);
    subject.send(2);
    subject.send(3);

    subject.subscribe(Binder::new(&counter, ImmediateScheduler, |counter, _value| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(observed.load(Ordering::SeqCst), 2);
}
