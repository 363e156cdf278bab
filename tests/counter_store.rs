mod common;

use common::{entries, log, Counter, CounterAction, CounterReducer};
use stateloom::{
    make_store, noop, ManualEventLoop, NoDebug, Reducer, Store, StoreBuilder, StoreError,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

fn counter_store() -> Store<CounterAction, Counter> {
    make_store(
        Counter::default(),
        CounterReducer::reduce,
        noop,
        ManualEventLoop::new(),
        NoDebug,
    )
}

#[test]
fn increment_updates_current() {
    let store = make_store(
        Counter { value: 0 },
        |model: Counter, action: CounterAction| match action {
            CounterAction::Increment => Counter {
                value: model.value + 1,
            },
            _ => model,
        },
        noop,
        ManualEventLoop::new(),
        NoDebug,
    );

    store.dispatch(CounterAction::Increment);

    assert_eq!(store.current().value, 1);
}

#[test]
fn dispatches_apply_in_program_order() {
    let seen = log();
    let sink = Arc::clone(&seen);
    let store = make_store(
        Counter::default(),
        CounterReducer::reduce,
        move |model: &Counter| sink.lock().push(model.value),
        ManualEventLoop::new(),
        NoDebug,
    );

    let actions = vec![
        CounterAction::Add(5),
        CounterAction::Decrement,
        CounterAction::Reset,
        CounterAction::Increment,
        CounterAction::Add(-3),
    ];
    let mut expected = Vec::new();
    let mut model = Counter::default();
    for action in &actions {
        model = CounterReducer::reduce(model, action.clone()).model;
        expected.push(model.value);
    }

    for action in actions {
        store.dispatch(action);
    }

    assert_eq!(entries(&seen), expected);
    assert_eq!(store.current().value, -2);
}

#[test]
fn builder_from_reducer_uses_defaults() {
    let store = StoreBuilder::<CounterAction, Counter>::from_reducer::<CounterReducer>(Counter {
        value: 10,
    })
    .build();

    store.dispatch(CounterAction::Decrement);

    assert_eq!(store.current().value, 9);
    assert_eq!(store.event_loop().pending(), 0);
}

#[test]
fn previous_snapshots_stay_valid() {
    let store = counter_store();
    let before = store.current();
    store.dispatch(CounterAction::Add(4));
    assert_eq!(before.value, 0);
    assert_eq!(store.current().value, 4);
}

#[test]
fn panicking_transition_leaves_model_unchanged() {
    let store = make_store(
        Counter::default(),
        |model: Counter, action: CounterAction| match action {
            CounterAction::Reset => panic!("reset is not handled"),
            other => CounterReducer::reduce(model, other),
        },
        noop,
        ManualEventLoop::new(),
        NoDebug,
    );
    store.dispatch(CounterAction::Add(2));

    let result = catch_unwind(AssertUnwindSafe(|| store.dispatch(CounterAction::Reset)));

    assert!(result.is_err());
    assert_eq!(store.current().value, 2);

    // The store keeps accepting dispatches afterwards.
    store.dispatch(CounterAction::Increment);
    assert_eq!(store.current().value, 3);
}

#[test]
fn nested_dispatch_runs_after_current_one() {
    let store = counter_store();
    let context = store.context();
    let seen = log();
    let observed_inside = log();
    let sink = Arc::clone(&seen);
    let inside = Arc::clone(&observed_inside);

    let _watch = store.reader().watch(move |model: &Counter| {
        sink.lock().push(model.value);
        if model.value == 1 {
            context.dispatch(CounterAction::Add(10)).unwrap();
            // Still the model of the dispatch being notified.
            inside.lock().push(context.current().unwrap().value);
        }
    });

    store.dispatch(CounterAction::Increment);

    assert_eq!(entries(&observed_inside), vec![1]);
    assert_eq!(entries(&seen), vec![1, 11]);
    assert_eq!(store.current().value, 11);
}

#[test]
fn nested_dispatches_keep_fifo_order() {
    let store = counter_store();
    let context = store.context();
    let seen = log();
    let sink = Arc::clone(&seen);

    let _watch = store.reader().watch(move |model: &Counter| {
        sink.lock().push(model.value);
        if model.value == 1 {
            context.dispatch(CounterAction::Add(10)).unwrap();
            context.dispatch(CounterAction::Add(100)).unwrap();
        }
    });

    store.dispatch(CounterAction::Increment);

    assert_eq!(entries(&seen), vec![1, 11, 111]);
}

#[test]
fn concurrent_dispatches_are_serialized() {
    let store = counter_store();
    let threads: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..250 {
                    store.dispatch(CounterAction::Increment);
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(store.current().value, 1000);
}

#[test]
fn update_bypasses_transition() {
    let store = counter_store();
    store.update(|model| Counter {
        value: model.value + 42,
    });
    assert_eq!(store.current().value, 42);
}

#[test]
fn context_reports_dropped_store() {
    let store = counter_store();
    let context = store.context();
    assert!(context.is_alive());
    context.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(context.current().unwrap().value, 1);

    drop(store);

    assert!(!context.is_alive());
    assert_eq!(
        context.dispatch(CounterAction::Increment),
        Err(StoreError::Dropped)
    );
    assert!(context.current().is_err());
}

#[test]
fn clones_share_one_store() {
    let store = counter_store();
    let other = store.clone();
    other.dispatch(CounterAction::Add(3));
    assert_eq!(store.current().value, 3);
    assert_eq!(store.id(), other.id());
}

#[test]
fn store_from_reducer() {
    let store = Store::<CounterAction, Counter>::from_reducer::<CounterReducer>(Counter { value: 1 });
    store.dispatch(CounterAction::Add(2));
    assert_eq!(store.current().value, 3);
}
