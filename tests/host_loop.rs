mod common;

use common::{Counter, CounterAction, CounterReducer};
use stateloom::{make_store, noop, Context, Effect, NoDebug, Reducer, TokioEventLoop, Transition};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn next<T>(receiver: &mut mpsc::UnboundedReceiver<T>) -> T {
    timeout(WAIT, receiver.recv())
        .await
        .expect("timed out waiting for the event loop")
        .expect("channel closed")
}

#[tokio::test]
async fn effects_run_on_the_runtime_in_order() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let store = make_store(
        0,
        move |model: i32, action: i32| {
            let sender = sender.clone();
            (
                model + action,
                Effect::new(move |_| {
                    let _ = sender.send(action);
                }),
            )
        },
        noop,
        TokioEventLoop::current(),
        NoDebug,
    );

    for action in 1..=5 {
        store.dispatch(action);
    }
    assert_eq!(*store.current(), 15);

    let mut seen = Vec::new();
    for _ in 0..5 {
        seen.push(next(&mut receiver).await);
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn effect_dispatch_reaches_the_store() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let store = make_store(
        Counter::default(),
        move |model: Counter, action: CounterAction| {
            let follow_up = action == CounterAction::Increment;
            let model = CounterReducer::reduce(model, action).model;
            let sender = sender.clone();
            let effect = Effect::new(move |ctx: &Context<CounterAction, Counter>| {
                if follow_up {
                    ctx.dispatch(CounterAction::Add(10)).unwrap();
                }
                let _ = sender.send(ctx.current().unwrap().value);
            });
            Transition::with_effect(model, effect)
        },
        noop,
        TokioEventLoop::current(),
        NoDebug,
    );

    store.dispatch(CounterAction::Increment);

    // Both effects read the model after the follow-up dispatch.
    assert_eq!(next(&mut receiver).await, 11);
    assert_eq!(next(&mut receiver).await, 11);
    assert_eq!(store.current().value, 11);
}

#[tokio::test]
async fn spawn_async_completes_on_the_loop() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let store = make_store(
        Vec::<u64>::new(),
        |mut model: Vec<u64>, value: u64| {
            model.push(value);
            model
        },
        noop,
        TokioEventLoop::current(),
        NoDebug,
    );

    store
        .context()
        .spawn_async(
            || (1..=10u64).sum::<u64>(),
            move |ctx, total| {
                ctx.dispatch(total)?;
                let _ = sender.send(());
                Ok(())
            },
        )
        .unwrap();

    next(&mut receiver).await;
    assert_eq!(*store.current(), vec![55]);
}

#[tokio::test]
async fn failing_effect_goes_to_error_handler() {
    let (errors, mut receiver) = mpsc::unbounded_channel();
    let event_loop = TokioEventLoop::with_error_handler(Handle::current(), move |err| {
        let _ = errors.send(format!("{err:#}"));
    });
    let store = make_store(
        0,
        |model: i32, action: i32| {
            (
                model + action,
                Effect::fallible(move |_| anyhow::bail!("cannot handle {action}")),
            )
        },
        noop,
        event_loop,
        NoDebug,
    );

    store.dispatch(3);

    assert_eq!(next(&mut receiver).await, "cannot handle 3");
    assert_eq!(*store.current(), 3);
}

#[tokio::test]
async fn dropped_store_skips_pending_effects() {
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let event_loop = TokioEventLoop::current();
    let store = make_store(
        0,
        move |model: i32, action: i32| {
            let sender = sender.clone();
            (
                model + action,
                Effect::new(move |_| {
                    let _ = sender.send(action);
                }),
            )
        },
        noop,
        event_loop.clone(),
        NoDebug,
    );

    store.dispatch(1);
    drop(store);

    // A marker posted after the orphaned effect proves the driver moved past it.
    let (marker, mut done) = mpsc::unbounded_channel();
    stateloom::EventLoop::post(
        &event_loop,
        Box::new(move || {
            let _ = marker.send(());
            Ok(())
        }),
    );
    next(&mut done).await;

    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn panicking_effect_is_reported_and_loop_keeps_running() {
    let (errors, mut failures) = mpsc::unbounded_channel();
    let event_loop = TokioEventLoop::with_error_handler(Handle::current(), move |err| {
        let _ = errors.send(err.to_string());
    });
    let (sender, mut receiver) = mpsc::unbounded_channel();
    let store = make_store(
        0,
        move |model: i32, action: i32| {
            let sender = sender.clone();
            (
                model + action,
                Effect::new(move |_| {
                    if action == 1 {
                        panic!("effect {action} blew up");
                    }
                    let _ = sender.send(action);
                }),
            )
        },
        noop,
        event_loop,
        NoDebug,
    );

    store.dispatch(1);
    store.dispatch(2);

    let failure = next(&mut failures).await;
    assert!(failure.contains("panicked"), "{failure}");
    assert!(failure.contains("effect 1 blew up"), "{failure}");
    assert_eq!(next(&mut receiver).await, 2);
    assert_eq!(*store.current(), 3);
}
