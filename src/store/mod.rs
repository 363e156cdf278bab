//! Unidirectional-data-flow store.
//!
//! A store owns one model value and changes it only by dispatching actions
//! through a transition function `(Model, Action) -> (Model, Effect?)`.
//! Each dispatch runs to completion before the next one starts:
//!
//! 1. the middleware captures the step,
//! 2. the transition computes the next model,
//! 3. the middleware records it and the model becomes current,
//! 4. the view callback, the debugger and watchers are notified,
//! 5. the effect, if any, is posted on the event loop.
//!
//! Dispatches issued while another one is running on the same thread (from a
//! view callback or a watcher) are queued and processed in FIFO order before
//! the outer dispatch returns. Dispatches from other threads wait.

mod builder;
mod context;
mod effect;
mod error;
mod reducer;
mod transition;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::{Mutex, ReentrantMutex};
use uuid::Uuid;

use crate::cursor::{Commit, Cursor, Reader, Root, Watchers, Write};
use crate::debug::{
    DebugContext, DebugMiddleware, DebugTarget, Debugger, Middleware, NoDebug, Restore,
};
use crate::event_loop::{AsyncWork, EventLoop, ManualEventLoop, Task};
use crate::lens::Lens;

pub use builder::StoreBuilder;
pub use context::Context;
pub use effect::Effect;
pub use error::StoreError;
pub use reducer::Reducer;
pub use transition::Transition;

use context::Dispatcher;

/// Callback invoked with every model that becomes current.
pub type View<M> = Box<dyn Fn(&M) + Send + Sync>;

type TransitionFn<A, M> = Box<dyn Fn(M, A) -> Transition<A, M> + Send + Sync>;

/// View callback that ignores the model.
pub fn noop<M>(_model: &M) {}

/// Create a store.
///
/// `transition` may return a bare model, `(model, effect)` or
/// `(model, Option<effect>)`. `view` is called with every new model,
/// `event_loop` runs effects and `middleware` is either [`NoDebug`] or the
/// result of [`enable_debug`](crate::debug::enable_debug).
pub fn make_store<A, M, L, D, T>(
    initial: M,
    transition: impl Fn(M, A) -> T + Send + Sync + 'static,
    view: impl Fn(&M) + Send + Sync + 'static,
    event_loop: L,
    middleware: D,
) -> Store<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    D: Middleware<A, M>,
    T: Into<Transition<A, M>>,
{
    Store::assemble(
        initial,
        Box::new(move |model: M, action: A| -> Transition<A, M> {
            transition(model, action).into()
        }),
        Box::new(view),
        event_loop,
        middleware,
    )
}

enum Command<A, M> {
    Action(A),
    Write(Write<M>),
    Restore(Restore<M>),
    Commit,
}

struct DispatchQueue<A, M> {
    running: bool,
    pending: VecDeque<Command<A, M>>,
}

struct StoreCore<A, M, L, D> {
    id: Uuid,
    model: ArcSwap<M>,
    committed: Mutex<Arc<M>>,
    transition: TransitionFn<A, M>,
    view: View<M>,
    event_loop: L,
    middleware: D,
    watchers: Arc<Watchers<M>>,
    queue: ReentrantMutex<RefCell<DispatchQueue<A, M>>>,
    this: Weak<Self>,
}

impl<A, M, L, D> StoreCore<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    D: Middleware<A, M>,
{
    fn submit(&self, command: Command<A, M>) {
        let lock = self.queue.lock();
        {
            let mut queue = lock.borrow_mut();
            queue.pending.push_back(command);
            if queue.running {
                tracing::trace!(store = %self.id, queued = queue.pending.len(), "nested dispatch queued");
                return;
            }
            queue.running = true;
        }

        let cell = scopeguard::guard(&*lock, |cell| {
            let mut queue = cell.borrow_mut();
            queue.running = false;
            if !queue.pending.is_empty() {
                tracing::warn!(
                    store = %self.id,
                    dropped = queue.pending.len(),
                    "dispatch unwound; dropping queued commands"
                );
                queue.pending.clear();
            }
        });

        loop {
            let next = cell.borrow_mut().pending.pop_front();
            let Some(command) = next else { break };
            self.process(command);
        }
    }

    fn process(&self, command: Command<A, M>) {
        match command {
            Command::Action(action) => {
                let captured = self.middleware.capture(Some(&action));
                let current = self.model.load_full();
                let Transition { model, effect } =
                    (self.transition)(current.as_ref().clone(), action);
                let next = Arc::new(model);
                self.middleware.record(captured, &next);
                self.replace(next);
                if let Some(effect) = effect {
                    self.schedule(effect);
                }
            }
            Command::Write(write) => {
                let captured = self.middleware.capture(None);
                let current = self.model.load_full();
                let next = Arc::new(write(current.as_ref()));
                self.middleware.record(captured, &next);
                self.replace(next);
            }
            Command::Restore(restore) => {
                if let Some(model) = restore() {
                    tracing::debug!(store = %self.id, "model restored");
                    self.replace(model);
                }
            }
            Command::Commit => self.propagate(),
        }
    }

    fn replace(&self, next: Arc<M>) {
        self.model.store(Arc::clone(&next));
        (self.view)(next.as_ref());
        self.middleware.view(&next);
        self.propagate();
    }

    /// Only called while draining the dispatch queue, so watchers see
    /// models in the order they became current.
    fn propagate(&self) {
        let (previous, current) = {
            let mut committed = self.committed.lock();
            let current = self.model.load_full();
            if Arc::ptr_eq(&committed, &current) {
                return;
            }
            let previous = std::mem::replace(&mut *committed, Arc::clone(&current));
            (previous, current)
        };
        self.watchers.notify(&previous, &current);
    }

    fn schedule(&self, effect: Effect<A, M>) {
        let context = self.context();
        let id = self.id;
        tracing::debug!(store = %id, "effect scheduled");
        self.event_loop.post(Box::new(move || {
            if !context.is_alive() {
                tracing::debug!(store = %id, "store dropped; skipping orphaned effect");
                return Ok(());
            }
            effect.run(&context)
        }));
    }

    fn context(&self) -> Context<A, M> {
        let target: Weak<dyn Dispatcher<A, M>> = self.this.clone();
        Context::new(target)
    }
}

impl<A, M, L, D> Dispatcher<A, M> for StoreCore<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    D: Middleware<A, M>,
{
    fn dispatch(&self, action: A) {
        self.submit(Command::Action(action));
    }

    fn current(&self) -> Arc<M> {
        self.model.load_full()
    }

    fn post(&self, task: Task) {
        self.event_loop.post(task);
    }

    fn post_async(&self, work: AsyncWork) {
        self.event_loop.post_async(work);
    }
}

impl<A, M, L, D> DebugTarget<A, M> for StoreCore<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    D: Middleware<A, M>,
{
    fn dispatch(&self, action: A) {
        self.submit(Command::Action(action));
    }

    fn current(&self) -> Arc<M> {
        self.model.load_full()
    }

    fn restore(&self, restore: Restore<M>) {
        self.submit(Command::Restore(restore));
    }
}

impl<A, M, L, D> Root<M> for StoreCore<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    D: Middleware<A, M>,
{
    fn snapshot(&self) -> Arc<M> {
        self.model.load_full()
    }

    fn write(&self, write: Write<M>) {
        self.submit(Command::Write(write));
    }

    fn watchers(&self) -> &Arc<Watchers<M>> {
        &self.watchers
    }

    fn commit(&self) {
        self.submit(Command::Commit);
    }
}

/// Handle to a store. Clones refer to the same store; it is dropped with
/// the last handle, after which pending effects are skipped.
pub struct Store<A, M, L = ManualEventLoop, D = NoDebug> {
    core: Arc<StoreCore<A, M, L, D>>,
}

impl<A, M, L, D> Clone for Store<A, M, L, D> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<A, M, L, D> fmt::Debug for Store<A, M, L, D>
where
    M: fmt::Debug,
    D: Middleware<A, M>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.core.id)
            .field("model", &*self.core.model.load_full())
            .field("debug", &D::ENABLED)
            .finish()
    }
}

impl<A, M> Store<A, M>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
{
    /// Store driven by `R::reduce` with a fresh [`ManualEventLoop`] and no
    /// debugging. Use [`StoreBuilder`] to choose other collaborators.
    pub fn from_reducer<R>(initial: M) -> Self
    where
        R: Reducer<Model = M, Action = A> + 'static,
    {
        StoreBuilder::from_reducer::<R>(initial).build()
    }
}

impl<A, M, L, D> Store<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    D: Middleware<A, M>,
{
    fn assemble(
        initial: M,
        transition: TransitionFn<A, M>,
        view: View<M>,
        event_loop: L,
        middleware: D,
    ) -> Self {
        let initial = Arc::new(initial);
        let core = Arc::new_cyclic(|this: &Weak<StoreCore<A, M, L, D>>| StoreCore {
            id: Uuid::new_v4(),
            model: ArcSwap::new(Arc::clone(&initial)),
            committed: Mutex::new(Arc::clone(&initial)),
            transition,
            view,
            event_loop,
            middleware,
            watchers: Watchers::new(),
            queue: ReentrantMutex::new(RefCell::new(DispatchQueue {
                running: false,
                pending: VecDeque::new(),
            })),
            this: this.clone(),
        });

        let target = Arc::downgrade(&core);
        let target: Weak<dyn DebugTarget<A, M>> = target;
        core.middleware.attach(target, &initial);
        tracing::debug!(store = %core.id, debug = D::ENABLED, "store created");

        Self { core }
    }

    /// Apply `action` through the transition function.
    ///
    /// Returns once the new model is current and its effect, if any, has
    /// been posted. Effects themselves run later on the event loop.
    pub fn dispatch(&self, action: A) {
        tracing::trace!(store = %self.core.id, "dispatch");
        self.core.submit(Command::Action(action));
    }

    pub fn current(&self) -> Arc<M> {
        self.core.model.load_full()
    }

    /// Replace the model with `f(current)` without going through the
    /// transition function. Serialized with dispatches and recorded by the
    /// debug layer as a write step.
    pub fn update(&self, f: impl FnOnce(&M) -> M + Send + 'static) {
        self.core.submit(Command::Write(Box::new(f)));
    }

    /// Context for dispatching from outside an effect, e.g. a background
    /// thread that must not keep the store alive.
    pub fn context(&self) -> Context<A, M> {
        self.core.context()
    }

    pub fn event_loop(&self) -> &L {
        &self.core.event_loop
    }

    pub fn id(&self) -> Uuid {
        self.core.id
    }

    pub fn cursor(&self) -> Cursor<M, M> {
        self.zoom(Lens::identity())
    }

    pub fn zoom<V: 'static>(&self, lens: Lens<M, V>) -> Cursor<M, V> {
        Cursor::new(self.root(), lens)
    }

    pub fn reader(&self) -> Reader<M, M> {
        Reader::new(self.root(), Arc::new(M::clone))
    }

    fn root(&self) -> Arc<dyn Root<M>> {
        Arc::clone(&self.core) as Arc<dyn Root<M>>
    }
}

impl<A, M, L, G> Store<A, M, L, DebugMiddleware<A, M, G>>
where
    A: Clone + Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    G: Debugger<A, M>,
{
    /// Debug handle for inspecting and rewinding this store.
    pub fn debug(&self) -> DebugContext<A, M> {
        self.core.middleware.context()
    }

    pub fn debugger(&self) -> &G {
        self.core.middleware.debugger()
    }
}

impl<A, M, L, D> Commit for Store<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
    L: EventLoop,
    D: Middleware<A, M>,
{
    fn commit(&self) {
        self.core.submit(Command::Commit);
    }
}
