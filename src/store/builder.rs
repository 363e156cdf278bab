use crate::debug::{enable_debug, DebugMiddleware, Debugger, Middleware, NoDebug};
use crate::event_loop::{EventLoop, ManualEventLoop};

use super::{Reducer, Store, Transition, TransitionFn, View};

/// Step-by-step alternative to [`make_store`](super::make_store).
///
/// Defaults to a no-op view, a fresh [`ManualEventLoop`] and no debugging.
pub struct StoreBuilder<A, M, L = ManualEventLoop, D = NoDebug> {
    initial: M,
    transition: TransitionFn<A, M>,
    view: View<M>,
    event_loop: L,
    middleware: D,
}

impl<A, M> StoreBuilder<A, M>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
{
    pub fn new<T>(initial: M, transition: impl Fn(M, A) -> T + Send + Sync + 'static) -> Self
    where
        T: Into<Transition<A, M>>,
    {
        Self {
            initial,
            transition: Box::new(move |model: M, action: A| -> Transition<A, M> {
                transition(model, action).into()
            }),
            view: Box::new(super::noop::<M>),
            event_loop: ManualEventLoop::new(),
            middleware: NoDebug,
        }
    }

    /// Builder whose transition function is `R::reduce`.
    pub fn from_reducer<R>(initial: M) -> Self
    where
        R: Reducer<Model = M, Action = A> + 'static,
    {
        Self::new(initial, R::reduce)
    }
}

impl<A, M, L, D> StoreBuilder<A, M, L, D>
where
    A: Send + 'static,
    M: Clone + Send + Sync + 'static,
{
    pub fn with_view(mut self, view: impl Fn(&M) + Send + Sync + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    pub fn with_event_loop<E: EventLoop>(self, event_loop: E) -> StoreBuilder<A, M, E, D> {
        StoreBuilder {
            initial: self.initial,
            transition: self.transition,
            view: self.view,
            event_loop,
            middleware: self.middleware,
        }
    }

    pub fn with_middleware<N: Middleware<A, M>>(self, middleware: N) -> StoreBuilder<A, M, L, N> {
        StoreBuilder {
            initial: self.initial,
            transition: self.transition,
            view: self.view,
            event_loop: self.event_loop,
            middleware,
        }
    }

    /// Record history and report to `debugger`.
    pub fn with_debugger<G>(self, debugger: G) -> StoreBuilder<A, M, L, DebugMiddleware<A, M, G>>
    where
        A: Clone,
        G: Debugger<A, M>,
    {
        self.with_middleware(enable_debug(debugger))
    }

    pub fn build(self) -> Store<A, M, L, D>
    where
        L: EventLoop,
        D: Middleware<A, M>,
    {
        Store::assemble(
            self.initial,
            self.transition,
            self.view,
            self.event_loop,
            self.middleware,
        )
    }
}
