//! Unidirectional state management.
//!
//! Application state lives in one immutable model value. It changes only by
//! dispatching actions to a [`Store`], whose pure transition function returns
//! the next model and optionally an [`Effect`] that the store runs later on
//! its [`EventLoop`]. Parts of the model are read and written through
//! composable [`Lens`]es and [`Cursor`]s, and a store can record its history
//! for time-travel debugging.
//!
//! ```
//! use stateloom::{make_store, noop, Effect, ManualEventLoop, NoDebug};
//!
//! #[derive(Clone)]
//! enum Action {
//!     Increment,
//!     Reset,
//! }
//!
//! let event_loop = ManualEventLoop::new();
//! let store = make_store(
//!     0,
//!     |count: i32, action: Action| match action {
//!         Action::Increment if count == 2 => (count + 1, Some(Effect::dispatch(Action::Reset))),
//!         Action::Increment => (count + 1, None),
//!         Action::Reset => (0, None),
//!     },
//!     noop,
//!     event_loop.clone(),
//!     NoDebug,
//! );
//!
//! store.dispatch(Action::Increment);
//! store.dispatch(Action::Increment);
//! store.dispatch(Action::Increment);
//! assert_eq!(*store.current(), 3);
//!
//! event_loop.drain().unwrap();
//! assert_eq!(*store.current(), 0);
//! ```

pub mod config;
pub mod cursor;
pub mod debug;
pub mod event_loop;
pub mod lens;
pub mod logging;
pub mod model;
pub mod state;
pub mod store;

pub use cursor::{Commit, Cursor, Reader, Watch, WeakCursor};
pub use debug::{enable_debug, DebugContext, DebugError, Debugger, NoDebug, NullDebugger};
pub use event_loop::{EventLoop, LoopError, ManualEventLoop, TokioEventLoop};
pub use lens::Lens;
pub use model::Vector;
pub use state::{Propagation, State};
pub use store::{
    make_store, noop, Context, Effect, Reducer, Store, StoreBuilder, StoreError, Transition,
};
