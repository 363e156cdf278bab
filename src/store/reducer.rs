//! Typed form of a transition function.

use super::Transition;

/// Reducer computes the next model from the current one and an action.
///
/// The reducer is the only place where state transitions happen.
/// It must be a pure function: (Model, Action) -> (Model, Effect?).
/// Anything impure goes into the returned effect, which the store runs
/// later through its event loop.
pub trait Reducer {
    /// The model type this reducer operates on.
    type Model: Clone + Send + Sync + 'static;

    /// The action type this reducer handles.
    type Action: Send + 'static;

    /// Process an action and return the new model, plus an optional effect.
    fn reduce(model: Self::Model, action: Self::Action) -> Transition<Self::Action, Self::Model>;
}
