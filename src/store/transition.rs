use super::Effect;

/// Result of applying an action: the next model and an optional effect.
///
/// Transition functions may return a bare model, a `(model, effect)` pair or
/// a `(model, Option<effect>)` pair; all convert into this type.
#[derive(Debug)]
pub struct Transition<A, M> {
    pub model: M,
    pub effect: Option<Effect<A, M>>,
}

impl<A, M> Transition<A, M> {
    pub fn new(model: M) -> Self {
        Self { model, effect: None }
    }

    pub fn with_effect(model: M, effect: Effect<A, M>) -> Self {
        Self {
            model,
            effect: Some(effect),
        }
    }
}

impl<A, M> From<M> for Transition<A, M> {
    fn from(model: M) -> Self {
        Self::new(model)
    }
}

impl<A, M> From<(M, Effect<A, M>)> for Transition<A, M> {
    fn from((model, effect): (M, Effect<A, M>)) -> Self {
        Self::with_effect(model, effect)
    }
}

impl<A, M> From<(M, Option<Effect<A, M>>)> for Transition<A, M> {
    fn from((model, effect): (M, Option<Effect<A, M>>)) -> Self {
        Self { model, effect }
    }
}
