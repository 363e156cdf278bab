use std::fmt;

use super::Context;

type EffectFn<A, M> = Box<dyn FnOnce(&Context<A, M>) -> anyhow::Result<()> + Send>;

/// Deferred unit of work produced by a transition.
///
/// The store posts it on its event loop once the dispatch that produced it
/// has committed the new model. It receives a [`Context`] to read the model
/// or dispatch follow-up actions.
pub struct Effect<A, M> {
    run: EffectFn<A, M>,
}

impl<A: 'static, M: 'static> Effect<A, M> {
    pub fn new(f: impl FnOnce(&Context<A, M>) + Send + 'static) -> Self {
        Self {
            run: Box::new(move |ctx: &Context<A, M>| {
                f(ctx);
                Ok(())
            }),
        }
    }

    /// Effect whose failure is reported to whoever drives the event loop.
    pub fn fallible(f: impl FnOnce(&Context<A, M>) -> anyhow::Result<()> + Send + 'static) -> Self {
        Self { run: Box::new(f) }
    }

    /// Effect that dispatches `action` on the owning store.
    pub fn dispatch(action: A) -> Self
    where
        A: Send,
        M: Send + Sync,
    {
        Self::fallible(move |ctx: &Context<A, M>| {
            ctx.dispatch(action)?;
            Ok(())
        })
    }

    /// Run `effects` one after the other inside a single task, stopping at
    /// the first failure.
    pub fn sequence(effects: impl IntoIterator<Item = Effect<A, M>>) -> Self {
        let effects: Vec<Effect<A, M>> = effects.into_iter().collect();
        Self::fallible(move |ctx: &Context<A, M>| {
            for effect in effects {
                effect.run(ctx)?;
            }
            Ok(())
        })
    }

    pub(crate) fn run(self, ctx: &Context<A, M>) -> anyhow::Result<()> {
        (self.run)(ctx)
    }
}

impl<A, M> fmt::Debug for Effect<A, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Effect { .. }")
    }
}
