//! Lens algebra.
//!
//! A [`Lens<S, A>`] focuses on a part `A` of a whole `S` through a pair of
//! pure functions. Lenses compose with [`Lens::then`], and composition is
//! associative: `a.then(b).then(c)` behaves exactly like `a.then(b.then(c))`.
//!
//! Every lens built here satisfies the laws:
//!
//! ```text
//! get(set(s, a)) == a
//! set(set(s, a1), a2) == set(s, a2)
//! set(s, get(s)) == s
//! ```
//!
//! [`Lens::iso`] lifts a pair of inverse functions into a lens; the laws hold
//! as long as `to(from(b)) == b` for every representable `b`.

mod index;

use std::fmt;
use std::sync::Arc;

pub use index::{at, at_vec, key, or_default};

type Getter<S, A> = Arc<dyn Fn(&S) -> A + Send + Sync>;
type Setter<S, A> = Arc<dyn Fn(S, A) -> S + Send + Sync>;

/// Composable get/set pair focusing on an `A` inside an `S`.
pub struct Lens<S, A> {
    get: Getter<S, A>,
    set: Setter<S, A>,
}

impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<S, A> fmt::Debug for Lens<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("source", &std::any::type_name::<S>())
            .field("focus", &std::any::type_name::<A>())
            .finish()
    }
}

impl<S: 'static, A: 'static> Lens<S, A> {
    pub fn new(
        get: impl Fn(&S) -> A + Send + Sync + 'static,
        set: impl Fn(S, A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    pub fn get(&self, source: &S) -> A {
        (self.get)(source)
    }

    pub fn set(&self, source: S, value: A) -> S {
        (self.set)(source, value)
    }

    /// Apply `f` to the focused value.
    pub fn over(&self, source: S, f: impl FnOnce(A) -> A) -> S {
        let focused = (self.get)(&source);
        (self.set)(source, f(focused))
    }

    /// Focus further into the focused value.
    pub fn then<B: 'static>(&self, inner: Lens<A, B>) -> Lens<S, B> {
        let outer_get = Arc::clone(&self.get);
        let outer_set = Arc::clone(&self.set);
        let read_outer = Arc::clone(&outer_get);
        let Lens {
            get: inner_get,
            set: inner_set,
        } = inner;
        Lens::new(
            move |source: &S| inner_get(&read_outer(source)),
            move |source: S, value: B| {
                let focused = outer_get(&source);
                outer_set(source, inner_set(focused, value))
            },
        )
    }

    /// Attach a representation transform: reads apply `to_external` after
    /// this lens, writes apply `to_internal` before it.
    pub fn map<B: 'static>(
        &self,
        to_external: impl Fn(A) -> B + Send + Sync + 'static,
        to_internal: impl Fn(B) -> A + Send + Sync + 'static,
    ) -> Lens<S, B>
    where
        A: Clone,
    {
        self.then(Lens::iso(to_external, to_internal))
    }

    /// Lens from a pair of inverse functions.
    pub fn iso(
        to: impl Fn(S) -> A + Send + Sync + 'static,
        from: impl Fn(A) -> S + Send + Sync + 'static,
    ) -> Self
    where
        S: Clone,
    {
        Lens::new(move |source: &S| to(source.clone()), move |_, value| from(value))
    }
}

impl<S: Clone + 'static> Lens<S, S> {
    pub fn identity() -> Self {
        Lens::new(S::clone, |_, value| value)
    }
}

/// Build a field lens: `lens!(Todo, done)` or a nested path
/// `lens!(Model, settings.theme)`.
///
/// The focused field must be `Clone`.
#[macro_export]
macro_rules! lens {
    ($source:ty, $($field:ident).+) => {
        $crate::lens::Lens::<$source, _>::new(
            |source: &$source| source.$($field).+.clone(),
            |mut source: $source, value| {
                source.$($field).+ = value;
                source
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Settings {
        theme: String,
        size: u32,
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Doc {
        title: String,
        settings: Settings,
    }

    fn doc() -> Doc {
        Doc {
            title: "draft".into(),
            settings: Settings {
                theme: "dark".into(),
                size: 12,
            },
        }
    }

    #[test]
    fn field_lens_gets_and_sets() {
        let title = lens!(Doc, title);
        assert_eq!(title.get(&doc()), "draft");
        let renamed = title.set(doc(), "final".into());
        assert_eq!(renamed.title, "final");
        assert_eq!(renamed.settings, doc().settings);
    }

    #[test]
    fn nested_path_matches_composition() {
        let direct = lens!(Doc, settings.size);
        let composed = lens!(Doc, settings).then(lens!(Settings, size));
        assert_eq!(direct.get(&doc()), composed.get(&doc()));
        assert_eq!(direct.set(doc(), 20), composed.set(doc(), 20));
    }

    #[test]
    fn composition_is_associative() {
        let a = lens!(Doc, settings);
        let b = lens!(Settings, theme);
        let c = Lens::<String, usize>::new(
            |s: &String| s.len(),
            |_, n| "x".repeat(n),
        );
        let left = a.then(b.clone()).then(c.clone());
        let right = a.then(b.then(c));
        assert_eq!(left.get(&doc()), right.get(&doc()));
        assert_eq!(left.set(doc(), 3), right.set(doc(), 3));
    }

    #[test]
    fn laws_hold_for_field_lens() {
        let size = lens!(Doc, settings.size);
        let m = doc();
        assert_eq!(size.get(&size.set(m.clone(), 7)), 7);
        assert_eq!(size.set(size.set(m.clone(), 7), 9), size.set(m.clone(), 9));
        assert_eq!(size.set(m.clone(), size.get(&m)), m);
    }

    #[test]
    fn identity_is_neutral() {
        let title = lens!(Doc, title);
        let left = Lens::<Doc, Doc>::identity().then(title.clone());
        assert_eq!(left.get(&doc()), title.get(&doc()));
        assert_eq!(left.set(doc(), "x".into()), title.set(doc(), "x".into()));
    }

    #[test]
    fn map_applies_representation() {
        let upper = lens!(Doc, title).map(|s: String| s.to_uppercase(), |s: String| s.to_lowercase());
        assert_eq!(upper.get(&doc()), "DRAFT");
        assert_eq!(upper.set(doc(), "FINAL".into()).title, "final");
    }

    #[test]
    fn over_modifies_focus() {
        let size = lens!(Doc, settings.size);
        assert_eq!(size.over(doc(), |s| s * 2).settings.size, 24);
    }
}
