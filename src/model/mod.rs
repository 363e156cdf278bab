//! Persistent containers for building application models.
//!
//! Models are replaced wholesale on every transition and old versions are
//! retained by the debug history, so collections inside a model should share
//! structure between versions instead of deep-copying.

mod vector;

pub use vector::{Iter, Vector};
