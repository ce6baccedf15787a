//! Madlib Engine: pattern expansion for procedural text.
//!
//! Expands patterns such as `The <Animal> {ran|sat}[ quietly%30].` against
//! a library of named word lists. Substitutions pick from lists (with
//! variant selection, articles and capitalization), alternatives pick one
//! option, optionals include text by chance, and whatever is picked is
//! expanded again.

pub mod core;

pub use crate::core::engine::{GenerateError, MadlibEngine, MadlibEngineBuilder};
