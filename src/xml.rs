//! Minimal namespace-aware XML layer: element tree, span-recording parser, and exclusive
//! canonicalization.

pub mod c14n;

mod dom;
mod parse;

pub use dom::*;
pub use parse::*;
