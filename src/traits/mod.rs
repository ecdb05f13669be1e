//! External collaborator interfaces the engine is built against.
//!
//! Each trait gets its own module, one required async method, and a
//! closure-wrapping adapter so callers are not forced to write a zero-field
//! struct for a one-line body.

mod fallback;
mod predicate;
mod processor;
mod terminal;

pub use fallback::{FallbackFn, FallbackStrategy};
pub use predicate::{EdgePredicate, PredicateFn};
pub use processor::{Processor, ProcessorFn};
pub use terminal::{TerminalFn, TerminalStrategy};
