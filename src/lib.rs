//! PCode generation for the Turtle System compilers.
//!
//! Language frontends hand over a type-checked [`lang::Program`]; the
//! [`generator`] lowers it to linked [`bytecode::Pcode`] for the virtual
//! machine.

pub mod bytecode;
pub mod generator;
pub mod lang;
pub mod options;

pub use bytecode::{PCode, Pcode};
pub use generator::{GeneratorError, GeneratorResult, generate};
pub use options::Options;
