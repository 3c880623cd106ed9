//! PCode generation: lowers a type-checked routine tree to linked PCode.
//!
//! The [`Generator`] assembles every routine into one line-addressed
//! sequence (subroutine calls left as placeholders), then [`linker::link`]
//! resolves the placeholders, inserts heap cleanup and verifies the result.

pub mod error;
pub mod expression;
pub mod heap;
pub mod layout;
pub mod linker;
pub mod routine;
pub mod statement;
pub mod verify;


pub use error::{GeneratorError, GeneratorResult};
pub use layout::{Layout, Location};
pub use routine::Assembly;

use crate::bytecode::Pcode;
use crate::lang::{Language, Program};
use crate::options::Options;

/// Emits code for one program. Holds only borrowed, immutable inputs.
pub struct Generator<'a> {
    layout: Layout<'a>,
    options: &'a Options,
    language: Language,
}

impl<'a> Generator<'a> {
    pub fn new(program: &'a Program, options: &'a Options) -> Self {
        Self {
            layout: Layout::new(program),
            options,
            language: program.language,
        }
    }

    pub fn layout(&self) -> &Layout<'a> {
        &self.layout
    }
}

/// Generate linked PCode for a program.
pub fn generate(program: &Program, options: &Options) -> GeneratorResult<Pcode> {
    let assembly = Generator::new(program, options).assemble()?;
    linker::link(assembly)
}
