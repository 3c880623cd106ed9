pub mod disasm;
pub mod ir;
pub mod pcode;

pub use ir::{Emit, Instruction, Line, Pcode, Word, decode_line, opcodes};
pub use pcode::PCode;
