//! Heap-string cleanup.
//!
//! Intermediate strings built by string opcodes live on the heap until a
//! HCLR releases them. A line that builds one gets a HCLR at its end, or
//! just before its closing JUMP so a loop-back still clears. Lines that
//! call a subroutine are left alone: the callee may hand back a heap string
//! the caller has not consumed yet.

use log::trace;

use crate::bytecode::{Line, PCode, Word, opcodes};

/// True when the line allocates heap strings and calls no subroutine.
pub fn needs_cleanup(line: &[Word]) -> bool {
    let mut allocates = false;
    for op in opcodes(line) {
        if op == PCode::Subr {
            return false;
        }
        allocates |= op.allocates_heap_string();
    }
    allocates
}

/// Insert HCLR into every line that needs it. Returns how many lines
/// changed; a second pass changes none.
pub fn insert_heap_cleanup(lines: &mut [Line]) -> usize {
    let mut changed = 0;

    for (address, line) in lines.iter_mut().enumerate() {
        if needs_cleanup(line) && cleanup_line(line) {
            trace!("heap cleanup on line {}", address);
            changed += 1;
        }
    }

    changed
}

fn cleanup_line(line: &mut Line) -> bool {
    let jump = line
        .iter()
        .rposition(|word| *word == Word::Op(PCode::Jump));

    let at = jump.unwrap_or(line.len());
    if at > 0 && line[at - 1] == Word::Op(PCode::Hclr) {
        return false;
    }

    line.insert(at, Word::Op(PCode::Hclr));
    true
}
