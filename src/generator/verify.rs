use crate::bytecode::{Pcode, decode_line};
use crate::generator::error::{GeneratorError, GeneratorResult};

/// Structural check of linked output.
///
/// Every line must be non-empty and decode cleanly by opcode arity, and
/// every JUMP, IFNO and SUBR must target a line inside the program.
pub fn verify(pcode: &Pcode) -> GeneratorResult<()> {
    let len = pcode.len();

    for (address, line) in pcode.lines.iter().enumerate() {
        if line.is_empty() {
            return Err(GeneratorError::EmptyLine { address });
        }

        for instruction in decode_line(address, line)? {
            if !instruction.op.takes_address() {
                continue;
            }
            let target = instruction.operands[0];
            if target < 0 || target as usize >= len {
                return Err(GeneratorError::InvalidTarget {
                    address,
                    op: instruction.op.to_string(),
                    target,
                    len,
                });
            }
        }
    }

    Ok(())
}
