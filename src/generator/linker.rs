use std::collections::BTreeMap;
use std::ops::Range;

use log::{debug, trace};

use crate::bytecode::{Line, PCode, Pcode, Word};
use crate::generator::error::{GeneratorError, GeneratorResult};
use crate::generator::routine::Assembly;
use crate::generator::{heap, verify};

/// Resolve calls, insert heap cleanup, lower to integers and verify.
pub fn link(assembly: Assembly) -> GeneratorResult<Pcode> {
    let Assembly {
        mut lines,
        subroutines,
    } = assembly;

    let calls = resolve_calls(&mut lines, &subroutines)?;
    debug!("resolved {} subroutine calls", calls);

    let cleaned = heap::insert_heap_cleanup(&mut lines);
    debug!("inserted heap cleanup on {} lines", cleaned);

    let pcode = lower(lines)?;
    verify::verify(&pcode)?;

    debug!("linked {} lines", pcode.len());
    Ok(pcode)
}

/// Replace every call placeholder with its subroutine's start address.
pub fn resolve_calls(
    lines: &mut [Line],
    subroutines: &BTreeMap<usize, Range<usize>>,
) -> GeneratorResult<usize> {
    let mut count = 0;

    for (address, line) in lines.iter_mut().enumerate() {
        for i in 0..line.len() {
            let Word::PendingCall(index) = line[i] else {
                continue;
            };

            if i == 0 || line[i - 1] != Word::Op(PCode::Subr) {
                return Err(GeneratorError::MalformedLine {
                    address,
                    reason: format!("call to subroutine {} outside a SUBR operand", index),
                });
            }

            let start = subroutines
                .get(&index)
                .ok_or(GeneratorError::UnresolvedCall { index })?
                .start;
            trace!("line {}: call {} -> {}", address, index, start);
            line[i] = Word::Int(start as i64);
            count += 1;
        }
    }

    Ok(count)
}

/// Lower typed lines to the integer form the virtual machine reads.
pub fn lower(lines: Vec<Line>) -> GeneratorResult<Pcode> {
    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(address, line)| {
            line.into_iter()
                .map(|word| match word {
                    Word::Op(op) => Ok(i64::from(op)),
                    Word::Int(n) => Ok(n),
                    Word::PendingCall(index) => Err(GeneratorError::UnlinkedWord { address, index }),
                })
                .collect::<GeneratorResult<Vec<i64>>>()
        })
        .collect::<GeneratorResult<Vec<Vec<i64>>>>()?;

    Ok(Pcode::new(lines))
}
