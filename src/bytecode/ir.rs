use crate::bytecode::PCode;
use crate::generator::GeneratorError;
use serde::{Deserialize, Serialize};

/// One cell of an instruction line under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Word {
    Op(PCode),
    Int(i64),
    /// Call target not yet known: the callee's subroutine index.
    ///
    /// Has no integer form; the linker must replace it before output.
    PendingCall(usize),
}

impl From<PCode> for Word {
    fn from(op: PCode) -> Self {
        Word::Op(op)
    }
}

impl From<i64> for Word {
    fn from(n: i64) -> Self {
        Word::Int(n)
    }
}

/// An instruction line. Its index in the finished program is its address.
pub type Line = Vec<Word>;

/// Append instructions to a line under construction.
pub trait Emit {
    fn emit(&mut self, op: PCode, operands: &[i64]);
}

impl Emit for Vec<Word> {
    fn emit(&mut self, op: PCode, operands: &[i64]) {
        self.push(op.into());
        self.extend(operands.iter().copied().map(Word::from));
    }
}

/// Opcodes on a line, skipping operands.
pub fn opcodes(line: &[Word]) -> impl Iterator<Item = PCode> + '_ {
    line.iter().filter_map(|word| match word {
        Word::Op(op) => Some(*op),
        _ => None,
    })
}

/// A linked PCode program: integers only, ready for the virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pcode {
    pub lines: Vec<Vec<i64>>,
}

impl Pcode {
    pub fn new(lines: Vec<Vec<i64>>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Binary encoding handed to the virtual machine.
    pub fn to_bytes(&self) -> Result<Vec<u8>, GeneratorError> {
        postcard::to_allocvec(self).map_err(GeneratorError::Encoding)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GeneratorError> {
        postcard::from_bytes(bytes).map_err(GeneratorError::Encoding)
    }

    /// Decode every line into instructions.
    pub fn instructions(&self) -> Result<Vec<Vec<Instruction<'_>>>, GeneratorError> {
        self.lines
            .iter()
            .enumerate()
            .map(|(address, line)| decode_line(address, line))
            .collect()
    }
}

/// A decoded instruction borrowing its operands from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    pub op: PCode,
    pub operands: &'a [i64],
}

/// Split a linked line into instructions by opcode arity.
pub fn decode_line(address: usize, line: &[i64]) -> Result<Vec<Instruction<'_>>, GeneratorError> {
    let mut instructions = Vec::new();
    let mut i = 0;

    while i < line.len() {
        let op = PCode::try_from(line[i]).map_err(|value| GeneratorError::MalformedLine {
            address,
            reason: format!("{} is not an opcode", value),
        })?;

        let mut count = op.arity();
        if op == PCode::Lstr {
            let length = line.get(i + 1).copied().unwrap_or(0);
            count += usize::try_from(length).map_err(|_| GeneratorError::MalformedLine {
                address,
                reason: format!("negative string length {}", length),
            })?;
        }

        let end = i + 1 + count;
        if end > line.len() {
            return Err(GeneratorError::MalformedLine {
                address,
                reason: format!("{} is missing operands", op),
            });
        }

        instructions.push(Instruction {
            op,
            operands: &line[i + 1..end],
        });
        i = end;
    }

    Ok(instructions)
}
