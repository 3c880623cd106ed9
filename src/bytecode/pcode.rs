use serde::{Deserialize, Serialize};

// =============================================================================
// PCODE - the virtual machine's instruction set
// =============================================================================
//
// Discriminants are part of the contract with the virtual machine: new opcodes
// go at the end, existing ones never move.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PCode {
    // stack
    Null,
    Dupl,
    Swap,
    Rota,
    Incr,
    Decr,

    // logic & arithmetic
    Not,
    And,
    Or,
    Xor,
    Neg,
    Abs,
    Sign,
    Min,
    Max,
    Plus,
    Subt,
    Mult,
    Divr,
    Div,
    Mod,
    Sqrt,
    Powr,
    Rand,

    // numeric comparison
    Eqal,
    Noeq,
    Less,
    More,
    Lseq,
    Mreq,

    // string comparison & concatenation
    Scat,
    Seql,
    Sneq,
    Sles,
    Smor,
    Slse,
    Smre,

    // string conversion & manipulation
    Ctos,
    Itos,
    Hexs,
    Qtos,
    Sval,
    Slen,
    Case,
    Copy,
    Dels,
    Inss,
    Repl,
    Spos,
    Rdln,
    Frln,

    // memory
    /// `LDIN n` push the constant `n`
    Ldin,
    /// `LDVG a` push memory[a]
    Ldvg,
    /// `LDVV f o` push cell `o` of the frame whose base is held in cell `f`
    Ldvv,
    /// `LDVR f o` push the cell whose address is in cell `o` of frame `f`
    Ldvr,
    /// `LDAG a` push the address `a`
    Ldag,
    /// `LDAV f o` push the address of cell `o` of frame `f`
    Ldav,
    /// `LSTR n c1..cn` push a string literal
    Lstr,
    Stvg,
    Stvv,
    Stvr,
    /// ( addr -- value )
    Lptr,
    /// ( value addr -- )
    Sptr,
    /// ( source dest -- ) copy a string into existing storage
    Cstr,
    /// ( addr n -- ) zero `n` cells
    Zptr,
    /// ( ptr index -- ptr index ) bounds check against the length cell
    Test,

    // control
    /// `JUMP a`
    Jump,
    /// `IFNO a` pop, jump when false
    Ifno,
    Halt,
    /// `SUBR a` call the subroutine starting at line `a`
    Subr,
    Retn,
    /// `MEMC f n` claim an `n`-cell frame and store its base in cell `f`
    Memc,
    /// `MEMR f` release the frame whose base is held in cell `f`
    Memr,
    /// release temporary heap strings
    Hclr,

    // machine, graphics & io
    Inpt,
    Canv,
    Reso,
    Bufr,
    Home,
    Setx,
    Sety,
    Setd,
    Angl,
    Thik,
    Colr,
    Pen,
    Fwrd,
    Back,
    Left,
    Rght,
    Turn,
    Toxy,
    Mvxy,
    Drxy,
    Circ,
    Blot,
    Box,
    Prnt,
    Writ,
    Outp,
    Time,
    Wait,
    Updt,
}

impl PCode {
    /// Every opcode, indexed by discriminant.
    pub const ALL: [PCode; 103] = [
        PCode::Null,
        PCode::Dupl,
        PCode::Swap,
        PCode::Rota,
        PCode::Incr,
        PCode::Decr,
        PCode::Not,
        PCode::And,
        PCode::Or,
        PCode::Xor,
        PCode::Neg,
        PCode::Abs,
        PCode::Sign,
        PCode::Min,
        PCode::Max,
        PCode::Plus,
        PCode::Subt,
        PCode::Mult,
        PCode::Divr,
        PCode::Div,
        PCode::Mod,
        PCode::Sqrt,
        PCode::Powr,
        PCode::Rand,
        PCode::Eqal,
        PCode::Noeq,
        PCode::Less,
        PCode::More,
        PCode::Lseq,
        PCode::Mreq,
        PCode::Scat,
        PCode::Seql,
        PCode::Sneq,
        PCode::Sles,
        PCode::Smor,
        PCode::Slse,
        PCode::Smre,
        PCode::Ctos,
        PCode::Itos,
        PCode::Hexs,
        PCode::Qtos,
        PCode::Sval,
        PCode::Slen,
        PCode::Case,
        PCode::Copy,
        PCode::Dels,
        PCode::Inss,
        PCode::Repl,
        PCode::Spos,
        PCode::Rdln,
        PCode::Frln,
        PCode::Ldin,
        PCode::Ldvg,
        PCode::Ldvv,
        PCode::Ldvr,
        PCode::Ldag,
        PCode::Ldav,
        PCode::Lstr,
        PCode::Stvg,
        PCode::Stvv,
        PCode::Stvr,
        PCode::Lptr,
        PCode::Sptr,
        PCode::Cstr,
        PCode::Zptr,
        PCode::Test,
        PCode::Jump,
        PCode::Ifno,
        PCode::Halt,
        PCode::Subr,
        PCode::Retn,
        PCode::Memc,
        PCode::Memr,
        PCode::Hclr,
        PCode::Inpt,
        PCode::Canv,
        PCode::Reso,
        PCode::Bufr,
        PCode::Home,
        PCode::Setx,
        PCode::Sety,
        PCode::Setd,
        PCode::Angl,
        PCode::Thik,
        PCode::Colr,
        PCode::Pen,
        PCode::Fwrd,
        PCode::Back,
        PCode::Left,
        PCode::Rght,
        PCode::Turn,
        PCode::Toxy,
        PCode::Mvxy,
        PCode::Drxy,
        PCode::Circ,
        PCode::Blot,
        PCode::Box,
        PCode::Prnt,
        PCode::Writ,
        PCode::Outp,
        PCode::Time,
        PCode::Wait,
        PCode::Updt,
    ];

    /// Number of inline operands. `Lstr` reports 1; its length operand is
    /// followed by that many character codes.
    pub fn arity(self) -> usize {
        match self {
            PCode::Ldvv | PCode::Ldvr | PCode::Ldav | PCode::Stvv | PCode::Stvr | PCode::Memc => 2,
            PCode::Ldin
            | PCode::Ldvg
            | PCode::Ldag
            | PCode::Lstr
            | PCode::Stvg
            | PCode::Jump
            | PCode::Ifno
            | PCode::Subr
            | PCode::Memr => 1,
            _ => 0,
        }
    }

    /// Four-letter assembler name.
    pub fn mnemonic(self) -> String {
        format!("{:?}", self).to_uppercase()
    }

    /// String form of an ambiguous operator, if this is one.
    ///
    /// The pairing is a fixed bijection between the numeric and string
    /// variants; see [`PCode::numeric_variant`] for the inverse.
    pub fn string_variant(self) -> Option<PCode> {
        Some(match self {
            PCode::Plus => PCode::Scat,
            PCode::Eqal => PCode::Seql,
            PCode::Noeq => PCode::Sneq,
            PCode::Less => PCode::Sles,
            PCode::More => PCode::Smor,
            PCode::Lseq => PCode::Slse,
            PCode::Mreq => PCode::Smre,
            _ => return None,
        })
    }

    pub fn numeric_variant(self) -> Option<PCode> {
        Some(match self {
            PCode::Scat => PCode::Plus,
            PCode::Seql => PCode::Eqal,
            PCode::Sneq => PCode::Noeq,
            PCode::Sles => PCode::Less,
            PCode::Smor => PCode::More,
            PCode::Slse => PCode::Lseq,
            PCode::Smre => PCode::Mreq,
            _ => return None,
        })
    }

    /// Opcodes that may leave a temporary string on the heap.
    pub fn allocates_heap_string(self) -> bool {
        matches!(
            self,
            PCode::Scat
                | PCode::Ctos
                | PCode::Itos
                | PCode::Hexs
                | PCode::Qtos
                | PCode::Case
                | PCode::Copy
                | PCode::Dels
                | PCode::Inss
                | PCode::Repl
                | PCode::Rdln
                | PCode::Frln
        )
    }

    /// Opcodes whose single operand is a line address.
    pub fn takes_address(self) -> bool {
        matches!(self, PCode::Jump | PCode::Ifno | PCode::Subr)
    }
}

impl From<PCode> for i64 {
    fn from(op: PCode) -> i64 {
        op as u8 as i64
    }
}

impl TryFrom<i64> for PCode {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|n| PCode::ALL.get(n).copied())
            .ok_or(value)
    }
}

impl std::fmt::Display for PCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
