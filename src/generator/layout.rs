//! Memory layout: pure address computation for variables, turtle properties
//! and subroutine frames.
//!
//! ```text
//!   cell                 content
//!   ----                 -------
//!   0                    turtle pointer (-> turtle base)
//!   1                    key-buffer pointer
//!   2 .. 2+S-1           frame pointer of subroutine i, at 1+i
//!   2+S                  function result cell (only if some subroutine returns)
//!   turtle base          turtle header
//!   turtle base + 1..6   turtx turty turtd turta turtt turtc
//!   turtle base + 7 ..   globals, in declaration order
//! ```
//!
//! Locals are addressed as `(frame, offset)` where the frame is the cell
//! holding the owning subroutine's frame pointer, as the turtle is addressed
//! through cell 0.

use crate::generator::error::{GeneratorError, GeneratorResult};
use crate::lang::{Program, Routine, Subroutine, Type, Variable, VariableId, VariableKind};

pub const TURTLE_POINTER: i64 = 0;
pub const KEYBUFFER_POINTER: i64 = 1;
/// Cells before the first frame pointer.
pub const RESERVED_CELLS: i64 = 2;
/// Turtle header plus the six properties.
pub const TURTLE_CELLS: i64 = 7;
/// Pointer, maximum length and current length.
pub const STRING_HEADER: i64 = 3;
/// Pointer and element count.
pub const ARRAY_HEADER: i64 = 2;

/// Where a variable's cell lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Turtle property: `offset` from the turtle base, which sits at `base`.
    Turtle { base: i64, offset: i64 },
    Global(i64),
    Local { frame: i64, offset: i64 },
}

/// Cells occupied by one innermost element (a whole string, or one scalar).
pub fn scalar_length(variable: &Variable) -> i64 {
    if variable.var_type == Type::String {
        variable.string_length as i64 + STRING_HEADER
    } else {
        1
    }
}

/// Cells occupied by the sub-array starting at dimension `depth`.
///
/// `depth == dimensions.len()` is a single innermost element.
pub fn storage_length(variable: &Variable, depth: usize) -> i64 {
    match variable.dimensions.get(depth) {
        Some(bounds) => bounds.count() * storage_length(variable, depth + 1) + ARRAY_HEADER,
        None => scalar_length(variable),
    }
}

/// Cells occupied by one element of the array at dimension `depth`.
pub fn element_length(variable: &Variable, depth: usize) -> i64 {
    storage_length(variable, depth + 1)
}

/// Cells the variable occupies in its routine's region.
pub fn variable_length(variable: &Variable) -> i64 {
    match variable.kind {
        VariableKind::Reference | VariableKind::Pointer => 1,
        VariableKind::Turtle(_) => 0,
        VariableKind::Value => storage_length(variable, 0),
    }
}

/// Offset of `slot` among the region-occupying variables before it.
fn running_offset(variables: &[Variable], slot: usize) -> i64 {
    variables[..slot].iter().map(variable_length).sum()
}

/// Address tables for one program. Holds no state beyond the tree itself.
pub struct Layout<'a> {
    program: &'a Program,
    subroutines: Vec<&'a Subroutine>,
}

impl<'a> Layout<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            subroutines: program.all_subroutines(),
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Subroutines ordered by index.
    pub fn subroutines(&self) -> &[&'a Subroutine] {
        &self.subroutines
    }

    pub fn subroutine_count(&self) -> i64 {
        self.subroutines.len() as i64
    }

    pub fn subroutine(&self, index: usize) -> GeneratorResult<&'a Subroutine> {
        self.subroutines
            .iter()
            .find(|s| s.index == index)
            .copied()
            .ok_or(GeneratorError::UnknownSubroutine { index })
    }

    pub fn routine(&self, index: usize) -> GeneratorResult<Routine<'a>> {
        if index == 0 {
            Ok(Routine::Program(self.program))
        } else {
            self.subroutine(index).map(Routine::Subroutine)
        }
    }

    pub fn variable(&self, id: VariableId) -> GeneratorResult<&'a Variable> {
        self.routine(id.routine)?
            .variables()
            .get(id.slot)
            .ok_or(GeneratorError::UnknownVariable {
                routine: id.routine,
                slot: id.slot,
            })
    }

    /// Cell holding subroutine `index`'s frame pointer.
    pub fn frame_cell(&self, index: usize) -> i64 {
        RESERVED_CELLS + index as i64 - 1
    }

    /// Cell through which every function returns its value.
    pub fn result_cell(&self) -> Option<i64> {
        if self.subroutines.iter().any(|s| s.returns.is_some()) {
            Some(RESERVED_CELLS + self.subroutine_count())
        } else {
            None
        }
    }

    pub fn turtle_base(&self) -> i64 {
        let result = if self.result_cell().is_some() { 1 } else { 0 };
        RESERVED_CELLS + self.subroutine_count() + result
    }

    pub fn globals_base(&self) -> i64 {
        self.turtle_base() + TURTLE_CELLS
    }

    /// Total cells taken by globals.
    pub fn globals_length(&self) -> i64 {
        self.program.variables.iter().map(variable_length).sum()
    }

    /// Total cells a subroutine claims for its frame.
    pub fn frame_length(&self, subroutine: &Subroutine) -> i64 {
        subroutine.variables.iter().map(variable_length).sum()
    }

    pub fn location(&self, id: VariableId) -> GeneratorResult<Location> {
        let variable = self.variable(id)?;

        if let VariableKind::Turtle(property) = variable.kind {
            return Ok(Location::Turtle {
                base: self.turtle_base(),
                offset: property.offset(),
            });
        }

        let routine = self.routine(id.routine)?;
        let offset = running_offset(routine.variables(), id.slot);

        Ok(if routine.is_program() {
            Location::Global(self.globals_base() + offset)
        } else {
            Location::Local {
                frame: self.frame_cell(id.routine),
                offset,
            }
        })
    }
}
