//! Routine assembly: start-up code, subroutine prologues and epilogues, and
//! the placement of every routine in one line-addressed sequence.
//!
//! ```text
//!   0        set up turtle, canvas and key buffer
//!   1        string and array headers of globals (when there are any)
//!   n        jump past the subroutine block (when there are subroutines)
//!   n+1 ..   subroutine 1: prologue, body, epilogue
//!   ...      subroutine 2, 3, ... in index order
//!   m ..     main program body
//!   last     halt
//! ```

use std::collections::BTreeMap;
use std::ops::Range;

use log::debug;

use crate::bytecode::{Emit, Line, PCode};
use crate::generator::Generator;
use crate::generator::error::{GeneratorError, GeneratorResult};
use crate::generator::layout::{
    KEYBUFFER_POINTER, Location, TURTLE_POINTER, element_length, variable_length,
};
use crate::lang::{Routine, Subroutine, TurtleProperty, Type, Variable, VariableId, VariableKind};

/// Key buffer size requested at start-up.
const KEYBUFFER_SIZE: i64 = 32;

/// Every routine placed, with calls still unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub lines: Vec<Line>,
    /// Line range of each subroutine, by subroutine index.
    pub subroutines: BTreeMap<usize, Range<usize>>,
}

impl Assembly {
    /// Start address of a subroutine.
    pub fn start_of(&self, index: usize) -> Option<usize> {
        self.subroutines.get(&index).map(|range| range.start)
    }
}

/// Where a routine's storage lives, for writing string and array headers.
#[derive(Debug, Clone, Copy)]
enum Region {
    Global,
    Frame(i64),
}

impl Region {
    fn store(self, cell: i64, line: &mut Line) {
        match self {
            Region::Global => line.emit(PCode::Stvg, &[cell]),
            Region::Frame(frame) => line.emit(PCode::Stvv, &[frame, cell]),
        }
    }

    fn address(self, cell: i64, line: &mut Line) {
        match self {
            Region::Global => line.emit(PCode::Ldag, &[cell]),
            Region::Frame(frame) => line.emit(PCode::Ldav, &[frame, cell]),
        }
    }
}

impl<'a> Generator<'a> {
    /// Place every routine: start-up lines, a jump over the subroutine
    /// block, each subroutine in index order, the main body, then halt.
    pub fn assemble(&self) -> GeneratorResult<Assembly> {
        let program = self.layout.program();
        let mut lines = self.startup()?;
        let mut subroutines = BTreeMap::new();

        if !self.layout.subroutines().is_empty() {
            let jump_address = lines.len();
            let mut cursor = jump_address + 1;
            let mut block = Vec::new();

            for &subroutine in self.layout.subroutines() {
                let code = self.subroutine(subroutine, cursor)?;
                debug!(
                    "subroutine {} '{}' at {}..{}",
                    subroutine.index,
                    subroutine.name,
                    cursor,
                    cursor + code.len()
                );
                subroutines.insert(subroutine.index, cursor..cursor + code.len());
                cursor += code.len();
                block.extend(code);
            }

            let mut jump = Line::new();
            jump.emit(PCode::Jump, &[cursor as i64]);
            lines.push(jump);
            lines.extend(block);
        }

        let main_start = lines.len();
        debug!("main program '{}' at {}", program.name, main_start);
        lines.extend(self.statements(&program.statements, Routine::Program(program), main_start)?);

        let mut halt = Line::new();
        halt.emit(PCode::Halt, &[]);
        lines.push(halt);

        debug!("assembled {} lines", lines.len());
        Ok(Assembly { lines, subroutines })
    }

    /// Start-up line, plus a header line when globals own storage.
    fn startup(&self) -> GeneratorResult<Vec<Line>> {
        let mut setup = Line::new();

        setup.emit(PCode::Ldin, &[self.layout.turtle_base()]);
        setup.emit(PCode::Stvg, &[TURTLE_POINTER]);

        let centre = self.options.canvas_start_size / 2;
        let defaults = [
            (TurtleProperty::X, centre),
            (TurtleProperty::Y, centre),
            (TurtleProperty::Direction, 0),
            (TurtleProperty::Angles, 360),
            (TurtleProperty::Thickness, 2),
            (TurtleProperty::Colour, 0),
        ];
        for (property, value) in defaults {
            setup.emit(PCode::Ldin, &[value]);
            self.store_turtle(property, &mut setup);
        }

        let size = self.options.canvas_start_size;
        setup.emit(PCode::Ldin, &[0]);
        setup.emit(PCode::Ldin, &[0]);
        setup.emit(PCode::Ldin, &[size]);
        setup.emit(PCode::Ldin, &[size]);
        setup.emit(PCode::Canv, &[]);
        setup.emit(PCode::Ldin, &[size]);
        setup.emit(PCode::Ldin, &[size]);
        setup.emit(PCode::Reso, &[]);

        if self.options.setup_default_keybuffer {
            setup.emit(PCode::Ldin, &[KEYBUFFER_SIZE]);
            setup.emit(PCode::Bufr, &[]);
            setup.emit(PCode::Stvg, &[KEYBUFFER_POINTER]);
        }

        let mut lines = vec![setup];

        // global memory starts zeroed, so current lengths need no store
        let program = self.layout.program();
        let mut headers = Line::new();
        let mut offset = self.layout.globals_base();
        for variable in &program.variables {
            if variable.owns_storage() {
                storage_headers(variable, Region::Global, offset, 0, true, &mut headers);
            }
            offset += variable_length(variable);
        }
        if !headers.is_empty() {
            lines.push(headers);
        }

        Ok(lines)
    }

    fn store_turtle(&self, property: TurtleProperty, line: &mut Line) {
        let offset = property.offset();
        if self.options.turtle_attributes_as_globals {
            line.emit(PCode::Stvg, &[self.layout.turtle_base() + offset]);
        } else {
            line.emit(PCode::Stvv, &[TURTLE_POINTER, offset]);
        }
    }

    /// Prologue line, body, epilogue line.
    fn subroutine(&self, subroutine: &'a Subroutine, start: usize) -> GeneratorResult<Vec<Line>> {
        let mut lines = vec![self.prologue(subroutine)?];
        lines.extend(self.statements(
            &subroutine.statements,
            Routine::Subroutine(subroutine),
            start + 1,
        )?);
        lines.push(self.epilogue(subroutine)?);
        Ok(lines)
    }

    /// Claim the frame, set up local storage, then pop the arguments into
    /// their cells. The last argument is on top, so parameters unload in
    /// reverse.
    pub fn prologue(&self, subroutine: &Subroutine) -> GeneratorResult<Line> {
        let frame = self.layout.frame_cell(subroutine.index);
        let frame_length = self.layout.frame_length(subroutine);
        let zeroed = self.options.initialise_locals;
        let mut line = Line::new();

        line.emit(PCode::Memc, &[frame, frame_length]);

        if zeroed && frame_length > 0 {
            line.emit(PCode::Ldvg, &[frame]);
            line.emit(PCode::Ldin, &[frame_length]);
            line.emit(PCode::Zptr, &[]);
        }

        let region = Region::Frame(frame);
        let mut offset = 0;
        for variable in &subroutine.variables {
            if variable.owns_storage() && !(variable.parameter && variable.is_array()) {
                storage_headers(variable, region, offset, 0, zeroed, &mut line);
            }
            offset += variable_length(variable);
        }

        let parameters: Vec<usize> = subroutine
            .variables
            .iter()
            .enumerate()
            .filter(|(_, v)| v.parameter)
            .map(|(slot, _)| slot)
            .collect();

        for &slot in parameters.iter().rev() {
            let id = VariableId::new(subroutine.index, slot);
            let variable = &subroutine.variables[slot];
            if variable.kind == VariableKind::Value
                && variable.var_type == Type::String
                && !variable.is_array()
            {
                line.extend(self.load_variable(id)?);
                line.emit(PCode::Cstr, &[]);
            } else {
                let (frame, offset) = self.local_cell(id)?;
                line.emit(PCode::Stvv, &[frame, offset]);
            }
        }

        Ok(line)
    }

    /// Copy a function's result variable to the result cell, release the
    /// frame and return.
    pub fn epilogue(&self, subroutine: &Subroutine) -> GeneratorResult<Line> {
        let mut line = Line::new();
        self.copy_result(subroutine, &mut line)?;
        self.release_frame(subroutine, &mut line);
        Ok(line)
    }

    /// Store a function's designated result variable into the result cell.
    /// Emits nothing for procedures and for functions without one.
    pub(crate) fn copy_result(&self, subroutine: &Subroutine, line: &mut Line) -> GeneratorResult<()> {
        if let (Some(_), Some(slot), Some(cell)) = (
            subroutine.returns,
            subroutine.result_variable,
            self.layout.result_cell(),
        ) {
            line.extend(self.load_variable(VariableId::new(subroutine.index, slot))?);
            line.emit(PCode::Stvg, &[cell]);
        }
        Ok(())
    }

    pub(crate) fn release_frame(&self, subroutine: &Subroutine, line: &mut Line) {
        line.emit(PCode::Memr, &[self.layout.frame_cell(subroutine.index)]);
        line.emit(PCode::Retn, &[]);
    }

    fn local_cell(&self, id: VariableId) -> GeneratorResult<(i64, i64)> {
        match self.layout.location(id)? {
            Location::Local { frame, offset } => Ok((frame, offset)),
            _ => Err(GeneratorError::UnknownVariable {
                routine: id.routine,
                slot: id.slot,
            }),
        }
    }
}

/// Write the pointer, size and (unless memory is already zero) current
/// length headers of a string or array whose storage starts at `start`.
/// Nested arrays and arrays of strings recurse into every element.
fn storage_headers(
    variable: &Variable,
    region: Region,
    start: i64,
    depth: usize,
    zeroed: bool,
    line: &mut Line,
) {
    region.address(start + 1, line);
    region.store(start, line);

    match variable.dimensions.get(depth) {
        None => {
            line.emit(PCode::Ldin, &[variable.string_length as i64]);
            region.store(start + 1, line);
            if !zeroed {
                line.emit(PCode::Ldin, &[0]);
                region.store(start + 2, line);
            }
        }
        Some(bounds) => {
            let count = bounds.count();
            line.emit(PCode::Ldin, &[count]);
            region.store(start + 1, line);

            let inner_owns = depth + 1 < variable.dimensions.len() || variable.var_type == Type::String;
            if inner_owns {
                let length = element_length(variable, depth);
                for i in 0..count {
                    storage_headers(variable, region, start + 2 + i * length, depth + 1, zeroed, line);
                }
            }
        }
    }
}
