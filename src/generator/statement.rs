use crate::bytecode::{Emit, Line, PCode};
use crate::generator::Generator;
use crate::generator::error::GeneratorResult;
use crate::lang::{Assignment, Routine, Statement, Type};

impl<'a> Generator<'a> {
    /// Lines for a statement sequence whose first line lands at `start`.
    pub fn statements(
        &self,
        statements: &[Statement],
        routine: Routine<'a>,
        start: usize,
    ) -> GeneratorResult<Vec<Line>> {
        let mut lines = Vec::new();
        for statement in statements {
            let code = self.statement(statement, routine, start + lines.len())?;
            lines.extend(code);
        }
        Ok(lines)
    }

    /// Lines for one statement whose first line lands at `start`.
    ///
    /// Simple statements take exactly one line. Jump targets inside compound
    /// statements are absolute addresses computed from `start`.
    pub fn statement(
        &self,
        statement: &Statement,
        routine: Routine<'a>,
        start: usize,
    ) -> GeneratorResult<Vec<Line>> {
        match statement {
            Statement::Assignment(assignment) => Ok(vec![self.assignment(assignment)?]),

            Statement::ProcedureCall(call) => Ok(vec![self.call(call)?]),

            Statement::If {
                condition,
                if_statements,
                else_statements,
            } => {
                let mut test = self.expression(condition, false)?;
                let if_lines = self.statements(if_statements, routine, start + 1)?;
                let after_if = start + 1 + if_lines.len();

                if else_statements.is_empty() {
                    test.emit(PCode::Ifno, &[after_if as i64]);
                    let mut lines = vec![test];
                    lines.extend(if_lines);
                    return Ok(lines);
                }

                // the if-block is followed by a jump over the else-block
                let else_start = after_if + 1;
                let else_lines = self.statements(else_statements, routine, else_start)?;
                let after_else = else_start + else_lines.len();

                test.emit(PCode::Ifno, &[else_start as i64]);
                let mut skip = Line::new();
                skip.emit(PCode::Jump, &[after_else as i64]);

                let mut lines = vec![test];
                lines.extend(if_lines);
                lines.push(skip);
                lines.extend(else_lines);
                Ok(lines)
            }

            Statement::While {
                condition,
                statements,
            } => {
                let mut test = self.expression(condition, false)?;
                let body = self.statements(statements, routine, start + 1)?;
                let after = start + 1 + body.len() + 1;

                test.emit(PCode::Ifno, &[after as i64]);
                let mut back = Line::new();
                back.emit(PCode::Jump, &[start as i64]);

                let mut lines = vec![test];
                lines.extend(body);
                lines.push(back);
                Ok(lines)
            }

            Statement::Repeat {
                condition,
                statements,
            } => {
                let mut lines = self.statements(statements, routine, start)?;
                let mut test = self.expression(condition, false)?;
                test.emit(PCode::Ifno, &[start as i64]);
                lines.push(test);
                Ok(lines)
            }

            Statement::For(for_loop) => {
                let initialise = self.assignment(&for_loop.initialisation)?;

                let test_address = start + 1;
                let mut test = self.expression(&for_loop.condition, false)?;
                let body = self.statements(&for_loop.statements, routine, test_address + 1)?;
                let after = test_address + 1 + body.len() + 1;
                test.emit(PCode::Ifno, &[after as i64]);

                let mut change = self.assignment(&for_loop.change)?;
                change.emit(PCode::Jump, &[test_address as i64]);

                let mut lines = vec![initialise, test];
                lines.extend(body);
                lines.push(change);
                Ok(lines)
            }

            Statement::Return(value) => {
                let mut line = Line::new();
                match routine {
                    Routine::Program(_) => line.emit(PCode::Halt, &[]),
                    Routine::Subroutine(subroutine) => {
                        match (value, self.layout.result_cell()) {
                            (Some(value), Some(cell)) => {
                                line.extend(self.expression(value, false)?);
                                line.emit(PCode::Stvg, &[cell]);
                            }
                            _ => self.copy_result(subroutine, &mut line)?,
                        }
                        self.release_frame(subroutine, &mut line);
                    }
                }
                Ok(vec![line])
            }

            Statement::Pass => Ok(Vec::new()),
        }
    }

    /// One line: the value, then the store.
    ///
    /// Whole strings are copied into the target's storage rather than
    /// having their pointer overwritten.
    pub fn assignment(&self, assignment: &Assignment) -> GeneratorResult<Line> {
        let variable = self.layout.variable(assignment.variable)?;
        let mut line = self.expression(&assignment.value, false)?;

        let string_target = variable.var_type == Type::String
            && assignment.indexes.len() == variable.dimensions.len();

        if assignment.indexes.is_empty() {
            if string_target {
                line.extend(self.load_variable(assignment.variable)?);
                line.emit(PCode::Cstr, &[]);
            } else {
                line.extend(self.store_variable(assignment.variable)?);
            }
        } else {
            line.extend(self.element_address(assignment.variable, &assignment.indexes)?);
            if string_target {
                line.emit(PCode::Lptr, &[]);
                line.emit(PCode::Cstr, &[]);
            } else {
                line.emit(PCode::Sptr, &[]);
            }
        }

        Ok(line)
    }
}
