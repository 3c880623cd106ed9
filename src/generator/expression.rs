use crate::bytecode::{Emit, PCode, Word};
use crate::generator::Generator;
use crate::generator::error::{GeneratorError, GeneratorResult};
use crate::generator::layout::{Location, TURTLE_POINTER, element_length};
use crate::lang::{
    Call, Callee, Expression, ExpressionKind, Literal, Operator, Type, VariableId, VariableKind,
};

/// Cells between a string's pointer target and its first character.
const STRING_CHARACTER_OFFSET: i64 = 2;

impl<'a> Generator<'a> {
    /// Emit code leaving the expression's value on the stack, or with
    /// `by_reference`, the address of the variable or element it names.
    pub fn expression(
        &self,
        expression: &Expression,
        by_reference: bool,
    ) -> GeneratorResult<Vec<Word>> {
        if by_reference {
            return self.reference(expression);
        }

        let mut code = Vec::new();

        match &expression.kind {
            ExpressionKind::Literal(literal) => literal_code(literal, &mut code),

            ExpressionKind::Input { index, .. } => {
                code.emit(PCode::Ldin, &[*index]);
                code.emit(PCode::Inpt, &[]);
            }

            ExpressionKind::Constant { value, .. } => literal_code(value, &mut code),

            ExpressionKind::Colour { value, .. } => code.emit(PCode::Ldin, &[*value]),

            ExpressionKind::Variable { variable, indexes } => {
                if indexes.is_empty() {
                    code = self.load_variable(*variable)?;
                } else {
                    code = self.element_address(*variable, indexes)?;
                    code.emit(PCode::Lptr, &[]);
                }
            }

            ExpressionKind::Address { variable } => code = self.variable_address(*variable)?,

            ExpressionKind::Call(call) => {
                code = self.call(call)?;
                // functions hand their value back through the result cell
                if let Callee::Subroutine(_) = call.callee {
                    if let Some(cell) = self.layout.result_cell() {
                        code.emit(PCode::Ldvg, &[cell]);
                    }
                }
            }

            ExpressionKind::Unary { operator, operand } => {
                code = self.expression(operand, false)?;
                code.emit(operator.pcode(), &[]);
            }

            ExpressionKind::Binary {
                operator,
                left,
                right,
            } => code = self.binary(*operator, left, right)?,

            ExpressionKind::Cast { expression: inner } => {
                code = self.expression(inner, false)?;
                match (inner.ty, expression.ty) {
                    (Type::Character, Type::String) => code.emit(PCode::Ctos, &[]),
                    (Type::Integer, Type::String) => code.emit(PCode::Itos, &[]),
                    (Type::String, Type::Integer) => code.emit(PCode::Sval, &[]),
                    (from, to) if from == to => {}
                    (from, to) => return Err(GeneratorError::IllegalCast { from, to }),
                }
            }
        }

        Ok(code)
    }

    /// As [`Generator::expression`], also handing back the value's type.
    pub fn typed_expression(
        &self,
        expression: &Expression,
        by_reference: bool,
    ) -> GeneratorResult<(Vec<Word>, Type)> {
        Ok((self.expression(expression, by_reference)?, expression.ty))
    }

    fn reference(&self, expression: &Expression) -> GeneratorResult<Vec<Word>> {
        match &expression.kind {
            ExpressionKind::Variable { variable, indexes } if indexes.is_empty() => {
                self.variable_address(*variable)
            }
            ExpressionKind::Variable { variable, indexes } => {
                self.element_address(*variable, indexes)
            }
            other => Err(GeneratorError::NotAddressable {
                what: describe(other).to_string(),
            }),
        }
    }

    fn binary(
        &self,
        operator: Operator,
        left: &Expression,
        right: &Expression,
    ) -> GeneratorResult<Vec<Word>> {
        let (mut code, left_type) = self.typed_expression(left, false)?;
        let stringlike = left_type.is_stringlike() || right.ty.is_stringlike();

        if !stringlike && right.is_integer_literal(1) {
            match operator {
                Operator::Plus => {
                    code.emit(PCode::Incr, &[]);
                    return Ok(code);
                }
                Operator::Subt => {
                    code.emit(PCode::Decr, &[]);
                    return Ok(code);
                }
                _ => {}
            }
        }

        code.extend(self.expression(right, false)?);

        let numeric = operator.pcode();
        let op = if stringlike {
            numeric.string_variant().unwrap_or(numeric)
        } else {
            numeric
        };
        code.emit(op, &[]);

        Ok(code)
    }

    /// Arguments in declaration order, then the call itself.
    ///
    /// User subroutines are called through a placeholder the linker
    /// resolves once every subroutine has an address.
    pub fn call(&self, call: &Call) -> GeneratorResult<Vec<Word>> {
        let mut code = Vec::new();

        match &call.callee {
            Callee::Native(native) => {
                for (i, argument) in call.arguments.iter().enumerate() {
                    let by_reference = native.reference_parameters.get(i).copied().unwrap_or(false);
                    code.extend(self.expression(argument, by_reference)?);
                }
                code.extend(native.code.iter().copied());
            }
            Callee::Subroutine(index) => {
                let subroutine = self.layout.subroutine(*index)?;
                for (argument, parameter) in call.arguments.iter().zip(subroutine.parameters()) {
                    let by_reference = parameter.kind != VariableKind::Value;
                    code.extend(self.expression(argument, by_reference)?);
                }
                code.push(Word::Op(PCode::Subr));
                code.push(Word::PendingCall(*index));
            }
        }

        Ok(code)
    }

    // =========================================================================
    // Variable access
    // =========================================================================

    /// Push what a variable's cell means: a scalar's value, or the pointer
    /// of a string or array.
    pub fn load_variable(&self, id: VariableId) -> GeneratorResult<Vec<Word>> {
        let kind = self.layout.variable(id)?.kind;
        let mut code = Vec::new();

        match (self.layout.location(id)?, kind) {
            (Location::Turtle { base, offset }, _) => {
                if self.options.turtle_attributes_as_globals {
                    code.emit(PCode::Ldvg, &[base + offset]);
                } else {
                    code.emit(PCode::Ldvv, &[TURTLE_POINTER, offset]);
                }
            }
            (Location::Global(address), VariableKind::Value) => {
                code.emit(PCode::Ldvg, &[address]);
            }
            (Location::Global(address), _) => {
                code.emit(PCode::Ldvg, &[address]);
                code.emit(PCode::Lptr, &[]);
            }
            (Location::Local { frame, offset }, VariableKind::Reference) => {
                code.emit(PCode::Ldvr, &[frame, offset]);
            }
            (Location::Local { frame, offset }, VariableKind::Pointer) => {
                code.emit(PCode::Ldvv, &[frame, offset]);
                code.emit(PCode::Lptr, &[]);
            }
            (Location::Local { frame, offset }, _) => {
                code.emit(PCode::Ldvv, &[frame, offset]);
            }
        }

        Ok(code)
    }

    /// Pop the value on top of the stack into a variable's cell.
    pub fn store_variable(&self, id: VariableId) -> GeneratorResult<Vec<Word>> {
        let kind = self.layout.variable(id)?.kind;
        let mut code = Vec::new();

        match (self.layout.location(id)?, kind) {
            (Location::Turtle { base, offset }, _) => {
                if self.options.turtle_attributes_as_globals {
                    code.emit(PCode::Stvg, &[base + offset]);
                } else {
                    code.emit(PCode::Stvv, &[TURTLE_POINTER, offset]);
                }
            }
            (Location::Global(address), VariableKind::Value) => {
                code.emit(PCode::Stvg, &[address]);
            }
            (Location::Global(address), _) => {
                code.emit(PCode::Ldvg, &[address]);
                code.emit(PCode::Sptr, &[]);
            }
            (Location::Local { frame, offset }, VariableKind::Reference) => {
                code.emit(PCode::Stvr, &[frame, offset]);
            }
            (Location::Local { frame, offset }, VariableKind::Pointer) => {
                code.emit(PCode::Ldvv, &[frame, offset]);
                code.emit(PCode::Sptr, &[]);
            }
            (Location::Local { frame, offset }, _) => {
                code.emit(PCode::Stvv, &[frame, offset]);
            }
        }

        Ok(code)
    }

    /// Push the address of a variable's cell. For a reference parameter
    /// that is the address it holds.
    pub fn variable_address(&self, id: VariableId) -> GeneratorResult<Vec<Word>> {
        let kind = self.layout.variable(id)?.kind;
        let mut code = Vec::new();

        match (self.layout.location(id)?, kind) {
            (Location::Turtle { base, offset }, _) => {
                if self.options.turtle_attributes_as_globals {
                    code.emit(PCode::Ldag, &[base + offset]);
                } else {
                    code.emit(PCode::Ldav, &[TURTLE_POINTER, offset]);
                }
            }
            (Location::Global(address), VariableKind::Reference) => {
                code.emit(PCode::Ldvg, &[address]);
            }
            (Location::Global(address), _) => code.emit(PCode::Ldag, &[address]),
            (Location::Local { frame, offset }, VariableKind::Reference) => {
                code.emit(PCode::Ldvv, &[frame, offset]);
            }
            (Location::Local { frame, offset }, _) => code.emit(PCode::Ldav, &[frame, offset]),
        }

        Ok(code)
    }

    /// Push the address of an array element or string character.
    ///
    /// Array dimensions come first, outermost first; an index past the last
    /// dimension of a string selects a character.
    pub fn element_address(
        &self,
        id: VariableId,
        indexes: &[Expression],
    ) -> GeneratorResult<Vec<Word>> {
        let variable = self.layout.variable(id)?;
        let dimensions = variable.dimensions.len();
        let mut code = self.load_variable(id)?;

        for (depth, index) in indexes.iter().enumerate() {
            // step from the enclosing slot to the pointer it holds
            if depth > 0 {
                code.emit(PCode::Lptr, &[]);
            }

            code.extend(self.expression(index, false)?);

            if let Some(bounds) = variable.dimensions.get(depth) {
                origin_correction(bounds.start, &mut code);
                if self.options.range_check_arrays {
                    code.emit(PCode::Test, &[]);
                }
                let length = element_length(variable, depth);
                if length != 1 {
                    code.emit(PCode::Ldin, &[length]);
                    code.emit(PCode::Mult, &[]);
                }
                code.emit(PCode::Plus, &[]);
                code.emit(PCode::Incr, &[]);
            } else if depth == dimensions && variable.var_type == Type::String {
                origin_correction(self.language.string_index_origin(), &mut code);
                code.emit(PCode::Plus, &[]);
                code.emit(PCode::Ldin, &[STRING_CHARACTER_OFFSET]);
                code.emit(PCode::Plus, &[]);
            } else {
                return Err(GeneratorError::NotAddressable {
                    what: format!("index {} of '{}'", depth + 1, variable.name),
                });
            }
        }

        Ok(code)
    }
}

/// Shift an index so the first element is 0.
fn origin_correction(origin: i64, code: &mut Vec<Word>) {
    match origin {
        0 => {}
        1 => code.emit(PCode::Decr, &[]),
        n => {
            code.emit(PCode::Ldin, &[n]);
            code.emit(PCode::Subt, &[]);
        }
    }
}

fn literal_code(literal: &Literal, code: &mut Vec<Word>) {
    match literal {
        Literal::Integer(n) => code.emit(PCode::Ldin, &[*n]),
        Literal::Boolean(b) => code.emit(PCode::Ldin, &[if *b { -1 } else { 0 }]),
        Literal::Character(c) => code.emit(PCode::Ldin, &[*c as i64]),
        Literal::String(s) => {
            let characters: Vec<i64> = s.chars().map(|c| c as i64).collect();
            code.push(Word::Op(PCode::Lstr));
            code.push(Word::Int(characters.len() as i64));
            code.extend(characters.into_iter().map(Word::Int));
        }
    }
}

fn describe(kind: &ExpressionKind) -> &'static str {
    match kind {
        ExpressionKind::Literal(_) => "a literal",
        ExpressionKind::Input { .. } => "an input value",
        ExpressionKind::Constant { .. } => "a constant",
        ExpressionKind::Colour { .. } => "a colour constant",
        ExpressionKind::Variable { .. } => "a variable",
        ExpressionKind::Address { .. } => "an address",
        ExpressionKind::Call(_) => "a call result",
        ExpressionKind::Unary { .. } | ExpressionKind::Binary { .. } => "an operation",
        ExpressionKind::Cast { .. } => "a cast",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Line;
    use crate::lang::{Bounds, Language, NativeRoutine, Program, Subroutine, TurtleProperty, Variable};
    use crate::options::Options;

    fn ops(code: &[Word]) -> Vec<PCode> {
        crate::bytecode::opcodes(code).collect()
    }

    fn emit(program: &Program, expression: &Expression) -> Line {
        let options = Options::default();
        Generator::new(program, &options)
            .expression(expression, false)
            .unwrap()
    }

    // =========================================================================
    // Literals
    // =========================================================================

    #[test]
    fn test_integer_literal() {
        let program = Program::new("t", Language::Python);
        let code = emit(&program, &Expression::integer(42));
        assert_eq!(code, vec![Word::Op(PCode::Ldin), Word::Int(42)]);
    }

    #[test]
    fn test_boolean_literals() {
        let program = Program::new("t", Language::Python);
        assert_eq!(emit(&program, &Expression::boolean(true))[1], Word::Int(-1));
        assert_eq!(emit(&program, &Expression::boolean(false))[1], Word::Int(0));
    }

    #[test]
    fn test_string_literal_is_length_prefixed() {
        let program = Program::new("t", Language::Python);
        let code = emit(&program, &Expression::string("ok"));
        assert_eq!(
            code,
            vec![
                Word::Op(PCode::Lstr),
                Word::Int(2),
                Word::Int('o' as i64),
                Word::Int('k' as i64)
            ]
        );
    }

    #[test]
    fn test_input_and_colour() {
        let program = Program::new("t", Language::Basic);
        let input = Expression::new(
            ExpressionKind::Input {
                name: "?key".to_string(),
                index: -9,
            },
            Type::Integer,
        );
        assert_eq!(ops(&emit(&program, &input)), vec![PCode::Ldin, PCode::Inpt]);

        let red = Expression::new(
            ExpressionKind::Colour {
                name: "red".to_string(),
                value: 0xFF0000,
            },
            Type::Integer,
        );
        assert_eq!(
            emit(&program, &red),
            vec![Word::Op(PCode::Ldin), Word::Int(0xFF0000)]
        );
    }

    // =========================================================================
    // Operators
    // =========================================================================

    #[test]
    fn test_ambiguous_operators_select_by_operand_type() {
        let program = Program::new("t", Language::Pascal);
        let pairs = [
            (Operator::Plus, PCode::Plus, PCode::Scat),
            (Operator::Eqal, PCode::Eqal, PCode::Seql),
            (Operator::Noeq, PCode::Noeq, PCode::Sneq),
            (Operator::Less, PCode::Less, PCode::Sles),
            (Operator::More, PCode::More, PCode::Smor),
            (Operator::Lseq, PCode::Lseq, PCode::Slse),
            (Operator::Mreq, PCode::Mreq, PCode::Smre),
        ];

        for (operator, numeric, string) in pairs {
            let ints = Expression::binary(
                operator,
                Expression::integer(3),
                Expression::integer(4),
                Type::Integer,
            );
            let strs = Expression::binary(
                operator,
                Expression::string("a"),
                Expression::string("b"),
                Type::String,
            );
            let chars = Expression::binary(
                operator,
                Expression::character('a'),
                Expression::character('b'),
                Type::Boolean,
            );

            let int_ops = ops(&emit(&program, &ints));
            assert_eq!(int_ops.last(), Some(&numeric));
            assert!(!int_ops.contains(&string));

            let str_ops = ops(&emit(&program, &strs));
            assert_eq!(str_ops.last(), Some(&string));
            assert!(!str_ops.contains(&numeric));

            assert_eq!(ops(&emit(&program, &chars)).last(), Some(&string));
        }
    }

    #[test]
    fn test_unambiguous_operator_keeps_opcode() {
        let program = Program::new("t", Language::C);
        let e = Expression::binary(
            Operator::Mult,
            Expression::integer(6),
            Expression::integer(7),
            Type::Integer,
        );
        assert_eq!(ops(&emit(&program, &e)), vec![PCode::Ldin, PCode::Ldin, PCode::Mult]);
    }

    #[test]
    fn test_plus_one_becomes_incr() {
        let mut program = Program::new("t", Language::C);
        let n = program.declare(Variable::new("n", Type::Integer));
        let e = Expression::binary(
            Operator::Plus,
            Expression::variable(n, Type::Integer),
            Expression::integer(1),
            Type::Integer,
        );
        assert_eq!(ops(&emit(&program, &e)), vec![PCode::Ldvg, PCode::Incr]);
    }

    #[test]
    fn test_minus_one_becomes_decr() {
        let mut program = Program::new("t", Language::C);
        let n = program.declare(Variable::new("n", Type::Integer));
        let e = Expression::binary(
            Operator::Subt,
            Expression::variable(n, Type::Integer),
            Expression::integer(1),
            Type::Integer,
        );
        assert_eq!(ops(&emit(&program, &e)), vec![PCode::Ldvg, PCode::Decr]);
    }

    #[test]
    fn test_plus_two_is_not_rewritten() {
        let program = Program::new("t", Language::C);
        let e = Expression::binary(
            Operator::Plus,
            Expression::integer(5),
            Expression::integer(2),
            Type::Integer,
        );
        assert_eq!(ops(&emit(&program, &e)), vec![PCode::Ldin, PCode::Ldin, PCode::Plus]);
    }

    #[test]
    fn test_one_plus_n_is_not_rewritten() {
        let program = Program::new("t", Language::C);
        let e = Expression::binary(
            Operator::Plus,
            Expression::integer(1),
            Expression::integer(5),
            Type::Integer,
        );
        assert_eq!(ops(&emit(&program, &e)).last(), Some(&PCode::Plus));
    }

    #[test]
    fn test_unary() {
        let program = Program::new("t", Language::Pascal);
        let e = Expression::unary(Operator::Neg, Expression::integer(5));
        assert_eq!(ops(&emit(&program, &e)), vec![PCode::Ldin, PCode::Neg]);
    }

    // =========================================================================
    // Casts
    // =========================================================================

    #[test]
    fn test_legal_casts() {
        let program = Program::new("t", Language::Python);
        let cases = [
            (Expression::character('x'), Type::String, PCode::Ctos),
            (Expression::integer(7), Type::String, PCode::Itos),
            (Expression::string("7"), Type::Integer, PCode::Sval),
        ];
        for (inner, to, expected) in cases {
            let code = emit(&program, &Expression::cast(inner, to));
            assert_eq!(ops(&code).last(), Some(&expected));
        }
    }

    #[test]
    fn test_illegal_cast_is_internal_error() {
        let program = Program::new("t", Language::Python);
        let options = Options::default();
        let e = Expression::cast(Expression::boolean(true), Type::String);
        let result = Generator::new(&program, &options).expression(&e, false);
        assert!(matches!(
            result,
            Err(GeneratorError::IllegalCast {
                from: Type::Boolean,
                to: Type::String
            })
        ));
    }

    // =========================================================================
    // Variables
    // =========================================================================

    #[test]
    fn test_variable_kinds_load_differently() {
        let mut program = Program::new("t", Language::Pascal);
        let g = program.declare(Variable::new("g", Type::Integer));
        let gp = program.declare(Variable::new("gp", Type::Integer).pointer());
        let mut sub = Subroutine::procedure(1, "p");
        let v = sub.declare(Variable::new("v", Type::Integer).parameter());
        let r = sub.declare(Variable::new("r", Type::Integer).reference_parameter());
        let p = sub.declare(Variable::new("p", Type::Integer).pointer());
        program.subroutines.push(sub);
        let x = program.turtle(TurtleProperty::X).unwrap();

        let load = |id| ops(&emit(&program, &Expression::variable(id, Type::Integer)));
        assert_eq!(load(x), vec![PCode::Ldvv]);
        assert_eq!(load(g), vec![PCode::Ldvg]);
        assert_eq!(load(gp), vec![PCode::Ldvg, PCode::Lptr]);
        assert_eq!(load(v), vec![PCode::Ldvv]);
        assert_eq!(load(r), vec![PCode::Ldvr]);
        assert_eq!(load(p), vec![PCode::Ldvv, PCode::Lptr]);
    }

    #[test]
    fn test_turtle_load_operands() {
        let program = Program::new("t", Language::Pascal);
        let d = program.turtle(TurtleProperty::Direction).unwrap();
        let code = emit(&program, &Expression::variable(d, Type::Integer));
        assert_eq!(
            code,
            vec![Word::Op(PCode::Ldvv), Word::Int(0), Word::Int(3)]
        );
    }

    #[test]
    fn test_turtle_as_global() {
        let program = Program::new("t", Language::Pascal);
        let options = Options {
            turtle_attributes_as_globals: true,
            ..Options::default()
        };
        let y = program.turtle(TurtleProperty::Y).unwrap();
        let code = Generator::new(&program, &options)
            .expression(&Expression::variable(y, Type::Integer), false)
            .unwrap();
        // turtle base is 2 with no subroutines
        assert_eq!(code, vec![Word::Op(PCode::Ldvg), Word::Int(4)]);
    }

    #[test]
    fn test_variable_kinds_store_differently() {
        let mut program = Program::new("t", Language::Pascal);
        let g = program.declare(Variable::new("g", Type::Integer));
        let gp = program.declare(Variable::new("gp", Type::Integer).pointer());
        let mut sub = Subroutine::procedure(1, "p");
        let v = sub.declare(Variable::new("v", Type::Integer).parameter());
        let r = sub.declare(Variable::new("r", Type::Integer).reference_parameter());
        let p = sub.declare(Variable::new("p", Type::Integer).pointer());
        program.subroutines.push(sub);
        let x = program.turtle(TurtleProperty::X).unwrap();

        let turtle_globals = Options {
            turtle_attributes_as_globals: true,
            ..Options::default()
        };
        let defaults = Options::default();

        // one subroutine: turtle base 3, globals from 10, frame cell 2
        let cases = [
            (x, &defaults, vec![Word::Op(PCode::Stvv), Word::Int(0), Word::Int(1)]),
            (x, &turtle_globals, vec![Word::Op(PCode::Stvg), Word::Int(4)]),
            (g, &defaults, vec![Word::Op(PCode::Stvg), Word::Int(10)]),
            (gp, &defaults, vec![Word::Op(PCode::Ldvg), Word::Int(11), Word::Op(PCode::Sptr)]),
            (v, &defaults, vec![Word::Op(PCode::Stvv), Word::Int(2), Word::Int(0)]),
            (r, &defaults, vec![Word::Op(PCode::Stvr), Word::Int(2), Word::Int(1)]),
            (
                p,
                &defaults,
                vec![Word::Op(PCode::Ldvv), Word::Int(2), Word::Int(2), Word::Op(PCode::Sptr)],
            ),
        ];
        for (id, options, expected) in cases {
            let code = Generator::new(&program, options).store_variable(id).unwrap();
            assert_eq!(code, expected, "store to {:?}", id);
        }
    }

    #[test]
    fn test_address_of() {
        let mut program = Program::new("t", Language::C);
        let g = program.declare(Variable::new("g", Type::Integer));
        let mut sub = Subroutine::procedure(1, "p");
        let l = sub.declare(Variable::new("l", Type::Integer));
        let r = sub.declare(Variable::new("r", Type::Integer).reference_parameter());
        program.subroutines.push(sub);

        let address = |id| {
            emit(
                &program,
                &Expression::new(ExpressionKind::Address { variable: id }, Type::Integer),
            )
        };
        assert_eq!(ops(&address(g)), vec![PCode::Ldag]);
        assert_eq!(address(l), vec![Word::Op(PCode::Ldav), Word::Int(2), Word::Int(0)]);
        assert_eq!(address(r), vec![Word::Op(PCode::Ldvv), Word::Int(2), Word::Int(1)]);
    }

    #[test]
    fn test_array_read_zero_based() {
        let mut program = Program::new("t", Language::C);
        let a = program.declare(Variable::new("a", Type::Integer).array(vec![Bounds::zero_based(5)]));
        let options = Options {
            range_check_arrays: false,
            ..Options::default()
        };
        let e = Expression::element(a, vec![Expression::integer(2)], Type::Integer);
        let code = Generator::new(&program, &options).expression(&e, false).unwrap();
        assert_eq!(
            ops(&code),
            vec![PCode::Ldvg, PCode::Ldin, PCode::Plus, PCode::Incr, PCode::Lptr]
        );
    }

    #[test]
    fn test_array_read_one_based_with_range_check() {
        let mut program = Program::new("t", Language::Pascal);
        let a = program.declare(Variable::new("a", Type::Integer).array(vec![Bounds::new(1, 5)]));
        let e = Expression::element(a, vec![Expression::integer(2)], Type::Integer);
        assert_eq!(
            ops(&emit(&program, &e)),
            vec![
                PCode::Ldvg,
                PCode::Ldin,
                PCode::Decr,
                PCode::Test,
                PCode::Plus,
                PCode::Incr,
                PCode::Lptr
            ]
        );
    }

    #[test]
    fn test_array_with_other_lower_bound() {
        let mut program = Program::new("t", Language::Pascal);
        let a = program.declare(Variable::new("a", Type::Integer).array(vec![Bounds::new(5, 9)]));
        let options = Options {
            range_check_arrays: false,
            ..Options::default()
        };
        let e = Expression::element(a, vec![Expression::integer(7)], Type::Integer);
        let code = Generator::new(&program, &options).expression(&e, false).unwrap();
        assert_eq!(
            code[2..6],
            [
                Word::Op(PCode::Ldin),
                Word::Int(7),
                Word::Op(PCode::Ldin),
                Word::Int(5)
            ]
        );
        assert_eq!(code[6], Word::Op(PCode::Subt));
    }

    #[test]
    fn test_string_character_read_pascal() {
        let mut program = Program::new("t", Language::Pascal);
        let s = program.declare(Variable::new("s", Type::String));
        let e = Expression::element(s, vec![Expression::integer(1)], Type::Character);
        assert_eq!(
            ops(&emit(&program, &e)),
            vec![
                PCode::Ldvg,
                PCode::Ldin,
                PCode::Decr,
                PCode::Plus,
                PCode::Ldin,
                PCode::Plus,
                PCode::Lptr
            ]
        );
    }

    #[test]
    fn test_string_character_read_python_has_no_correction() {
        let mut program = Program::new("t", Language::Python);
        let s = program.declare(Variable::new("s", Type::String));
        let e = Expression::element(s, vec![Expression::integer(0)], Type::Character);
        assert!(!ops(&emit(&program, &e)).contains(&PCode::Decr));
    }

    #[test]
    fn test_too_many_indexes() {
        let mut program = Program::new("t", Language::C);
        let n = program.declare(Variable::new("n", Type::Integer));
        let options = Options::default();
        let e = Expression::element(n, vec![Expression::integer(0)], Type::Integer);
        let result = Generator::new(&program, &options).expression(&e, false);
        assert!(matches!(result, Err(GeneratorError::NotAddressable { .. })));
    }

    // =========================================================================
    // Calls
    // =========================================================================

    #[test]
    fn test_function_call_uses_placeholder_and_result_cell() {
        let mut program = Program::new("t", Language::Pascal);
        let mut f = Subroutine::function(1, "double", Type::Integer);
        f.declare(Variable::new("n", Type::Integer).parameter());
        program.subroutines.push(f);

        let e = Expression::call(Callee::Subroutine(1), vec![Expression::integer(4)], Type::Integer);
        let code = emit(&program, &e);
        assert_eq!(
            code,
            vec![
                Word::Op(PCode::Ldin),
                Word::Int(4),
                Word::Op(PCode::Subr),
                Word::PendingCall(1),
                Word::Op(PCode::Ldvg),
                Word::Int(3)
            ]
        );
    }

    #[test]
    fn test_reference_argument_passes_address() {
        let mut program = Program::new("t", Language::Pascal);
        let g = program.declare(Variable::new("g", Type::Integer));
        let mut p = Subroutine::procedure(1, "bump");
        p.declare(Variable::new("n", Type::Integer).reference_parameter());
        program.subroutines.push(p);

        let e = Expression::call(
            Callee::Subroutine(1),
            vec![Expression::variable(g, Type::Integer)],
            Type::Integer,
        );
        assert_eq!(ops(&emit(&program, &e))[0], PCode::Ldag);
    }

    #[test]
    fn test_reference_argument_must_be_addressable() {
        let mut program = Program::new("t", Language::Pascal);
        let mut p = Subroutine::procedure(1, "bump");
        p.declare(Variable::new("n", Type::Integer).reference_parameter());
        program.subroutines.push(p);
        let options = Options::default();

        let e = Expression::call(Callee::Subroutine(1), vec![Expression::integer(1)], Type::Integer);
        let result = Generator::new(&program, &options).expression(&e, false);
        assert!(matches!(result, Err(GeneratorError::NotAddressable { .. })));
    }

    #[test]
    fn test_native_call_appends_native_code() {
        let program = Program::new("t", Language::Pascal);
        let uppercase = NativeRoutine {
            name: "uppercase".to_string(),
            reference_parameters: vec![false],
            returns: Some(Type::String),
            code: vec![Word::Op(PCode::Ldin), Word::Int(1), Word::Op(PCode::Case)],
        };
        let e = Expression::call(
            Callee::Native(uppercase),
            vec![Expression::string("a")],
            Type::String,
        );
        assert_eq!(
            ops(&emit(&program, &e)),
            vec![PCode::Lstr, PCode::Ldin, PCode::Case]
        );
    }

    #[test]
    fn test_call_to_missing_subroutine() {
        let program = Program::new("t", Language::Pascal);
        let options = Options::default();
        let e = Expression::call(Callee::Subroutine(9), vec![], Type::Integer);
        let result = Generator::new(&program, &options).expression(&e, false);
        assert!(matches!(
            result,
            Err(GeneratorError::UnknownSubroutine { index: 9 })
        ));
    }
}
