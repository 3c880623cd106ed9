use serde::{Deserialize, Serialize};

use super::types::Type;
use super::variable::VariableId;
use crate::bytecode::{PCode, Word};

/// A typed expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    /// Statically resolved type of the expression's value.
    pub ty: Type,
}

/// Literal value, also used for the value of a named constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Boolean(bool),
    Character(char),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionKind {
    // ───────────────────────────── Values ─────────────────────────────
    Literal(Literal),

    /// Value read from an input device (keyboard, mouse).
    ///
    /// Stack effect: `( -- value )`
    Input { name: String, index: i64 },

    /// A named constant, already folded to its value.
    Constant { name: String, value: Literal },

    /// A colour constant (RGB value).
    Colour { name: String, value: i64 },

    // ──────────────────────────── Variables ───────────────────────────
    /// Read a variable, or one of its elements when `indexes` is non-empty.
    ///
    /// Array dimensions are indexed first, outermost first; one further index
    /// on a string selects a character.
    Variable {
        variable: VariableId,
        indexes: Vec<Expression>,
    },

    /// Address of a variable.
    Address { variable: VariableId },

    // ─────────────────────────── Operations ───────────────────────────
    Call(Call),

    Unary {
        operator: Operator,
        operand: Box<Expression>,
    },

    Binary {
        operator: Operator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Conversion of `expression` to the type of the enclosing node.
    Cast { expression: Box<Expression> },
}

/// Operator as written in the source.
///
/// Ambiguous operators (`+`, comparisons) name their numeric form; the
/// generator picks the string form from the operand type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Neg,
    Not,
    And,
    Or,
    Xor,
    Plus,
    Subt,
    Mult,
    Divr,
    Div,
    Mod,
    Eqal,
    Noeq,
    Less,
    More,
    Lseq,
    Mreq,
}

impl Operator {
    /// The numeric opcode for this operator.
    pub fn pcode(self) -> PCode {
        match self {
            Operator::Neg => PCode::Neg,
            Operator::Not => PCode::Not,
            Operator::And => PCode::And,
            Operator::Or => PCode::Or,
            Operator::Xor => PCode::Xor,
            Operator::Plus => PCode::Plus,
            Operator::Subt => PCode::Subt,
            Operator::Mult => PCode::Mult,
            Operator::Divr => PCode::Divr,
            Operator::Div => PCode::Div,
            Operator::Mod => PCode::Mod,
            Operator::Eqal => PCode::Eqal,
            Operator::Noeq => PCode::Noeq,
            Operator::Less => PCode::Less,
            Operator::More => PCode::More,
            Operator::Lseq => PCode::Lseq,
            Operator::Mreq => PCode::Mreq,
        }
    }
}

/// A call to a native routine or a user subroutine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub callee: Callee,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Callee {
    Native(NativeRoutine),
    /// User subroutine, by its routine index.
    Subroutine(usize),
}

/// A routine the virtual machine implements directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeRoutine {
    pub name: String,
    /// One flag per parameter: `true` when passed by reference.
    pub reference_parameters: Vec<bool>,
    pub returns: Option<Type>,
    /// Instructions appended after the arguments.
    pub code: Vec<Word>,
}

impl Expression {
    pub fn new(kind: ExpressionKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    pub fn integer(value: i64) -> Self {
        Self::new(ExpressionKind::Literal(Literal::Integer(value)), Type::Integer)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExpressionKind::Literal(Literal::Boolean(value)), Type::Boolean)
    }

    pub fn character(value: char) -> Self {
        Self::new(
            ExpressionKind::Literal(Literal::Character(value)),
            Type::Character,
        )
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(
            ExpressionKind::Literal(Literal::String(value.into())),
            Type::String,
        )
    }

    pub fn variable(variable: VariableId, ty: Type) -> Self {
        Self::new(
            ExpressionKind::Variable {
                variable,
                indexes: Vec::new(),
            },
            ty,
        )
    }

    pub fn element(variable: VariableId, indexes: Vec<Expression>, ty: Type) -> Self {
        Self::new(ExpressionKind::Variable { variable, indexes }, ty)
    }

    pub fn binary(operator: Operator, left: Expression, right: Expression, ty: Type) -> Self {
        Self::new(
            ExpressionKind::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        )
    }

    pub fn unary(operator: Operator, operand: Expression) -> Self {
        let ty = operand.ty;
        Self::new(
            ExpressionKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            ty,
        )
    }

    pub fn cast(expression: Expression, ty: Type) -> Self {
        Self::new(
            ExpressionKind::Cast {
                expression: Box::new(expression),
            },
            ty,
        )
    }

    pub fn call(callee: Callee, arguments: Vec<Expression>, ty: Type) -> Self {
        Self::new(ExpressionKind::Call(Call { callee, arguments }), ty)
    }

    /// True when this is the integer literal `value`.
    pub fn is_integer_literal(&self, value: i64) -> bool {
        matches!(self.kind, ExpressionKind::Literal(Literal::Integer(n)) if n == value)
    }
}
