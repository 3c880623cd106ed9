use serde::{Deserialize, Serialize};

use super::expression::{Call, Expression};
use super::variable::VariableId;

/// A statement node. Control-flow variants own their nested statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Assignment(Assignment),

    ProcedureCall(Call),

    If {
        condition: Expression,
        if_statements: Vec<Statement>,
        /// Empty when the statement has no else branch.
        else_statements: Vec<Statement>,
    },

    For(ForLoop),

    /// Body runs at least once; loops until `condition` holds.
    Repeat {
        condition: Expression,
        statements: Vec<Statement>,
    },

    While {
        condition: Expression,
        statements: Vec<Statement>,
    },

    /// Return from the current routine, with a value in functions.
    Return(Option<Expression>),

    Pass,
}

/// Store `value` into a variable or one of its elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub variable: VariableId,
    pub indexes: Vec<Expression>,
    pub value: Expression,
}

impl Assignment {
    pub fn new(variable: VariableId, value: Expression) -> Self {
        Self {
            variable,
            indexes: Vec::new(),
            value,
        }
    }

    pub fn element(variable: VariableId, indexes: Vec<Expression>, value: Expression) -> Self {
        Self {
            variable,
            indexes,
            value,
        }
    }
}

/// A counting loop, already desugared by the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForLoop {
    pub initialisation: Assignment,
    /// Loop continues while this holds.
    pub condition: Expression,
    /// Runs after every pass through the body.
    pub change: Assignment,
    pub statements: Vec<Statement>,
}
