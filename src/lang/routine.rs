use serde::{Deserialize, Serialize};

use super::statement::Statement;
use super::types::{Language, Type};
use super::variable::{TurtleProperty, Variable, VariableId, VariableKind};

/// The root routine. Its variables are the program's globals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub name: String,
    pub language: Language,
    pub variables: Vec<Variable>,
    pub subroutines: Vec<Subroutine>,
    pub statements: Vec<Statement>,
}

/// A procedure or function, possibly nested inside another subroutine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subroutine {
    /// Registration order, starting at 1.
    pub index: usize,
    pub name: String,
    /// Return type; `None` for procedures.
    pub returns: Option<Type>,
    /// Slot of the variable whose value a function returns when it ends
    /// without an explicit `return` (Pascal `result`, BASIC `RETURN`).
    pub result_variable: Option<usize>,
    pub variables: Vec<Variable>,
    pub subroutines: Vec<Subroutine>,
    pub statements: Vec<Statement>,
}

impl Program {
    /// A new, empty program with the built-in turtle properties declared.
    pub fn new(name: impl Into<String>, language: Language) -> Self {
        Self {
            name: name.into(),
            language,
            variables: TurtleProperty::ALL
                .iter()
                .map(|p| Variable::turtle(*p))
                .collect(),
            subroutines: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Declare a global and return its id.
    pub fn declare(&mut self, variable: Variable) -> VariableId {
        self.variables.push(variable);
        VariableId::new(0, self.variables.len() - 1)
    }

    /// Id of a turtle property, if the program declares it.
    pub fn turtle(&self, property: TurtleProperty) -> Option<VariableId> {
        self.variables
            .iter()
            .position(|v| v.kind == VariableKind::Turtle(property))
            .map(|slot| VariableId::new(0, slot))
    }

    /// Every subroutine in the tree, ordered by index.
    pub fn all_subroutines(&self) -> Vec<&Subroutine> {
        let mut all = Vec::new();
        for subroutine in &self.subroutines {
            subroutine.collect_into(&mut all);
        }
        all.sort_by_key(|s| s.index);
        all
    }
}

impl Subroutine {
    pub fn procedure(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            returns: None,
            result_variable: None,
            variables: Vec::new(),
            subroutines: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn function(index: usize, name: impl Into<String>, returns: Type) -> Self {
        Self {
            returns: Some(returns),
            ..Self::procedure(index, name)
        }
    }

    /// Declare a local (or parameter) and return its id.
    pub fn declare(&mut self, variable: Variable) -> VariableId {
        self.variables.push(variable);
        VariableId::new(self.index, self.variables.len() - 1)
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.parameter)
    }

    fn collect_into<'a>(&'a self, all: &mut Vec<&'a Subroutine>) {
        all.push(self);
        for child in &self.subroutines {
            child.collect_into(all);
        }
    }
}

/// Borrowed view over either kind of routine.
#[derive(Debug, Clone, Copy)]
pub enum Routine<'a> {
    Program(&'a Program),
    Subroutine(&'a Subroutine),
}

impl<'a> Routine<'a> {
    pub fn variables(&self) -> &'a [Variable] {
        match self {
            Routine::Program(p) => &p.variables,
            Routine::Subroutine(s) => &s.variables,
        }
    }

    pub fn is_program(&self) -> bool {
        matches!(self, Routine::Program(_))
    }
}
