//! # Routine tree
//!
//! This module defines the typed routine tree consumed by the PCode
//! generator. The tree is produced (and type-checked) by one of the language
//! frontends and handed over as plain data; the generator never mutates it.
//!
//! ## Conventions
//!
//! - Routine index `0` is always the main program; subroutines are numbered
//!   `1..=N` in registration order, however deeply they are nested.
//! - Variables are referred to by [`VariableId`]: the index of the routine
//!   that owns the variable and its position in that routine's declarations.
//! - Every expression carries its statically resolved [`Type`].

pub mod expression;
pub mod routine;
pub mod statement;
pub mod types;
pub mod variable;

pub use expression::{Call, Callee, Expression, ExpressionKind, Literal, NativeRoutine, Operator};
pub use routine::{Program, Routine, Subroutine};
pub use statement::{Assignment, ForLoop, Statement};
pub use types::{Language, Type};
pub use variable::{Bounds, TurtleProperty, Variable, VariableId, VariableKind};
