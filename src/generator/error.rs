use thiserror::Error;

use crate::lang::Type;

/// Internal-invariant violations raised while generating PCode.
///
/// A tree that passed type checking never triggers these; each one means a
/// frontend or the generator itself broke a contract. Generation is
/// deterministic, so retrying a failed run fails the same way.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// A call placeholder that no assembled subroutine matches.
    #[error("internal error: call to subroutine {index} could not be resolved")]
    UnresolvedCall { index: usize },

    /// A reference to a routine index that is not in the tree.
    #[error("internal error: no subroutine with index {index}")]
    UnknownSubroutine { index: usize },

    #[error("internal error: routine {routine} has no variable in slot {slot}")]
    UnknownVariable { routine: usize, slot: usize },

    #[error("internal error: cannot cast {from} to {to}")]
    IllegalCast { from: Type, to: Type },

    /// A by-reference argument that is not a variable or element.
    #[error("internal error: {what} cannot be passed by reference")]
    NotAddressable { what: String },

    /// A word that has no integer form survived into the output.
    #[error("internal error: line {address} still holds an unresolved call to subroutine {index}")]
    UnlinkedWord { address: usize, index: usize },

    #[error("internal error: line {address}: {op} targets line {target}, outside 0..{len}")]
    InvalidTarget {
        address: usize,
        op: String,
        target: i64,
        len: usize,
    },

    #[error("internal error: line {address} is empty")]
    EmptyLine { address: usize },

    #[error("internal error: line {address} is malformed: {reason}")]
    MalformedLine { address: usize, reason: String },

    #[error("pcode encoding failed: {0}")]
    Encoding(#[source] postcard::Error),
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;
