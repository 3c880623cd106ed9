use serde::{Deserialize, Serialize};

use super::types::Type;

/// Declared maximum length of a string when the source gives none.
pub const DEFAULT_STRING_LENGTH: usize = 32;

/// Reference to a declared variable: owning routine index and declaration slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableId {
    pub routine: usize,
    pub slot: usize,
}

impl VariableId {
    pub fn new(routine: usize, slot: usize) -> Self {
        Self { routine, slot }
    }
}

/// One of the built-in turtle properties every program implicitly has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurtleProperty {
    /// `turtx`
    X,
    /// `turty`
    Y,
    /// `turtd` (heading)
    Direction,
    /// `turta` (degrees in a full turn)
    Angles,
    /// `turtt` (pen thickness)
    Thickness,
    /// `turtc` (pen colour)
    Colour,
}

impl TurtleProperty {
    pub const ALL: [TurtleProperty; 6] = [
        TurtleProperty::X,
        TurtleProperty::Y,
        TurtleProperty::Direction,
        TurtleProperty::Angles,
        TurtleProperty::Thickness,
        TurtleProperty::Colour,
    ];

    /// Offset of the property from the turtle base cell (1..=6).
    pub fn offset(self) -> i64 {
        match self {
            TurtleProperty::X => 1,
            TurtleProperty::Y => 2,
            TurtleProperty::Direction => 3,
            TurtleProperty::Angles => 4,
            TurtleProperty::Thickness => 5,
            TurtleProperty::Colour => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TurtleProperty::X => "turtx",
            TurtleProperty::Y => "turty",
            TurtleProperty::Direction => "turtd",
            TurtleProperty::Angles => "turta",
            TurtleProperty::Thickness => "turtt",
            TurtleProperty::Colour => "turtc",
        }
    }
}

/// How a variable's cell is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// Holds its value directly (strings and arrays hold their own storage).
    Value,
    /// A turtle built-in property.
    Turtle(TurtleProperty),
    /// A reference parameter: the cell holds the caller's variable address.
    Reference,
    /// A raw pointer: the cell holds an address that reads and writes go through.
    Pointer,
}

/// Inclusive bounds of one array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub start: i64,
    pub end: i64,
}

impl Bounds {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Zero-based dimension of `count` elements.
    pub fn zero_based(count: i64) -> Self {
        Self {
            start: 0,
            end: count - 1,
        }
    }

    pub fn count(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// Declared type; for arrays, the type of the innermost elements.
    pub var_type: Type,
    pub kind: VariableKind,
    pub parameter: bool,
    /// Declared maximum length; only meaningful for strings.
    pub string_length: usize,
    /// One entry per array dimension, outermost first. Empty for scalars.
    pub dimensions: Vec<Bounds>,
}

impl Variable {
    pub fn new(name: impl Into<String>, var_type: Type) -> Self {
        Self {
            name: name.into(),
            var_type,
            kind: VariableKind::Value,
            parameter: false,
            string_length: DEFAULT_STRING_LENGTH,
            dimensions: Vec::new(),
        }
    }

    pub fn turtle(property: TurtleProperty) -> Self {
        Self {
            kind: VariableKind::Turtle(property),
            ..Self::new(property.name(), Type::Integer)
        }
    }

    /// Mark as a value parameter.
    pub fn parameter(mut self) -> Self {
        self.parameter = true;
        self
    }

    /// Mark as a reference parameter.
    pub fn reference_parameter(mut self) -> Self {
        self.parameter = true;
        self.kind = VariableKind::Reference;
        self
    }

    pub fn pointer(mut self) -> Self {
        self.kind = VariableKind::Pointer;
        self
    }

    pub fn with_string_length(mut self, length: usize) -> Self {
        self.string_length = length;
        self
    }

    pub fn array(mut self, dimensions: Vec<Bounds>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn is_array(&self) -> bool {
        !self.dimensions.is_empty()
    }

    pub fn is_turtle(&self) -> bool {
        matches!(self.kind, VariableKind::Turtle(_))
    }

    /// True when the variable owns the storage of a string or array
    /// (as opposed to holding an address of someone else's).
    pub fn owns_storage(&self) -> bool {
        self.kind == VariableKind::Value && (self.is_array() || self.var_type == Type::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turtle_offsets_are_one_to_six() {
        let offsets: Vec<i64> = TurtleProperty::ALL.iter().map(|p| p.offset()).collect();
        assert_eq!(offsets, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_bounds_count() {
        assert_eq!(Bounds::new(1, 10).count(), 10);
        assert_eq!(Bounds::zero_based(5).count(), 5);
        assert_eq!(Bounds::new(-2, 2).count(), 5);
    }

    #[test]
    fn test_owns_storage() {
        assert!(Variable::new("s", Type::String).owns_storage());
        assert!(Variable::new("a", Type::Integer)
            .array(vec![Bounds::zero_based(3)])
            .owns_storage());
        assert!(!Variable::new("n", Type::Integer).owns_storage());
        assert!(!Variable::new("s", Type::String)
            .reference_parameter()
            .owns_storage());
    }
}
