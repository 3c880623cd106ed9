use serde::{Deserialize, Serialize};

/// Statically resolved type of a variable or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Boolean,
    Integer,
    Character,
    String,
    /// Either a boolean or an integer (BASIC and C make no distinction).
    BoolInt,
}

impl Type {
    /// True for the types whose ambiguous operators select the string opcode.
    pub fn is_stringlike(self) -> bool {
        matches!(self, Type::String | Type::Character)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Type::Boolean => "boolean",
            Type::Integer => "integer",
            Type::Character => "character",
            Type::String => "string",
            Type::BoolInt => "boolint",
        };
        write!(f, "{}", name)
    }
}

/// Source language the tree was parsed from.
///
/// The generator only consults it for indexing conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    Basic,
    C,
    Pascal,
    Python,
    TypeScript,
}

impl Language {
    /// Index of the first character of a string.
    pub fn string_index_origin(self) -> i64 {
        match self {
            Language::Basic | Language::Pascal => 1,
            Language::C | Language::Python | Language::TypeScript => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stringlike_types() {
        assert!(Type::String.is_stringlike());
        assert!(Type::Character.is_stringlike());
        assert!(!Type::Integer.is_stringlike());
        assert!(!Type::Boolean.is_stringlike());
        assert!(!Type::BoolInt.is_stringlike());
    }

    #[test]
    fn test_string_index_origin() {
        assert_eq!(Language::Pascal.string_index_origin(), 1);
        assert_eq!(Language::Basic.string_index_origin(), 1);
        assert_eq!(Language::Python.string_index_origin(), 0);
        assert_eq!(Language::C.string_index_origin(), 0);
    }
}
