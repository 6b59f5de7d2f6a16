//! The `type` attribute vocabulary.

use serde::Serialize;
use std::fmt;

/// Name of the attribute that declares an element's type.
pub const TYPE_ATTRIBUTE: &str = "type";

/// Declared or inferred type of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Plain text.
    String,
    /// Base-10 decimal number.
    Decimal,
    /// 64-bit signed integer.
    Integer,
    /// Calendar date.
    Date,
    /// Date, time and UTC offset.
    DateTime,
    /// Boolean flag.
    Boolean,
    /// Ordered sequence of child values.
    Array,
    /// Mapping of child tag names to values.
    Dictionary,
}

impl ValueType {
    /// Maps a `type` attribute value to a type. Matching is case-sensitive.
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "string" => Some(ValueType::String),
            "decimal" => Some(ValueType::Decimal),
            "integer" => Some(ValueType::Integer),
            "date" => Some(ValueType::Date),
            "datetime" => Some(ValueType::DateTime),
            "boolean" => Some(ValueType::Boolean),
            "array" => Some(ValueType::Array),
            "dictionary" => Some(ValueType::Dictionary),
            _ => None,
        }
    }

    /// The attribute value that declares this type.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Decimal => "decimal",
            ValueType::Integer => "integer",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Dictionary => "dictionary",
        }
    }

    /// Returns true for `Array` and `Dictionary`.
    pub fn is_structural(self) -> bool {
        matches!(self, ValueType::Array | ValueType::Dictionary)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attribute_matches_as_str() {
        let all = [
            ValueType::String,
            ValueType::Decimal,
            ValueType::Integer,
            ValueType::Date,
            ValueType::DateTime,
            ValueType::Boolean,
            ValueType::Array,
            ValueType::Dictionary,
        ];
        for ty in all {
            assert_eq!(ValueType::from_attribute(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn test_from_attribute_is_case_sensitive() {
        assert_eq!(ValueType::from_attribute("Integer"), None);
        assert_eq!(ValueType::from_attribute("DATETIME"), None);
        assert_eq!(ValueType::from_attribute("float"), None);
        assert_eq!(ValueType::from_attribute(""), None);
    }

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(ValueType::DateTime.to_string(), "datetime");
        assert_eq!(serde_json::to_string(&ValueType::DateTime).unwrap(), "\"datetime\"");
        assert!(ValueType::Array.is_structural());
        assert!(!ValueType::Boolean.is_structural());
    }
}
