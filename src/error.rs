//! Error types for XML parsing and value coercion.

use std::fmt::{self, Display};

/// Result type alias for activeresource_xml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for parsing and coercion failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    position: Option<Position>,
}

/// Position information for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset from start.
    pub offset: usize,
}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The input is not well-formed XML.
    MalformedXml,
    /// A leaf's text does not match the grammar of its declared type.
    Coercion,
    /// A configured parser limit was exceeded.
    Limit,
}

/// The kind of error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected end of input.
    UnexpectedEof,
    /// Invalid XML syntax.
    Syntax(String),
    /// Invalid XML name.
    InvalidName(String),
    /// Unclosed tag.
    UnclosedTag(String),
    /// Mismatched closing tag.
    MismatchedTag {
        /// The expected tag name.
        expected: String,
        /// The actual tag name found.
        found: String,
    },
    /// Invalid escape sequence.
    InvalidEscape(String),
    /// Invalid UTF-8.
    InvalidUtf8,
    /// The document contains no root element.
    EmptyDocument,
    /// Text of a `decimal` element is not a base-10 number.
    InvalidDecimal {
        /// Name of the offending element.
        element: String,
        /// The text that failed to parse.
        text: String,
    },
    /// Text of an `integer` element is not a 64-bit signed integer.
    InvalidInteger {
        /// Name of the offending element.
        element: String,
        /// The text that failed to parse.
        text: String,
    },
    /// Text of a `date` element is not an ISO-8601 calendar date.
    InvalidDate {
        /// Name of the offending element.
        element: String,
        /// The text that failed to parse.
        text: String,
    },
    /// Text of a `datetime` element is not an ISO-8601 date-time.
    InvalidDateTime {
        /// Name of the offending element.
        element: String,
        /// The text that failed to parse.
        text: String,
    },
    /// Elements are nested deeper than the configured limit.
    DepthLimitExceeded(usize),
    /// The input is larger than the configured limit.
    InputTooLarge {
        /// Size of the input in bytes.
        size: usize,
        /// The configured limit in bytes.
        limit: usize,
    },
}

impl ErrorKind {
    /// Returns the category this kind belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::UnexpectedEof
            | ErrorKind::Syntax(_)
            | ErrorKind::InvalidName(_)
            | ErrorKind::UnclosedTag(_)
            | ErrorKind::MismatchedTag { .. }
            | ErrorKind::InvalidEscape(_)
            | ErrorKind::InvalidUtf8
            | ErrorKind::EmptyDocument => ErrorCategory::MalformedXml,
            ErrorKind::InvalidDecimal { .. }
            | ErrorKind::InvalidInteger { .. }
            | ErrorKind::InvalidDate { .. }
            | ErrorKind::InvalidDateTime { .. } => ErrorCategory::Coercion,
            ErrorKind::DepthLimitExceeded(_) | ErrorKind::InputTooLarge { .. } => {
                ErrorCategory::Limit
            }
        }
    }
}

impl Error {
    /// Creates a new error with the given kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, position: None }
    }

    /// Creates a new error with position information.
    #[inline]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the position where the error occurred.
    #[inline]
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Returns the broad category of this error.
    #[inline]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true if the input was rejected by the tokenizer.
    #[inline]
    pub fn is_malformed_xml(&self) -> bool {
        self.category() == ErrorCategory::MalformedXml
    }

    /// Returns true if a typed leaf failed to coerce.
    #[inline]
    pub fn is_coercion(&self) -> bool {
        self.category() == ErrorCategory::Coercion
    }

    /// Creates an unexpected EOF error.
    #[inline]
    pub fn unexpected_eof() -> Self {
        Self::new(ErrorKind::UnexpectedEof)
    }

    /// Creates a syntax error.
    #[inline]
    pub fn syntax<S: Into<String>>(msg: S) -> Self {
        Self::new(ErrorKind::Syntax(msg.into()))
    }

    /// Creates an invalid name error.
    #[inline]
    pub fn invalid_name<S: Into<String>>(name: S) -> Self {
        Self::new(ErrorKind::InvalidName(name.into()))
    }

    /// Creates an unclosed tag error.
    #[inline]
    pub fn unclosed_tag<S: Into<String>>(tag: S) -> Self {
        Self::new(ErrorKind::UnclosedTag(tag.into()))
    }

    /// Creates a mismatched tag error.
    #[inline]
    pub fn mismatched_tag<S: Into<String>>(expected: S, found: S) -> Self {
        Self::new(ErrorKind::MismatchedTag {
            expected: expected.into(),
            found: found.into(),
        })
    }

    /// Creates an invalid escape error.
    #[inline]
    pub fn invalid_escape<S: Into<String>>(seq: S) -> Self {
        Self::new(ErrorKind::InvalidEscape(seq.into()))
    }

    /// Creates an invalid decimal error for the named element.
    pub fn invalid_decimal<S: Into<String>>(element: S, text: S) -> Self {
        Self::new(ErrorKind::InvalidDecimal {
            element: element.into(),
            text: text.into(),
        })
    }

    /// Creates an invalid integer error for the named element.
    pub fn invalid_integer<S: Into<String>>(element: S, text: S) -> Self {
        Self::new(ErrorKind::InvalidInteger {
            element: element.into(),
            text: text.into(),
        })
    }

    /// Creates an invalid date error for the named element.
    pub fn invalid_date<S: Into<String>>(element: S, text: S) -> Self {
        Self::new(ErrorKind::InvalidDate {
            element: element.into(),
            text: text.into(),
        })
    }

    /// Creates an invalid date-time error for the named element.
    pub fn invalid_datetime<S: Into<String>>(element: S, text: S) -> Self {
        Self::new(ErrorKind::InvalidDateTime {
            element: element.into(),
            text: text.into(),
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnexpectedEof => write!(f, "unexpected end of input"),
            ErrorKind::Syntax(msg) => write!(f, "syntax error: {}", msg),
            ErrorKind::InvalidName(name) => write!(f, "invalid XML name: {}", name),
            ErrorKind::UnclosedTag(tag) => write!(f, "unclosed tag: <{}>", tag),
            ErrorKind::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{}>, found </{}>", expected, found)
            }
            ErrorKind::InvalidEscape(seq) => write!(f, "invalid escape sequence: {}", seq),
            ErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8"),
            ErrorKind::EmptyDocument => write!(f, "document has no root element"),
            ErrorKind::InvalidDecimal { element, text } => {
                write!(f, "invalid decimal in <{}>: {:?}", element, text)
            }
            ErrorKind::InvalidInteger { element, text } => {
                write!(f, "invalid integer in <{}>: {:?}", element, text)
            }
            ErrorKind::InvalidDate { element, text } => {
                write!(f, "invalid date in <{}>: {:?}", element, text)
            }
            ErrorKind::InvalidDateTime { element, text } => {
                write!(f, "invalid datetime in <{}>: {:?}", element, text)
            }
            ErrorKind::DepthLimitExceeded(limit) => {
                write!(f, "element nesting exceeds maximum depth of {}", limit)
            }
            ErrorKind::InputTooLarge { size, limit } => {
                write!(f, "input of {} bytes exceeds limit of {} bytes", size, limit)
            }
        }?;

        if let Some(pos) = self.position {
            write!(f, " at line {}, column {} (offset {})", pos.line, pos.column, pos.offset)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::syntax("expected '>'");
        assert_eq!(err.to_string(), "syntax error: expected '>'");
    }

    #[test]
    fn test_error_with_position() {
        let err = Error::syntax("expected '>'")
            .with_position(Position { line: 5, column: 10, offset: 42 });
        assert_eq!(
            err.to_string(),
            "syntax error: expected '>' at line 5, column 10 (offset 42)"
        );
    }

    #[test]
    fn test_mismatched_tag_error() {
        let err = Error::mismatched_tag("foo", "bar");
        assert_eq!(
            err.to_string(),
            "mismatched closing tag: expected </foo>, found </bar>"
        );
        assert!(err.is_malformed_xml());
    }

    #[test]
    fn test_coercion_error_display() {
        let err = Error::invalid_integer("age", "abc");
        assert_eq!(err.to_string(), "invalid integer in <age>: \"abc\"");
        assert!(err.is_coercion());
        assert!(!err.is_malformed_xml());
    }

    #[test]
    fn test_categories() {
        assert_eq!(Error::new(ErrorKind::EmptyDocument).category(), ErrorCategory::MalformedXml);
        assert_eq!(Error::invalid_date("d", "x").category(), ErrorCategory::Coercion);
        assert_eq!(
            Error::new(ErrorKind::DepthLimitExceeded(4)).category(),
            ErrorCategory::Limit
        );
        assert_eq!(
            Error::new(ErrorKind::InputTooLarge { size: 10, limit: 5 }).to_string(),
            "input of 10 bytes exceeds limit of 5 bytes"
        );
    }
}
