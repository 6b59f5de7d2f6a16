//! # activeresource_xml
//!
//! Parses XML written in the Rails ActiveResource convention into a
//! dynamically-typed value tree.
//!
//! ## Features
//!
//! - Coercion driven by the `type` attribute: `string`, `decimal`, `integer`,
//!   `date`, `datetime`, `boolean`, `array` and `dictionary`
//! - Untyped elements inferred from their shape: leaves become strings,
//!   elements with children become dictionaries
//! - Repeated sibling names folded into arrays instead of overwritten
//! - Fast, zero-copy tokenization using SIMD-accelerated string searching
//! - Error reporting with line/column positions
//!
//! ## Quick Start
//!
//! ```rust
//! use activeresource_xml::{parse, Value};
//!
//! let xml = r#"
//!     <person>
//!         <name>Alice</name>
//!         <age type="integer">30</age>
//!         <admin type="boolean">true</admin>
//!     </person>
//! "#;
//!
//! let person = parse(xml).unwrap();
//! assert_eq!(person["name"], Value::from("Alice"));
//! assert_eq!(person["age"], Value::Integer(30));
//! assert_eq!(person["admin"], Value::Boolean(true));
//! ```
//!
//! ## Arrays
//!
//! ```rust
//! use activeresource_xml::{parse, Value};
//!
//! let xml = r#"
//!     <order>
//!         <line-ids type="array">
//!             <line-id type="integer">1</line-id>
//!             <line-id type="integer">2</line-id>
//!         </line-ids>
//!         <note>fragile</note>
//!         <note>this side up</note>
//!     </order>
//! "#;
//!
//! let order = parse(xml).unwrap();
//! assert_eq!(
//!     order["line-ids"],
//!     Value::Array(vec![Value::Integer(1), Value::Integer(2)])
//! );
//! assert_eq!(
//!     order["note"],
//!     Value::Array(vec![Value::from("fragile"), Value::from("this side up")])
//! );
//! ```
//!
//! ## Errors
//!
//! ```rust
//! use activeresource_xml::{parse, ErrorKind};
//!
//! let err = parse(r#"<user><id type="integer">seven</id></user>"#).unwrap_err();
//! assert!(err.is_coercion());
//! assert!(matches!(err.kind(), ErrorKind::InvalidInteger { .. }));
//!
//! let err = parse("<user><id></user>").unwrap_err();
//! assert!(err.is_malformed_xml());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod coerce;
pub mod config;
pub mod content;
pub mod error;
pub mod escape;
pub mod reader;
pub mod temporal;
pub mod tree;
pub mod types;
pub mod value;

// Re-export main types and functions
pub use coerce::Coercer;
pub use config::ParserConfig;
pub use content::{ActiveResourceXmlParser, ContentParser};
pub use error::{Error, ErrorCategory, ErrorKind, Position, Result};
pub use tree::Element;
pub use types::ValueType;
pub use value::{Dictionary, Value};

use tracing::debug;

/// A reusable parser holding a [`ParserConfig`].
///
/// Parsers hold no state between calls and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Creates a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with the given configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the parser's configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses an XML document into a dictionary.
    pub fn parse(&self, xml: &str) -> Result<Dictionary> {
        self.config.validate_input(xml.as_bytes())?;
        debug!(bytes = xml.len(), "parsing document");

        let root = Element::parse(xml, &self.config)?;
        let dictionary = Coercer::new(&self.config).coerce_root(&root)?;

        debug!(root = root.name(), keys = dictionary.len(), "parsed document");
        Ok(dictionary)
    }

    /// Parses UTF-8 encoded XML bytes into a dictionary.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Dictionary> {
        self.config.validate_input(bytes)?;
        let xml = std::str::from_utf8(bytes).map_err(|_| Error::new(ErrorKind::InvalidUtf8))?;
        self.parse(xml)
    }
}

/// Parses an XML document into a dictionary with the default configuration.
///
/// The root element's children become the dictionary's entries; the root's
/// own name, `type` attribute and text are not part of the result.
pub fn parse(xml: &str) -> Result<Dictionary> {
    Parser::new().parse(xml)
}

/// Parses an XML document into a dictionary with the given configuration.
pub fn parse_with_config(xml: &str, config: &ParserConfig) -> Result<Dictionary> {
    Parser::with_config(config.clone()).parse(xml)
}

/// Parses UTF-8 encoded XML bytes into a dictionary.
pub fn from_bytes(bytes: &[u8]) -> Result<Dictionary> {
    Parser::new().parse_bytes(bytes)
}
