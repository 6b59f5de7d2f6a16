//! Content-parser capability.
//!
//! A surrounding content-negotiation layer selects a [`ContentParser`] by
//! MIME type and hands it the response body.

use crate::error::Result;
use crate::value::Value;
use crate::Parser;

/// Something that turns a textual payload into a [`Value`].
pub trait ContentParser {
    /// MIME types this parser accepts.
    fn mime_types(&self) -> &'static [&'static str];

    /// Parses `text` into a value tree.
    fn parse(&self, text: &str) -> Result<Value>;

    /// Returns true if `mime_type` (parameters such as `charset` ignored) is accepted.
    fn accepts(&self, mime_type: &str) -> bool {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        self.mime_types()
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(essence))
    }
}

/// [`ContentParser`] for ActiveResource-style XML payloads.
#[derive(Debug, Clone, Default)]
pub struct ActiveResourceXmlParser {
    parser: Parser,
}

impl ActiveResourceXmlParser {
    /// MIME types handled by this parser.
    pub const MIME_TYPES: &'static [&'static str] = &["application/xml", "text/xml"];

    /// Creates a content parser around the given [`Parser`].
    pub fn new(parser: Parser) -> Self {
        Self { parser }
    }
}

impl ContentParser for ActiveResourceXmlParser {
    fn mime_types(&self) -> &'static [&'static str] {
        Self::MIME_TYPES
    }

    fn parse(&self, text: &str) -> Result<Value> {
        self.parser.parse(text).map(Value::Dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParserConfig;

    #[test]
    fn test_accepts() {
        let parser = ActiveResourceXmlParser::default();
        assert!(parser.accepts("application/xml"));
        assert!(parser.accepts("Text/XML; charset=utf-8"));
        assert!(!parser.accepts("application/json"));
        assert!(!parser.accepts(""));
    }

    #[test]
    fn test_parse_returns_dictionary() {
        let parser = ActiveResourceXmlParser::default();
        let value = parser
            .parse(r#"<user><id type="integer">7</id></user>"#)
            .unwrap();
        assert!(value.is_dictionary());
        assert_eq!(value.get("id"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_as_trait_object() {
        let config = ParserConfig::default().undasherize_keys(true);
        let parsers: Vec<Box<dyn ContentParser>> = vec![Box::new(ActiveResourceXmlParser::new(
            Parser::with_config(config),
        ))];

        let chosen = parsers
            .iter()
            .find(|p| p.accepts("application/xml"))
            .unwrap();
        let value = chosen.parse("<user><first-name>Ann</first-name></user>").unwrap();
        assert_eq!(value.get("first_name").and_then(Value::as_str), Some("Ann"));
    }
}
