//! Low-level XML tokenizer.
//!
//! A zero-copy pull reader that produces element, text and CDATA events.
//! Declarations, comments, processing instructions and DOCTYPE blocks carry
//! nothing the value tree needs, so they are consumed without producing
//! events.

use crate::error::{Error, ErrorKind, Position, Result};
use crate::escape::unescape;
use memchr::{memchr, memchr2, memchr_iter, memmem, memrchr};
use std::borrow::Cow;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Whitespace lookup table for fast checking.
static IS_WHITESPACE: [bool; 256] = {
    let mut lut = [false; 256];
    lut[b' ' as usize] = true;
    lut[b'\t' as usize] = true;
    lut[b'\n' as usize] = true;
    lut[b'\r' as usize] = true;
    lut
};

/// Name start character lookup table.
static IS_NAME_START: [bool; 256] = {
    let mut lut = [false; 256];
    let mut i = b'A';
    while i <= b'Z' {
        lut[i as usize] = true;
        i += 1;
    }
    let mut i = b'a';
    while i <= b'z' {
        lut[i as usize] = true;
        i += 1;
    }
    lut[b'_' as usize] = true;
    lut[b':' as usize] = true;
    // Allow high bytes for UTF-8
    let mut i: usize = 0x80;
    while i < 256 {
        lut[i] = true;
        i += 1;
    }
    lut
};

/// Name character lookup table.
static IS_NAME_CHAR: [bool; 256] = {
    let mut lut = IS_NAME_START;
    let mut i = b'0';
    while i <= b'9' {
        lut[i as usize] = true;
        i += 1;
    }
    lut[b'-' as usize] = true;
    lut[b'.' as usize] = true;
    lut
};

/// An XML event produced by the reader.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent<'a> {
    /// Start of an element: `<name attr="value">`
    StartElement {
        /// Element name.
        name: &'a str,
        /// Element attributes.
        attributes: Vec<Attribute<'a>>,
    },
    /// Self-closing element: `<name attr="value"/>`
    EmptyElement {
        /// Element name.
        name: &'a str,
        /// Element attributes.
        attributes: Vec<Attribute<'a>>,
    },
    /// End of an element: `</name>`
    EndElement {
        /// Element name.
        name: &'a str,
    },
    /// Character data between tags, entity-decoded but not trimmed.
    Text(Cow<'a, str>),
    /// CDATA section contents, verbatim.
    CData(&'a str),
    /// End of document.
    Eof,
}

/// An XML attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'a> {
    /// The attribute name.
    pub name: &'a str,
    /// The attribute value.
    pub value: Cow<'a, str>,
}

/// A fast, zero-copy XML reader.
pub struct XmlReader<'a> {
    input: &'a [u8],
    pos: usize,
    /// Stack of open element names for validation.
    element_stack: Vec<&'a str>,
}

impl<'a> XmlReader<'a> {
    /// Creates a new XML reader from a string.
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &'a str) -> Self {
        // A leading byte-order mark is skipped; positions stay relative to `s`.
        let pos = if s.starts_with(BYTE_ORDER_MARK) {
            BYTE_ORDER_MARK.len_utf8()
        } else {
            0
        };
        Self {
            input: s.as_bytes(),
            pos,
            element_stack: Vec::with_capacity(8),
        }
    }

    /// Returns the current position in the input.
    pub fn position(&self) -> Position {
        self.position_at(self.pos)
    }

    /// Computes line and column for a byte offset.
    fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.input.len());
        let consumed = &self.input[..offset];
        let line = memchr_iter(b'\n', consumed).count() + 1;
        let line_start = memrchr(b'\n', consumed).map_or(0, |nl| nl + 1);
        Position {
            line,
            column: offset - line_start + 1,
            offset,
        }
    }

    /// Reads the next XML event.
    pub fn next_event(&mut self) -> Result<XmlEvent<'a>> {
        loop {
            if self.pos >= self.input.len() {
                if let Some(tag) = self.element_stack.pop() {
                    return Err(Error::unclosed_tag(tag).with_position(self.position()));
                }
                return Ok(XmlEvent::Eof);
            }

            if self.input[self.pos] != b'<' {
                return self.read_text();
            }

            match self.input.get(self.pos + 1) {
                None => return Err(self.error(Error::unexpected_eof())),
                Some(b'/') => return self.read_end_element(),
                Some(b'?') => self.skip_processing_instruction()?,
                Some(b'!') => {
                    if let Some(event) = self.read_markup_declaration()? {
                        return Ok(event);
                    }
                }
                Some(_) => return self.read_start_element(),
            }
        }
    }

    #[inline]
    fn error(&self, err: Error) -> Error {
        err.with_position(self.position())
    }

    #[inline(always)]
    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && IS_WHITESPACE[self.input[self.pos] as usize] {
            self.pos += 1;
        }
    }

    /// Returns true if the remaining input starts with `prefix`.
    #[inline]
    fn at(&self, prefix: &[u8]) -> bool {
        self.input[self.pos..].starts_with(prefix)
    }

    fn str_slice(&self, start: usize, end: usize) -> Result<&'a str> {
        let input = self.input;
        std::str::from_utf8(&input[start..end]).map_err(|_| Error::new(ErrorKind::InvalidUtf8))
    }

    /// Reads character data up to the next '<'.
    fn read_text(&mut self) -> Result<XmlEvent<'a>> {
        let start = self.pos;
        self.pos = match memchr(b'<', &self.input[start..]) {
            Some(offset) => start + offset,
            None => self.input.len(),
        };

        let text = self.str_slice(start, self.pos)?;
        unescape(text).map(XmlEvent::Text).map_err(|e| {
            Error::invalid_escape(e.entity).with_position(self.position_at(start + e.position))
        })
    }

    /// Reads a start element or self-closing element.
    fn read_start_element(&mut self) -> Result<XmlEvent<'a>> {
        self.pos += 1;
        let name = self.read_name()?;
        let attributes = self.read_attributes()?;
        self.skip_whitespace();

        match self.input.get(self.pos) {
            Some(b'/') => {
                self.pos += 1;
                self.expect_byte(b'>')?;
                Ok(XmlEvent::EmptyElement { name, attributes })
            }
            Some(b'>') => {
                self.pos += 1;
                self.element_stack.push(name);
                Ok(XmlEvent::StartElement { name, attributes })
            }
            Some(_) => Err(self.error(Error::syntax("expected '>' or '/>'"))),
            None => Err(self.error(Error::unexpected_eof())),
        }
    }

    /// Reads an end element and checks it against the open element.
    fn read_end_element(&mut self) -> Result<XmlEvent<'a>> {
        self.pos += 2;
        let name = self.read_name()?;
        self.skip_whitespace();
        self.expect_byte(b'>')?;

        match self.element_stack.pop() {
            Some(expected) if expected == name => Ok(XmlEvent::EndElement { name }),
            Some(expected) => Err(self.error(Error::mismatched_tag(expected, name))),
            None => Err(self.error(Error::syntax(format!("unexpected closing tag: {}", name)))),
        }
    }

    /// Skips an XML declaration or processing instruction.
    fn skip_processing_instruction(&mut self) -> Result<()> {
        self.pos += 2;
        match memmem::find(&self.input[self.pos..], b"?>") {
            Some(offset) => {
                self.pos += offset + 2;
                Ok(())
            }
            None => Err(self.error(Error::syntax("unterminated processing instruction"))),
        }
    }

    /// Handles `<!`: comments and DOCTYPE are skipped, CDATA produces an event.
    fn read_markup_declaration(&mut self) -> Result<Option<XmlEvent<'a>>> {
        if self.at(b"<!--") {
            self.pos += 4;
            return match memmem::find(&self.input[self.pos..], b"-->") {
                Some(offset) => {
                    self.pos += offset + 3;
                    Ok(None)
                }
                None => Err(self.error(Error::syntax("unterminated comment"))),
            };
        }

        if self.at(b"<![CDATA[") {
            self.pos += 9;
            let start = self.pos;
            return match memmem::find(&self.input[start..], b"]]>") {
                Some(offset) => {
                    let data = self.str_slice(start, start + offset)?;
                    self.pos = start + offset + 3;
                    Ok(Some(XmlEvent::CData(data)))
                }
                None => Err(self.error(Error::syntax("unterminated CDATA section"))),
            };
        }

        if self.at(b"<!DOCTYPE") {
            self.skip_doctype()?;
            return Ok(None);
        }

        Err(self.error(Error::syntax("unknown construct after '<!'")))
    }

    /// Skips a DOCTYPE declaration, including any internal subset.
    fn skip_doctype(&mut self) -> Result<()> {
        self.pos += 2;
        let mut depth = 1usize;

        while depth > 0 {
            match memchr2(b'<', b'>', &self.input[self.pos..]) {
                Some(offset) => {
                    self.pos += offset;
                    if self.input[self.pos] == b'<' {
                        depth += 1;
                    } else {
                        depth -= 1;
                    }
                    self.pos += 1;
                }
                None => return Err(self.error(Error::syntax("unterminated DOCTYPE"))),
            }
        }

        Ok(())
    }

    /// Reads an XML name using the lookup tables.
    fn read_name(&mut self) -> Result<&'a str> {
        let start = self.pos;

        match self.input.get(self.pos) {
            None => return Err(self.error(Error::unexpected_eof())),
            Some(&first) if !IS_NAME_START[first as usize] => {
                return Err(self.error(Error::invalid_name(format!(
                    "invalid name start character: {:?}",
                    first as char
                ))));
            }
            Some(_) => self.pos += 1,
        }

        while self.pos < self.input.len() && IS_NAME_CHAR[self.input[self.pos] as usize] {
            self.pos += 1;
        }

        self.str_slice(start, self.pos)
    }

    /// Reads element attributes.
    fn read_attributes(&mut self) -> Result<Vec<Attribute<'a>>> {
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();

            match self.input.get(self.pos) {
                None | Some(b'>') | Some(b'/') => break,
                Some(_) => {}
            }

            let name = self.read_name()?;
            self.skip_whitespace();
            self.expect_byte(b'=')?;
            self.skip_whitespace();
            let value = self.read_attribute_value()?;

            if attributes.iter().any(|attr: &Attribute<'_>| attr.name == name) {
                return Err(self.error(Error::syntax(format!("duplicate attribute: {}", name))));
            }
            attributes.push(Attribute { name, value });
        }

        Ok(attributes)
    }

    /// Reads a quoted attribute value.
    fn read_attribute_value(&mut self) -> Result<Cow<'a, str>> {
        let quote = match self.input.get(self.pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            Some(_) => return Err(self.error(Error::syntax("expected quote"))),
            None => return Err(self.error(Error::unexpected_eof())),
        };
        self.pos += 1;
        let start = self.pos;

        let Some(offset) = memchr(quote, &self.input[start..]) else {
            return Err(self.error(Error::syntax("unterminated attribute value")));
        };

        let value = self.str_slice(start, start + offset)?;
        self.pos = start + offset + 1;

        unescape(value).map_err(|e| {
            Error::invalid_escape(e.entity).with_position(self.position_at(start + e.position))
        })
    }

    #[inline(always)]
    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.input.get(self.pos) {
            Some(&b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(&b) => Err(self.error(Error::syntax(format!(
                "expected '{}', found '{}'",
                expected as char, b as char
            )))),
            None => Err(self.error(Error::unexpected_eof())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(xml: &str) -> Vec<XmlEvent<'_>> {
        let mut reader = XmlReader::from_str(xml);
        let mut out = Vec::new();
        loop {
            match reader.next_event().unwrap() {
                XmlEvent::Eof => return out,
                event => out.push(event),
            }
        }
    }

    #[test]
    fn test_simple_element() {
        let mut reader = XmlReader::from_str("<root></root>");

        match reader.next_event().unwrap() {
            XmlEvent::StartElement { name, attributes } => {
                assert_eq!(name, "root");
                assert!(attributes.is_empty());
            }
            other => panic!("expected StartElement, got {:?}", other),
        }

        assert_eq!(reader.next_event().unwrap(), XmlEvent::EndElement { name: "root" });
        assert_eq!(reader.next_event().unwrap(), XmlEvent::Eof);
    }

    #[test]
    fn test_empty_element() {
        let evs = events("<root/>");
        assert_eq!(
            evs,
            vec![XmlEvent::EmptyElement { name: "root", attributes: vec![] }]
        );
    }

    #[test]
    fn test_attributes() {
        let mut reader = XmlReader::from_str(r#"<count type="integer" note='a &amp; b'/>"#);

        match reader.next_event().unwrap() {
            XmlEvent::EmptyElement { name, attributes } => {
                assert_eq!(name, "count");
                assert_eq!(attributes.len(), 2);
                assert_eq!(attributes[0].name, "type");
                assert_eq!(attributes[0].value, "integer");
                assert_eq!(attributes[1].name, "note");
                assert_eq!(attributes[1].value, "a & b");
            }
            other => panic!("expected EmptyElement, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_attribute() {
        let mut reader = XmlReader::from_str(r#"<a type="x" type="y"/>"#);
        assert!(reader.next_event().is_err());
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let evs = events("<root>  Hello &lt;World&gt; </root>");
        assert_eq!(evs[1], XmlEvent::Text(Cow::Borrowed("  Hello <World> ")));
    }

    #[test]
    fn test_prolog_and_comments_are_skipped() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE person [ <!ELEMENT person ANY> ]>
<!-- a comment -->
<person><?pi data?><name>Ann</name><!-- inner --></person>"#;
        let evs = events(xml);
        let starts: Vec<_> = evs
            .iter()
            .filter_map(|e| match e {
                XmlEvent::StartElement { name, .. } => Some(*name),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec!["person", "name"]);
        assert!(!evs.iter().any(|e| matches!(e, XmlEvent::Text(t) if t.contains("comment"))));
    }

    #[test]
    fn test_cdata() {
        let evs = events("<root><![CDATA[<special> & content]]></root>");
        assert_eq!(evs[1], XmlEvent::CData("<special> & content"));
    }

    #[test]
    fn test_mismatched_tags() {
        let mut reader = XmlReader::from_str("<root></wrong>");
        reader.next_event().unwrap();
        let err = reader.next_event().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MismatchedTag { .. }));
    }

    #[test]
    fn test_unclosed_tag() {
        let mut reader = XmlReader::from_str("<root>");
        reader.next_event().unwrap();
        let err = reader.next_event().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnclosedTag("root".to_string()));
    }

    #[test]
    fn test_unterminated_constructs() {
        for xml in ["<!-- never closed", "<![CDATA[ open", "<?pi", "<a b=\"open/>", "<"] {
            let mut reader = XmlReader::from_str(xml);
            assert!(reader.next_event().is_err(), "{} should fail", xml);
        }
    }

    #[test]
    fn test_invalid_entity_position() {
        let mut reader = XmlReader::from_str("<a>\n x &bogus;</a>");
        reader.next_event().unwrap();
        let err = reader.next_event().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEscape("&bogus;".to_string()));
        let pos = err.position().unwrap();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 4);
    }

    #[test]
    fn test_position_tracking() {
        let xml = "<root>\n  <child/>\n</root>";
        let mut reader = XmlReader::from_str(xml);

        reader.next_event().unwrap(); // <root>
        reader.next_event().unwrap(); // "\n  "
        reader.next_event().unwrap(); // <child/>

        let pos = reader.position();
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 11);
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let mut reader = XmlReader::from_str("\u{FEFF}<a>x</a>");
        assert_eq!(
            reader.next_event().unwrap(),
            XmlEvent::StartElement { name: "a", attributes: vec![] }
        );
        assert_eq!(reader.position().offset, 6);

        // Only at the very start.
        let mut reader = XmlReader::from_str("<a>\u{FEFF}</a>");
        reader.next_event().unwrap();
        assert_eq!(reader.next_event().unwrap(), XmlEvent::Text("\u{FEFF}".into()));
    }
}
