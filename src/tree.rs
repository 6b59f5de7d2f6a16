//! Owned element tree built from the tokenizer.
//!
//! The coercion engine only ever looks at an [`Element`]: its name, its
//! attributes, its child elements and its direct text content.

use crate::config::ParserConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::reader::{Attribute, XmlEvent, XmlReader};
use indexmap::IndexMap;

/// A parsed XML element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Creates an element with the given name and no content.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses `input` into the document's root element.
    pub fn parse(input: &str, config: &ParserConfig) -> Result<Self> {
        let mut reader = XmlReader::from_str(input);
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.next_event()?;

            if root.is_some() {
                match event {
                    XmlEvent::Eof => break,
                    XmlEvent::Text(ref text) if text.trim().is_empty() => continue,
                    _ => {
                        return Err(Error::syntax("content after the root element")
                            .with_position(reader.position()))
                    }
                }
            }

            match event {
                XmlEvent::StartElement { name, attributes } => {
                    if stack.len() >= config.max_depth {
                        return Err(Error::new(ErrorKind::DepthLimitExceeded(config.max_depth))
                            .with_position(reader.position()));
                    }
                    stack.push(OpenElement::new(Self::open(name, attributes)));
                }
                XmlEvent::EmptyElement { name, attributes } => {
                    if stack.len() >= config.max_depth {
                        return Err(Error::new(ErrorKind::DepthLimitExceeded(config.max_depth))
                            .with_position(reader.position()));
                    }
                    let element = Self::open(name, attributes);
                    match stack.last_mut() {
                        Some(parent) => parent.element.children.push(element),
                        None => root = Some(element),
                    }
                }
                XmlEvent::EndElement { .. } => {
                    // The reader has already matched the end tag against the open one.
                    let Some(open) = stack.pop() else {
                        return Err(Error::syntax("unbalanced end tag")
                            .with_position(reader.position()));
                    };
                    let element = open.close();
                    match stack.last_mut() {
                        Some(parent) => parent.element.children.push(element),
                        None => root = Some(element),
                    }
                }
                XmlEvent::Text(text) => match stack.last_mut() {
                    Some(parent) => parent.element.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(Error::syntax("text outside the root element")
                            .with_position(reader.position()))
                    }
                },
                XmlEvent::CData(data) => match stack.last_mut() {
                    Some(parent) => parent.push_cdata(data),
                    None => {
                        return Err(Error::syntax("CDATA outside the root element")
                            .with_position(reader.position()))
                    }
                },
                XmlEvent::Eof => break,
            }
        }

        root.ok_or_else(|| Error::new(ErrorKind::EmptyDocument).with_position(reader.position()))
    }

    fn open(name: &str, attributes: Vec<Attribute<'_>>) -> Self {
        Self {
            name: name.to_string(),
            attributes: attributes
                .into_iter()
                .map(|attr| (attr.name.to_string(), attr.value.into_owned()))
                .collect(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    /// Adds an attribute, replacing any previous value.
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Appends a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends direct text content.
    pub fn with_text<S: AsRef<str>>(mut self, text: S) -> Self {
        self.text.push_str(text.as_ref());
        self
    }

    /// The element's tag name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an attribute by name.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Child elements in document order.
    #[inline]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Returns true if the element contains at least one child element.
    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Direct text and CDATA content, concatenated in document order.
    ///
    /// Whitespace around the whole content is trimmed; CDATA sections are kept
    /// verbatim.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An element whose end tag has not been read yet.
struct OpenElement {
    element: Element,
    /// Byte range of `element.text` from the start of the first CDATA section
    /// to the end of the last one.
    cdata: Option<(usize, usize)>,
}

impl OpenElement {
    fn new(element: Element) -> Self {
        Self {
            element,
            cdata: None,
        }
    }

    fn push_cdata(&mut self, data: &str) {
        let start = self.element.text.len();
        self.element.text.push_str(data);
        let end = self.element.text.len();
        self.cdata = Some(match self.cdata {
            Some((first, _)) => (first, end),
            None => (start, end),
        });
    }

    /// Trims whitespace around the collected character data, leaving CDATA
    /// content untouched.
    fn close(self) -> Element {
        let mut element = self.element;
        let text = &element.text;
        let (start, end) = match self.cdata {
            Some((first, last)) => (
                first - text[..first].trim_start().len(),
                last + text[last..].trim_end().len(),
            ),
            None => {
                let start = text.len() - text.trim_start().len();
                (start, start + text[start..].trim_end().len())
            }
        };
        element.text.truncate(end);
        element.text.drain(..start);
        element
    }
}
