//! Minimal in-memory element tree built from quick-xml events

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

use crate::error::{Error, Result};

/// Default bound on element nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// An element with its local name, direct text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name (namespace prefix stripped)
    pub name: String,
    /// Text appearing before the first child element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let qname = start.name();
        let qualified = std::str::from_utf8(qname.as_ref())
            .map_err(|e| Error::parse(format!("invalid element name: {}", e)))?;
        if !is_xml_name(qualified) {
            return Err(Error::parse(format!("invalid element name '{}'", qualified)));
        }

        // Attributes are not kept, but they must still be well formed
        for attribute in start.attributes().with_checks(true) {
            let attribute = attribute
                .map_err(|e| Error::parse(format!("bad attribute in <{}>: {}", qualified, e)))?;
            let key = std::str::from_utf8(attribute.key.as_ref())
                .map_err(|e| Error::parse(format!("invalid attribute name: {}", e)))?;
            if !is_xml_name(key) {
                return Err(Error::parse(format!("invalid attribute name '{}'", key)));
            }
            attribute
                .unescape_value()
                .map_err(|e| Error::parse(format!("bad value for attribute '{}': {}", key, e)))?;
        }

        let name = std::str::from_utf8(start.local_name().as_ref())
            .map_err(|e| Error::parse(format!("invalid element name: {}", e)))?
            .to_string();

        Ok(Self {
            name,
            ..Default::default()
        })
    }

    /// First direct child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name, in document order
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a path of child names, returning the element at its end
    pub fn find(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, segment| element.child(segment))
    }

    /// Text of the element at `path`, or an empty string when any segment is absent
    pub fn read_leaf(&self, path: &[&str]) -> String {
        self.find(path)
            .map(|element| element.text.clone())
            .unwrap_or_default()
    }
}

/// Parse a document into its root element
///
/// Malformed markup (mismatched or unclosed tags, bad entities, missing or
/// multiple roots, stray text outside the root) is reported as `Error::Parse`.
/// Nesting deeper than `max_depth` is reported as `Error::Extraction`.
pub fn parse_document(xml: &str, max_depth: usize) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::parse(format!("{} (at byte {})", e, reader.buffer_position()))
        })?;

        match event {
            Event::Start(start) => {
                ensure_single_root(&root)?;
                if stack.len() >= max_depth {
                    return Err(Error::extraction(format!(
                        "document nesting exceeds {} levels",
                        max_depth
                    )));
                }
                stack.push(XmlElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(&root)?;
                let element = XmlElement::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::parse("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                // Line ends are normalised before character references are expanded
                let raw = std::str::from_utf8(&text)
                    .map_err(|e| Error::parse(format!("invalid text: {}", e)))?;
                let raw = normalize_line_endings(raw);
                let text = unescape(&raw).map_err(|e| Error::parse(e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let text = std::str::from_utf8(&bytes)
                    .map_err(|e| Error::parse(format!("invalid CDATA: {}", e)))?;
                push_text(&mut stack, &normalize_line_endings(text))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::parse(format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| Error::parse("no element found"))
}

/// Replace `\r\n` and lone `\r` with `\n`
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// `Name` production of XML 1.0 (fifth edition)
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

fn ensure_single_root(root: &Option<XmlElement>) -> Result<()> {
    if root.is_some() {
        return Err(Error::parse("junk after document element"));
    }
    Ok(())
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) -> Result<()> {
    match stack.last_mut() {
        // Only text before the first child counts as the element's own text
        Some(element) if element.children.is_empty() => {
            element.text.push_str(text);
            Ok(())
        }
        Some(_) => Ok(()),
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::parse("text outside of document element")),
    }
}
