//! XML rendering of dump trees.
//!
//! Elements are indented by two spaces per level. Elements with attributes put every
//! attribute on its own line, one level deeper than the element, and self-closing elements
//! end in ` />`:
//!
//! ```text
//! <array>
//!   <Value
//!     AsString="{System.Int32[]}"
//!     Type="System.Int32[]" />
//! </array>
//! ```

use std::borrow::Cow;

use quick_xml::{
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};

use crate::{
    dump::{DumpNode, NodeContent},
    Error, Result,
};

const INDENT: usize = 2;

/// Characters XML 1.0 cannot carry, not even as character references
fn is_illegal_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

fn needs_rewrite(c: char, attribute: bool) -> bool {
    c == '\r' || (attribute && matches!(c, '\t' | '\n')) || is_illegal_xml_char(c)
}

/// Escape markup characters and whitespace a parser would normalize.
///
/// In attribute values `\t`, `\n` and `\r` become character references; in text only `\r`
/// does. Illegal characters are written as `\uXXXX`.
fn escape_value(value: &str, attribute: bool) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.chars().any(|c| needs_rewrite(c, attribute)) {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\t' if attribute => out.push_str("&#x9;"),
            '\n' if attribute => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c if is_illegal_xml_char(c) => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Writes [`DumpNode`] trees as indented XML
pub struct XmlDumpWriter {
    writer: Writer<Vec<u8>>,
    depth: usize,
}

impl XmlDumpWriter {
    /// A writer without XML declaration
    #[must_use]
    pub fn new() -> Self {
        XmlDumpWriter {
            writer: Writer::new_with_indent(Vec::new(), b' ', INDENT),
            depth: 0,
        }
    }

    /// Write the `<?xml version="1.0" encoding="utf-8"?>` declaration
    ///
    /// # Errors
    /// Returns [`Error::Xml`] if writing fails.
    pub fn declaration(&mut self) -> Result<()> {
        self.event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|error| Error::Xml(error.to_string()))
    }

    fn start_tag<'a>(&self, node: &'a DumpNode, self_closing: bool) -> BytesStart<'a> {
        if node.attributes().is_empty() && !self_closing {
            return BytesStart::new(node.name());
        }

        let padding = " ".repeat((self.depth + 1) * INDENT);
        let mut content = String::from(node.name());
        for (name, value) in node.attributes() {
            content.push('\n');
            content.push_str(&padding);
            content.push_str(name);
            content.push_str("=\"");
            content.push_str(&escape_value(value, true));
            content.push('"');
        }
        if self_closing {
            content.push(' ');
        }

        BytesStart::from_content(Cow::Owned(content), node.name().len())
    }

    /// Write one node and its descendants
    ///
    /// # Errors
    /// Returns [`Error::Xml`] if writing fails.
    pub fn write_node(&mut self, node: &DumpNode) -> Result<()> {
        match node.content() {
            NodeContent::Empty => self.event(Event::Empty(self.start_tag(node, true))),
            NodeContent::Children(children) if children.is_empty() => {
                self.event(Event::Empty(self.start_tag(node, true)))
            }
            NodeContent::Text(text) => {
                self.event(Event::Start(self.start_tag(node, false)))?;
                self.event(Event::Text(BytesText::from_escaped(escape_value(text, false))))?;
                self.event(Event::End(BytesEnd::new(node.name())))
            }
            NodeContent::Children(children) => {
                self.event(Event::Start(self.start_tag(node, false)))?;
                self.depth += 1;
                for child in children {
                    self.write_node(child)?;
                }
                self.depth -= 1;
                self.event(Event::End(BytesEnd::new(node.name())))
            }
        }
    }

    /// The written document
    ///
    /// # Errors
    /// Returns [`Error::Xml`] if the output is not valid UTF-8.
    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner()).map_err(|error| Error::Xml(error.to_string()))
    }
}

impl Default for XmlDumpWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a single node tree without XML declaration
///
/// # Errors
/// Returns [`Error::Xml`] if writing fails.
pub fn to_xml(node: &DumpNode) -> Result<String> {
    let mut writer = XmlDumpWriter::new();
    writer.write_node(node)?;
    writer.into_string()
}
