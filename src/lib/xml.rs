// SPDX-License-Identifier: Apache-2.0

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::{ErrorKind, NetconfError};

/// Owned XML element tree.
///
/// This is the document model every NETCONF payload is built from and
/// every reply is parsed into. Attribute and child order is preserved;
/// namespaces are carried as plain `xmlns` attributes and prefixed names
/// are kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn new_with_text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Character data directly under this element, in document order,
    /// excluding text of child elements.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(attr) =
            self.attributes.iter_mut().find(|(n, _)| n == name)
        {
            attr.1 = value.to_string();
        } else {
            self.attributes.push((name.to_string(), value.to_string()));
        }
    }

    /// Appends `child` and returns a mutable reference to it so nested
    /// trees can be built without re-querying.
    pub fn add_child(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn children(&self) -> &[Element] {
        self.children.as_slice()
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// All direct children with the given name, in document order.
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child with the given name. `None` means
    /// the child is absent; an empty element yields `Some("")`, so callers
    /// can tell "omitted" from "present but empty".
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Element::text)
    }

    /// First direct child with the given name, inserting an empty one if
    /// no such child exists yet.
    pub(crate) fn child_mut_or_insert(&mut self, name: &str) -> &mut Element {
        if let Some(pos) = self.children.iter().position(|c| c.name == name) {
            &mut self.children[pos]
        } else {
            self.add_child(Element::new(name))
        }
    }

    /// Serializes the tree to XML text without a leading declaration.
    pub fn to_xml(&self) -> Result<String, NetconfError> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| {
            NetconfError::new(
                ErrorKind::Bug,
                format!("serialized XML is not valid UTF-8: {e}"),
            )
        })
    }

    fn write(
        &self,
        writer: &mut Writer<Vec<u8>>,
    ) -> Result<(), NetconfError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.children.is_empty() && self.text.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(parse_write_error)?;
            return Ok(());
        }
        writer
            .write_event(Event::Start(start))
            .map_err(parse_write_error)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(self.text.as_str())))
                .map_err(parse_write_error)?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(parse_write_error)
    }

    /// Parses an XML document into an element tree. Leading declarations,
    /// comments and processing instructions are skipped; exactly one root
    /// element is required.
    pub fn parse(xml: &str) -> Result<Self, NetconfError> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        loop {
            match reader.read_event().map_err(parse_read_error)? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.push(element);
                        }
                        None if root.is_none() => root = Some(element),
                        None => {
                            return Err(parse_read_error(
                                "more than one root element",
                            ));
                        }
                    }
                }
                Event::End(_) => {
                    let mut element = match stack.pop() {
                        Some(e) => e,
                        None => {
                            return Err(parse_read_error(
                                "unbalanced closing tag",
                            ));
                        }
                    };
                    // Character data arrives in fragments split at entity
                    // references; trim the assembled text once, so interior
                    // whitespace next to an entity survives while indentation
                    // around child elements does not.
                    element.text = element.text.trim().to_string();
                    match stack.last_mut() {
                        Some(parent) => {
                            parent.children.push(element);
                        }
                        None if root.is_none() => root = Some(element),
                        None => {
                            return Err(parse_read_error(
                                "more than one root element",
                            ));
                        }
                    }
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .text
                            .push_str(&text.decode().map_err(parse_read_error)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Event::GeneralRef(entity) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push(resolve_entity(
                            &String::from_utf8_lossy(&entity),
                        )?);
                    }
                }
                Event::Eof => break,
                // Declarations, comments and processing instructions carry
                // no configuration data.
                _ => (),
            }
        }
        if !stack.is_empty() {
            return Err(parse_read_error("unclosed element"));
        }
        root.ok_or_else(|| parse_read_error("no root element"))
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element, NetconfError> {
    let mut element = Element::new(
        std::str::from_utf8(start.name().as_ref())
            .map_err(parse_read_error)?,
    );
    for attribute in start.attributes() {
        let attribute = attribute.map_err(parse_read_error)?;
        let name = std::str::from_utf8(attribute.key.as_ref())
            .map_err(parse_read_error)?
            .to_string();
        let value = attribute
            .unescape_value()
            .map_err(parse_read_error)?
            .to_string();
        element.attributes.push((name, value));
    }
    Ok(element)
}

// Entity name as it appears between `&` and `;`.
fn resolve_entity(name: &str) -> Result<char, NetconfError> {
    match name {
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "amp" => Ok('&'),
        "apos" => Ok('\''),
        "quot" => Ok('"'),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32).ok_or_else(|| {
                parse_read_error(format!("unknown entity reference '&{name};'"))
            })
        }
    }
}

fn parse_read_error(e: impl std::fmt::Display) -> NetconfError {
    NetconfError::new(
        ErrorKind::MalformedReply,
        format!("invalid XML: {e}"),
    )
}

fn parse_write_error(e: impl std::fmt::Display) -> NetconfError {
    NetconfError::new(
        ErrorKind::Bug,
        format!("failed to serialize XML: {e}"),
    )
}
