use std::str::from_utf8;

use quick_xml::events::{BytesStart, Event};

use crate::chars::XmlStrExt;
use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::name::split_qname;
use crate::reader::scope::NamespaceScopes;
use crate::reader::DomReader;

/// Builds a [`Document`] from `quick-xml` events
///
/// Element and attribute names are resolved against the namespace
/// declarations in scope while reading. Declarations, doctypes and processing
/// instructions are skipped, as are whitespace and comments outside of the
/// root element.
pub struct QuickXmlDomReader<'r> {
    reader: quick_xml::Reader<&'r [u8]>,
    scopes: NamespaceScopes,
    document: Document,
    stack: Vec<NodeId>,
}

impl<'r> QuickXmlDomReader<'r> {
    pub fn from_str(input: &'r str) -> Self {
        Self {
            reader: quick_xml::Reader::from_str(input),
            scopes: NamespaceScopes::new(),
            document: Document::new(),
            stack: Vec::with_capacity(16),
        }
    }

    fn start_element(&mut self, start: &BytesStart) -> Result<NodeId> {
        let mut attributes: Vec<(String, String)> = vec![];

        let mut scope = self.scopes.build_scope();
        for attr in start.attributes() {
            let attr = attr?;
            let key = from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            match split_qname(&key)? {
                (Some("xmlns"), prefix) => scope.declare(Some(prefix), &value)?,
                (None, "xmlns") => scope.declare(None, &value)?,
                _ => {}
            }
            attributes.push((key, value));
        }
        scope.finish();

        let qname = start.name();
        let tag = from_utf8(qname.as_ref())?;
        let name = self.scopes.resolve_element(tag)?;
        let element = self
            .document
            .append_element(self.stack.last().copied(), name)?;

        for (key, value) in attributes {
            let name = self.scopes.resolve_attribute(&key)?;
            let duplicate = self
                .document
                .element(element)
                .and_then(|e| e.attribute(name.namespace(), name.local_name()))
                .is_some();
            if duplicate {
                return Err(Error::NonUniqueAttribute(match name.namespace() {
                    Some(namespace) => format!("{{{}}}{}", namespace, name.local_name()),
                    None => name.local_name().to_string(),
                }));
            }
            self.document.set_attribute(element, name, value)?;
        }

        Ok(element)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        match self.stack.last() {
            Some(&parent) => {
                if !text.is_empty() {
                    self.document.append_text(parent, text)?;
                }
                Ok(())
            }
            None if text.only_xml_whitespace() => Ok(()),
            None => Err(Error::ContentOutsideRoot),
        }
    }
}

impl<'r> DomReader for QuickXmlDomReader<'r> {
    type Error = Error;

    fn parse(mut self) -> Result<Document> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    let element = self.start_element(&start)?;
                    self.stack.push(element);
                }
                Event::Empty(start) => {
                    self.start_element(&start)?;
                    self.scopes.pop_scope();
                }
                Event::End(_) => {
                    self.stack.pop();
                    self.scopes.pop_scope();
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    self.characters(&text)?;
                }
                Event::CData(cdata) => {
                    let data = from_utf8(&cdata)?;
                    match self.stack.last() {
                        Some(&parent) => {
                            self.document.append_cdata(parent, data)?;
                        }
                        None => return Err(Error::ContentOutsideRoot),
                    }
                }
                Event::Comment(comment) => {
                    if let Some(&parent) = self.stack.last() {
                        self.document.append_comment(parent, from_utf8(&comment)?)?;
                    }
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(&open) = self.stack.last() {
            let name = match self.document.element(open) {
                Some(element) => element.name().to_string(),
                None => format!("{:?}", open),
            };
            return Err(Error::UnclosedElement(name));
        }
        if self.document.root().is_none() {
            return Err(Error::NoRootElement);
        }
        Ok(self.document)
    }
}
