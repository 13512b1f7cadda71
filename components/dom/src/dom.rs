use crate::error::{Error, Result};
use crate::name::Name;
use crate::reader::quick_xml::QuickXmlDomReader;
use crate::reader::DomReader;

/// Stable handle of a node inside its [`Document`]
///
/// Ids are only meaningful for the document that created them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: Name,
    value: String,
}

impl Attribute {
    pub fn new(name: Name, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    name: Name,
    attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            attributes: vec![],
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Attributes in document order, namespace declarations included
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Value of the attribute with the given expanded name
    pub fn attribute(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.is(namespace, local))
            .map(Attribute::value)
    }

    fn set_attribute(&mut self, attribute: Attribute) {
        let existing = self.attributes.iter_mut().find(|attr| {
            attr.name
                .is(attribute.name.namespace(), attribute.name.local_name())
        });
        match existing {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// XML tree owning all of its nodes
#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_str(input: &str) -> Result<Self> {
        QuickXmlDomReader::from_str(input).parse()
    }

    // navigation

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// # Panics
    ///
    /// If `id` was not created by this document.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.is_element(*child))
    }

    /// Content of a text or CDATA node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) | NodeKind::CData(text) => Some(text),
            _ => None,
        }
    }

    // building

    /// Append an element to `parent` or make it the root element
    pub fn append_element(&mut self, parent: Option<NodeId>, name: Name) -> Result<NodeId> {
        match parent {
            Some(parent) => self.append(parent, NodeKind::Element(Element::new(name))),
            None if self.root.is_some() => Err(Error::SecondRootElement),
            None => {
                let id = self.push(None, NodeKind::Element(Element::new(name)));
                self.root = Some(id);
                Ok(id)
            }
        }
    }

    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId> {
        let text = text.into();
        // merge adjacent character data like a normalized DOM
        if let Some(&last) = self.children(parent).last() {
            if let NodeKind::Text(existing) = &mut self.nodes[last.0].kind {
                existing.push_str(&text);
                return Ok(last);
            }
        }
        self.append(parent, NodeKind::Text(text))
    }

    pub fn append_cdata(&mut self, parent: NodeId, data: impl Into<String>) -> Result<NodeId> {
        self.append(parent, NodeKind::CData(data.into()))
    }

    pub fn append_comment(&mut self, parent: NodeId, comment: impl Into<String>) -> Result<NodeId> {
        self.append(parent, NodeKind::Comment(comment.into()))
    }

    /// Set an attribute, replacing one with the same expanded name
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        name: Name,
        value: impl Into<String>,
    ) -> Result<()> {
        match &mut self.nodes[element.0].kind {
            NodeKind::Element(target) => {
                target.set_attribute(Attribute::new(name, value));
                Ok(())
            }
            _ => Err(Error::NotAnElement(element)),
        }
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId> {
        if !self.is_element(parent) {
            return Err(Error::NotAnElement(parent));
        }
        let id = self.push(Some(parent), kind);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: vec![],
        });
        id
    }
}
