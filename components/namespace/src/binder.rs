use std::collections::HashMap;

use xns_dom::{Document, Name, NodeId, XMLNS_NS_URI, XML_NS_URI};

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::options::BinderOptions;

#[derive(Clone, Debug)]
struct Declaration {
    uri: String,
    prefix: Option<String>,
}

/// Builds an output document, choosing prefixes for the namespaces used
///
/// The first namespace used by an element takes the default slot, every
/// other one gets a prefix made of the configured stem and a counter
/// (`ns1`, `ns2`, ...). The declarations are written onto the root element
/// by [`finalize`](Self::finalize), in registration order.
///
/// Once an element without namespace exists, the default slot stays
/// unbound until it is taken, after that such elements undeclare it.
///
/// The XML namespace always uses its predeclared `xml` prefix. Names in the
/// `xmlns` namespace are rejected.
#[derive(Debug)]
pub struct OutputBinder {
    document: Document,
    declarations: Vec<Declaration>,
    element_prefixes: HashMap<String, Option<String>>,
    attribute_prefixes: HashMap<String, String>,
    counter: usize,
    unqualified_used: bool,
    options: BinderOptions,
}

impl OutputBinder {
    pub fn new() -> Self {
        Self::with_options(BinderOptions::default())
    }

    pub fn with_options(options: BinderOptions) -> Self {
        Self {
            document: Document::new(),
            declarations: vec![],
            element_prefixes: HashMap::new(),
            attribute_prefixes: HashMap::new(),
            counter: 0,
            unqualified_used: false,
            options,
        }
    }

    /// Create an element named `local` in `namespace` below `parent`
    ///
    /// Without a parent the element is appended to the root element, or
    /// becomes the root element of a still empty document. The absent
    /// namespace is treated like no namespace.
    pub fn create_child(
        &mut self,
        local: &str,
        namespace: Option<&Namespace>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let name = match namespace.and_then(Namespace::uri) {
            Some(uri) => match predeclared_prefix(uri, local)? {
                Some(prefix) => Name::new(Some(uri), Some(prefix), local),
                None => {
                    let prefix = self.element_prefix(uri);
                    Name::new(Some(uri), prefix.as_deref(), local)
                }
            },
            None => Name::unqualified(local),
        };
        let unqualified = name.namespace().is_none();

        let parent = parent.or_else(|| self.document.root());
        let element = self.document.append_element(parent, name)?;
        if unqualified {
            self.unqualified_used = true;
            if self.has_default() {
                self.document.set_attribute(
                    element,
                    Name::new(Some(XMLNS_NS_URI), None, "xmlns"),
                    "",
                )?;
            }
        }
        Ok(element)
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        Ok(self.document.append_text(parent, text)?)
    }

    /// Set an attribute on an element created by this binder
    ///
    /// Namespaced attributes always get a prefix, even when their namespace
    /// holds the default slot.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        local: &str,
        namespace: Option<&Namespace>,
        value: &str,
    ) -> Result<()> {
        let name = match namespace.and_then(Namespace::uri) {
            Some(uri) => match predeclared_prefix(uri, local)? {
                Some(prefix) => Name::new(Some(uri), Some(prefix), local),
                None => {
                    let prefix = self.attribute_prefix(uri);
                    Name::new(Some(uri), Some(prefix.as_str()), local)
                }
            },
            None => Name::unqualified(local),
        };
        Ok(self.document.set_attribute(element, name, value)?)
    }

    /// Prefix chosen for `uri`
    ///
    /// `None` for unused namespaces, `Some(None)` for the default namespace.
    pub fn prefix_for(&self, uri: &str) -> Option<Option<&str>> {
        self.element_prefixes.get(uri).map(Option::as_deref)
    }

    /// `(uri, prefix)` pairs in registration order
    pub fn declarations(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.declarations
            .iter()
            .map(|decl| (decl.uri.as_str(), decl.prefix.as_deref()))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Declare all used namespaces on the root element
    ///
    /// Calling it again rewrites the same declarations. Without a root
    /// element there is nothing to declare.
    pub fn finalize(&mut self) -> Result<&Document> {
        let root = match self.document.root() {
            Some(root) => root,
            None => return Ok(&self.document),
        };

        for decl in &self.declarations {
            let name = match &decl.prefix {
                Some(prefix) => Name::new(Some(XMLNS_NS_URI), Some("xmlns"), prefix),
                None => Name::new(Some(XMLNS_NS_URI), None, "xmlns"),
            };
            self.document.set_attribute(root, name, decl.uri.as_str())?;
        }
        Ok(&self.document)
    }

    pub fn into_document(mut self) -> Result<Document> {
        self.finalize()?;
        Ok(self.document)
    }

    fn element_prefix(&mut self, uri: &str) -> Option<String> {
        if let Some(prefix) = self.element_prefixes.get(uri) {
            return prefix.clone();
        }

        let prefix = match self.attribute_prefixes.get(uri) {
            // declared for an attribute already
            Some(prefix) => Some(prefix.clone()),
            None => {
                let prefix = if self.default_available(uri) {
                    None
                } else {
                    Some(self.next_prefix())
                };
                self.declare(uri, prefix.clone());
                prefix
            }
        };
        self.element_prefixes.insert(uri.to_string(), prefix.clone());
        prefix
    }

    fn attribute_prefix(&mut self, uri: &str) -> String {
        if let Some(prefix) = self.attribute_prefixes.get(uri) {
            return prefix.clone();
        }

        let prefix = match self.element_prefixes.get(uri) {
            Some(Some(prefix)) => prefix.clone(),
            _ => {
                let prefix = self.next_prefix();
                self.declare(uri, Some(prefix.clone()));
                self.element_prefixes
                    .entry(uri.to_string())
                    .or_insert_with(|| Some(prefix.clone()));
                prefix
            }
        };
        self.attribute_prefixes.insert(uri.to_string(), prefix.clone());
        prefix
    }

    fn has_default(&self) -> bool {
        self.declarations.iter().any(|decl| decl.prefix.is_none())
    }

    fn default_available(&self, uri: &str) -> bool {
        let reserved = match &self.options.default_namespace {
            Some(reserved) => reserved == uri,
            None => true,
        };
        reserved && !self.unqualified_used && !self.has_default()
    }

    fn next_prefix(&mut self) -> String {
        self.counter += 1;
        format!("{}{}", self.options.prefix_stem, self.counter)
    }

    fn declare(&mut self, uri: &str, prefix: Option<String>) {
        log::debug!(
            "binding {} to {}",
            prefix.as_deref().unwrap_or("default namespace"),
            uri
        );
        self.declarations.push(Declaration {
            uri: uri.to_string(),
            prefix,
        });
    }
}

/// Prefix of namespaces that must not be declared
fn predeclared_prefix(uri: &str, local: &str) -> Result<Option<&'static str>> {
    match uri {
        XML_NS_URI => Ok(Some("xml")),
        XMLNS_NS_URI => Err(Error::ReservedNamespace {
            local: local.to_string(),
            uri: uri.to_string(),
        }),
        _ => Ok(None),
    }
}

impl Default for OutputBinder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::namespace::NamespaceRegistry;

    #[test]
    fn first_namespace_is_default() {
        let mut registry = NamespaceRegistry::new();
        let a = registry.namespace_for_uri("urn:a");
        let b = registry.namespace_for_uri("urn:b");

        let mut binder = OutputBinder::new();
        let root = binder.create_child("r", Some(&a), None).unwrap();
        binder.create_child("c", Some(&b), Some(root)).unwrap();
        binder.create_child("d", Some(&a), None).unwrap();

        assert_eq!(Some(None), binder.prefix_for("urn:a"));
        assert_eq!(Some(Some("ns1")), binder.prefix_for("urn:b"));
        assert_eq!(None, binder.prefix_for("urn:c"));
        assert_eq!(
            r#"<r xmlns="urn:a" xmlns:ns1="urn:b"><ns1:c/><d/></r>"#,
            binder.into_document().unwrap().to_xml_string().unwrap()
        );
    }

    #[test]
    fn no_namespace() {
        let registry = NamespaceRegistry::new();
        let mut binder = OutputBinder::new();
        let root = binder.create_child("r", None, None).unwrap();
        binder
            .create_child("c", Some(&registry.absent_namespace()), Some(root))
            .unwrap();

        assert_eq!(0, binder.declarations().count());
        assert_eq!(
            "<r><c/></r>",
            binder.into_document().unwrap().to_xml_string().unwrap()
        );
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut registry = NamespaceRegistry::new();
        let a = registry.namespace_for_uri("urn:a");

        let mut binder = OutputBinder::new();
        binder.create_child("r", Some(&a), None).unwrap();
        let first = binder.finalize().unwrap().to_xml_string().unwrap();
        let second = binder.finalize().unwrap().to_xml_string().unwrap();
        assert_eq!(first, second);
        assert_eq!(r#"<r xmlns="urn:a"/>"#, second);
    }

    #[test]
    fn finalize_without_root() {
        let mut binder = OutputBinder::new();
        assert!(binder.finalize().unwrap().root().is_none());
    }

    #[test]
    fn attribute_prefixes() {
        let mut registry = NamespaceRegistry::new();
        let a = registry.namespace_for_uri("urn:a");
        let b = registry.namespace_for_uri("urn:b");

        let mut binder = OutputBinder::new();
        let root = binder.create_child("r", Some(&a), None).unwrap();
        binder.set_attribute(root, "x", Some(&a), "1").unwrap();
        binder.set_attribute(root, "y", None, "2").unwrap();
        binder.set_attribute(root, "z", Some(&b), "3").unwrap();
        binder.create_child("c", Some(&b), Some(root)).unwrap();

        assert_eq!(
            vec![
                ("urn:a", None),
                ("urn:a", Some("ns1")),
                ("urn:b", Some("ns2"))
            ],
            binder.declarations().collect::<Vec<_>>()
        );
        assert_eq!(
            r#"<r ns1:x="1" y="2" ns2:z="3" xmlns="urn:a" xmlns:ns1="urn:a" xmlns:ns2="urn:b"><ns2:c/></r>"#,
            binder.into_document().unwrap().to_xml_string().unwrap()
        );
    }

    #[test]
    fn xml_namespace_is_predeclared() {
        let mut registry = NamespaceRegistry::new();
        let x = registry.namespace_for_uri("urn:x");
        let xml = registry.resolve(XML_NS_URI, false).unwrap();

        let mut binder = OutputBinder::new();
        let root = binder.create_child("r", Some(&xml), None).unwrap();
        binder.set_attribute(root, "lang", Some(&xml), "en").unwrap();
        binder.create_child("c", Some(&x), Some(root)).unwrap();

        assert_eq!(None, binder.prefix_for(XML_NS_URI));
        assert_eq!(Some(None), binder.prefix_for("urn:x"));
        let output = binder.into_document().unwrap().to_xml_string().unwrap();
        assert_eq!(r#"<xml:r xml:lang="en" xmlns="urn:x"><c/></xml:r>"#, output);

        let reparsed = Document::parse_str(&output).unwrap();
        let root = reparsed.root().unwrap();
        assert_eq!(
            Some("en"),
            reparsed.element(root).unwrap().attribute(Some(XML_NS_URI), "lang")
        );
    }

    #[test]
    fn xmlns_namespace_is_rejected() {
        let registry = NamespaceRegistry::new();
        let xmlns = registry.get(XMLNS_NS_URI).unwrap();

        let mut binder = OutputBinder::new();
        assert_matches!(
            binder.create_child("r", Some(&xmlns), None),
            Err(Error::ReservedNamespace { .. })
        );
        let root = binder.create_child("r", None, None).unwrap();
        assert_matches!(
            binder.set_attribute(root, "p", Some(&xmlns), "urn:p"),
            Err(Error::ReservedNamespace { ref local, .. }) if local == "p"
        );
        assert_eq!(0, binder.declarations().count());
    }

    #[test]
    fn text_parent() {
        let mut binder = OutputBinder::new();
        let root = binder.create_child("r", None, None).unwrap();
        let text = binder.append_text(root, "x").unwrap();
        assert_matches!(
            binder.create_child("c", None, Some(text)),
            Err(Error::Dom(xns_dom::Error::NotAnElement(_)))
        );
    }
}
