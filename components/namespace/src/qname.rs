use std::fmt;

use memchr::memchr;
use xns_dom::chars::XmlStrExt;
use xns_dom::{Document, NodeId};

use crate::context::{NamespaceContext, NamespaceContexts};
use crate::error::{Error, Result};
use crate::namespace::Namespace;

/// How a QName found in content is used
///
/// Unprefixed definitions belong to the target namespace, unprefixed
/// references to the default namespace.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NameUsage {
    Definition,
    Reference,
}

/// Expanded name of a QName found in attribute or text content
///
/// Names without namespace always have `None` as namespace, also when they
/// were resolved against the absent namespace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedQName {
    namespace: Option<Namespace>,
    local_name: String,
}

impl ResolvedQName {
    pub fn new(namespace: Option<Namespace>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.filter(|namespace| !namespace.is_absent()),
            local_name: local_name.into(),
        }
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        self.namespace.as_ref()
    }

    pub fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_ref().and_then(Namespace::uri)
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

/// Clark notation
impl fmt::Display for ResolvedQName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace_uri() {
            Some(uri) => write!(f, "{{{}}}{}", uri, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

impl NamespaceContext {
    /// Resolve a QName appearing in content of this context's element
    ///
    /// Surrounding whitespace is ignored. The value is split at the first
    /// colon. A prefixed name resolves through the in-scope bindings, which
    /// only references may use.
    pub fn interpret_qname(&self, value: &str, usage: NameUsage) -> Result<ResolvedQName> {
        let qname = value.trim_xml_whitespace();
        let invalid = || Error::InvalidQName {
            node: self.node(),
            value: value.to_string(),
        };

        let (prefix, local) = match memchr(b':', qname.as_bytes()) {
            Some(colon) => (Some(&qname[..colon]), &qname[colon + 1..]),
            None => (None, qname),
        };
        if local.is_empty() || local.contains(':') || prefix == Some("") {
            return Err(invalid());
        }

        let namespace = match (prefix, usage) {
            (Some(_), NameUsage::Definition) => {
                return Err(Error::PrefixedDefinition {
                    node: self.node(),
                    value: qname.to_string(),
                });
            }
            (Some(prefix), NameUsage::Reference) => {
                let namespace = self
                    .in_scope_namespaces()
                    .get(Some(prefix))
                    .ok_or_else(|| Error::UndeclaredPrefix {
                        node: self.node(),
                        value: qname.to_string(),
                        prefix: prefix.to_string(),
                    })?;
                Some(namespace.clone())
            }
            (None, NameUsage::Definition) => Some(self.target_namespace().clone()),
            (None, NameUsage::Reference) => self.default_namespace().cloned(),
        };

        Ok(ResolvedQName::new(namespace, local))
    }
}

/// Resolve an optional QName, `None` stays `None`
pub fn interpret_qname(
    context: &NamespaceContext,
    value: Option<&str>,
    usage: NameUsage,
) -> Result<Option<ResolvedQName>> {
    value
        .map(|value| context.interpret_qname(value, usage))
        .transpose()
}

/// Value of the attribute `local` in `namespace`
///
/// On an element of `namespace` itself the attribute may also be written
/// unqualified. Having both forms is an error.
pub fn node_attribute<'d>(
    document: &'d Document,
    node: NodeId,
    local: &str,
    namespace: &Namespace,
) -> Result<Option<&'d str>> {
    let element = document.element(node).ok_or(Error::NotAnElement(node))?;
    let qualified = element.attribute(namespace.uri(), local);

    if element.name().namespace() != namespace.uri() {
        return Ok(qualified);
    }

    let unqualified = element.attribute(None, local);
    match (unqualified, qualified) {
        (Some(_), Some(_)) if !namespace.is_absent() => Err(Error::AmbiguousAttribute {
            node,
            element: element.name().to_string(),
            local: local.to_string(),
            namespace: namespace.to_string(),
        }),
        (Some(value), _) => Ok(Some(value)),
        (None, qualified) => Ok(qualified),
    }
}

/// Look up the attribute like [`node_attribute`] and resolve its value as a
/// QName reference in the context of `node`
pub fn interpret_attribute_qname(
    document: &Document,
    contexts: &NamespaceContexts,
    node: NodeId,
    local: &str,
    namespace: &Namespace,
) -> Result<Option<ResolvedQName>> {
    let value = node_attribute(document, node, local, namespace)?;
    match value {
        Some(value) => contexts
            .context(node)?
            .interpret_qname(value, NameUsage::Reference)
            .map(Some),
        None => Ok(None),
    }
}
