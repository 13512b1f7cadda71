use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use xns_dom::{XMLNS_NS_URI, XML_NS_URI};

pub const XML_SCHEMA_URI: &str = "http://www.w3.org/2001/XMLSchema";
pub const XML_SCHEMA_INSTANCE_URI: &str = "http://www.w3.org/2001/XMLSchema-instance";

struct NamespaceDecl {
    uri: Option<Box<str>>,
    bound_prefix: Option<Box<str>>,
    undeclared: bool,
}

/// Canonical handle of a namespace name
///
/// Handles are obtained from a [`NamespaceRegistry`], which returns the same
/// handle for every lookup of one URI. Equality compares URIs, so handles of
/// different registries for the same URI are equal too. The absent namespace
/// is only equal to itself.
#[derive(Clone)]
pub struct Namespace(Arc<NamespaceDecl>);

impl Namespace {
    fn new(uri: Option<&str>, bound_prefix: Option<&str>, undeclared: bool) -> Self {
        Self(Arc::new(NamespaceDecl {
            uri: uri.map(Into::into),
            bound_prefix: bound_prefix.map(Into::into),
            undeclared,
        }))
    }

    /// Namespace name, `None` for the absent namespace
    pub fn uri(&self) -> Option<&str> {
        self.0.uri.as_deref()
    }

    pub fn is_absent(&self) -> bool {
        self.0.uri.is_none()
    }

    /// Prefix this namespace is canonically bound to (`xml`, `xs`, ...)
    pub fn bound_prefix(&self) -> Option<&str> {
        self.0.bound_prefix.as_deref()
    }

    /// Usable without an `xmlns` declaration
    pub fn is_undeclared_namespace(&self) -> bool {
        self.0.undeclared
    }

    /// Identity comparison
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || (self.0.uri.is_some() && self.0.uri == other.0.uri)
    }
}

impl Eq for Namespace {}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.uri.hash(state)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.uri() {
            Some(uri) => f.debug_tuple("Namespace").field(&uri).finish(),
            None => f.write_str("AbsentNamespace"),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri().unwrap_or("##absent"))
    }
}

/// Prefix to namespace bindings visible at one element
///
/// The default namespace is kept in its own slot next to the prefixed
/// bindings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InScopeNamespaces {
    default: Option<Namespace>,
    prefixes: BTreeMap<String, Namespace>,
}

impl InScopeNamespaces {
    /// Binding of `prefix`, the default slot for `None`
    pub fn get(&self, prefix: Option<&str>) -> Option<&Namespace> {
        match prefix {
            Some(prefix) => self.prefixes.get(prefix),
            None => self.default.as_ref(),
        }
    }

    pub fn default_namespace(&self) -> Option<&Namespace> {
        self.default.as_ref()
    }

    pub fn contains(&self, prefix: Option<&str>) -> bool {
        self.get(prefix).is_some()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len() + usize::from(self.default.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Default slot first, then prefixes in lexical order
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &Namespace)> + '_ {
        self.default
            .iter()
            .map(|namespace| (None, namespace))
            .chain(
                self.prefixes
                    .iter()
                    .map(|(prefix, namespace)| (Some(prefix.as_str()), namespace)),
            )
    }

    pub(crate) fn bind(&mut self, prefix: Option<&str>, namespace: Namespace) {
        match prefix {
            Some(prefix) => {
                self.prefixes.insert(prefix.to_string(), namespace);
            }
            None => self.default = Some(namespace),
        }
    }

    pub(crate) fn unbind(&mut self, prefix: Option<&str>) -> Option<Namespace> {
        match prefix {
            Some(prefix) => self.prefixes.remove(prefix),
            None => self.default.take(),
        }
    }
}

/// URI to [`Namespace`] table
///
/// Knows the predefined namespaces and builds the bindings every document
/// starts with once, on construction.
pub struct NamespaceRegistry {
    by_uri: HashMap<Box<str>, Namespace>,
    absent: Namespace,
    predefined: Vec<Namespace>,
    undeclared: Arc<InScopeNamespaces>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        let predefined = vec![
            Namespace::new(Some(XML_NS_URI), Some("xml"), true),
            Namespace::new(Some(XMLNS_NS_URI), Some("xmlns"), true),
            Namespace::new(Some(XML_SCHEMA_URI), Some("xs"), false),
            Namespace::new(Some(XML_SCHEMA_INSTANCE_URI), Some("xsi"), false),
        ];

        let mut undeclared = InScopeNamespaces::default();
        for namespace in predefined.iter().filter(|ns| ns.is_undeclared_namespace()) {
            undeclared.bind(namespace.bound_prefix(), namespace.clone());
        }

        let by_uri = predefined
            .iter()
            .filter_map(|ns| ns.uri().map(|uri| (Box::from(uri), ns.clone())))
            .collect();

        Self {
            by_uri,
            absent: Namespace::new(None, None, false),
            predefined,
            undeclared: Arc::new(undeclared),
        }
    }

    /// Canonical namespace for `uri`
    ///
    /// Unknown URIs are registered when `create_if_missing` is set, otherwise
    /// `None` is returned.
    pub fn resolve(&mut self, uri: &str, create_if_missing: bool) -> Option<Namespace> {
        if create_if_missing {
            Some(self.namespace_for_uri(uri))
        } else {
            self.get(uri)
        }
    }

    /// Lookup without registering
    pub fn get(&self, uri: &str) -> Option<Namespace> {
        self.by_uri.get(uri).cloned()
    }

    /// Like [`resolve`](Self::resolve), registering unknown URIs
    pub fn namespace_for_uri(&mut self, uri: &str) -> Namespace {
        if let Some(namespace) = self.by_uri.get(uri) {
            return namespace.clone();
        }

        log::debug!("registering namespace {}", uri);
        let namespace = Namespace::new(Some(uri), None, false);
        self.by_uri.insert(uri.into(), namespace.clone());
        namespace
    }

    pub fn absent_namespace(&self) -> Namespace {
        self.absent.clone()
    }

    pub fn predefined_namespaces(&self) -> impl Iterator<Item = &Namespace> + '_ {
        self.predefined.iter()
    }

    pub fn xml_schema(&self) -> Namespace {
        self.predefined[2].clone()
    }

    /// Bindings in scope at a root element before its own declarations
    pub fn undeclared_namespace_map(&self) -> &Arc<InScopeNamespaces> {
        &self.undeclared
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceRegistry")
            .field("namespaces", &self.by_uri.len())
            .finish()
    }
}
