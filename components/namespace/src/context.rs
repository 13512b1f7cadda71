use std::collections::HashMap;
use std::sync::Arc;

use xns_dom::{Document, NodeId};

use crate::error::{Error, Result};
use crate::namespace::{InScopeNamespaces, Namespace, NamespaceRegistry};
use crate::options::{ContextOptions, UndeclarationPolicy};

/// Attributes of an element that are not namespace declarations
///
/// Keyed by namespace URI and local name, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(Option<String>, String, String)>,
}

impl AttributeMap {
    pub fn get(&self, namespace: Option<&str>, local: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(ns, name, _)| ns.as_deref() == namespace && name == local)
            .map(|(_, _, value)| value.as_str())
    }

    pub fn contains(&self, namespace: Option<&str>, local: &str) -> bool {
        self.get(namespace, local).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(namespace, local name, value)` triples
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(ns, name, value)| (ns.as_deref(), name.as_str(), value.as_str()))
    }

    fn insert(&mut self, namespace: Option<&str>, local: &str, value: &str) {
        self.entries
            .push((namespace.map(str::to_string), local.to_string(), value.to_string()));
    }
}

/// Namespace scope of one element
///
/// `in_scope_namespaces` is shared with the parent context as long as the
/// element declares nothing itself. The first declaration copies the map, so
/// changes never leak into ancestors.
#[derive(Clone, Debug)]
pub struct NamespaceContext {
    node: NodeId,
    default_namespace: Option<Namespace>,
    target_namespace: Namespace,
    in_scope_namespaces: Arc<InScopeNamespaces>,
    attribute_map: AttributeMap,
    declares_namespaces: bool,
}

impl NamespaceContext {
    /// Build the context of a single element
    ///
    /// Without a parent the element is treated as a root: it starts with the
    /// registry's predefined bindings, no default namespace and, unless it
    /// has a `targetNamespace` attribute, the absent namespace as target.
    pub fn new(
        document: &Document,
        node: NodeId,
        parent: Option<&NamespaceContext>,
        registry: &mut NamespaceRegistry,
        options: &ContextOptions,
    ) -> Result<Self> {
        let element = document.element(node).ok_or(Error::NotAnElement(node))?;

        let (mut in_scope, mut default_namespace, inherited_target) = match parent {
            Some(parent) => (
                Arc::clone(&parent.in_scope_namespaces),
                parent.default_namespace.clone(),
                Some(parent.target_namespace.clone()),
            ),
            None => (Arc::clone(registry.undeclared_namespace_map()), None, None),
        };

        let mut declares_namespaces = false;
        let mut attribute_map = AttributeMap::default();
        for attr in element.attributes() {
            let name = attr.name();
            if !name.is_namespace_declaration() {
                attribute_map.insert(name.namespace(), name.local_name(), attr.value());
                continue;
            }

            let prefix = name.prefix().map(|_| name.local_name());
            // copies the inherited bindings on the first declaration only
            let bindings = Arc::make_mut(&mut in_scope);
            declares_namespaces = true;

            let uri = attr.value();
            if !uri.is_empty() {
                let namespace = registry.namespace_for_uri(uri);
                log::debug!("{:?}: binding {} to {}", node, prefix.unwrap_or("default"), uri);
                if prefix.is_none() {
                    default_namespace = Some(namespace.clone());
                }
                bindings.bind(prefix, namespace);
                continue;
            }

            match prefix {
                None => {
                    log::debug!("{:?}: undeclaring default namespace", node);
                    default_namespace = None;
                    bindings.unbind(None);
                }
                Some(prefix) => match options.prefix_undeclaration {
                    UndeclarationPolicy::Permit => {
                        log::warn!("{:?}: undeclaring namespace prefix {}", node, prefix);
                        bindings.unbind(Some(prefix));
                    }
                    UndeclarationPolicy::Reject => {
                        return Err(Error::PrefixUndeclaration {
                            node,
                            element: element.name().to_string(),
                            prefix: prefix.to_string(),
                        });
                    }
                },
            }
        }

        let target_namespace = match attribute_map.get(None, "targetNamespace") {
            Some("") => registry.absent_namespace(),
            Some(uri) => registry.namespace_for_uri(uri),
            None => inherited_target.unwrap_or_else(|| registry.absent_namespace()),
        };

        Ok(Self {
            node,
            default_namespace,
            target_namespace,
            in_scope_namespaces: in_scope,
            attribute_map,
            declares_namespaces,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Namespace of unprefixed names used as references, `None` if absent
    pub fn default_namespace(&self) -> Option<&Namespace> {
        self.default_namespace.as_ref()
    }

    /// Namespace of unprefixed names used as definitions
    pub fn target_namespace(&self) -> &Namespace {
        &self.target_namespace
    }

    pub fn in_scope_namespaces(&self) -> &Arc<InScopeNamespaces> {
        &self.in_scope_namespaces
    }

    pub fn attribute_map(&self) -> &AttributeMap {
        &self.attribute_map
    }

    /// Whether the element has `xmlns` attributes of its own
    pub fn declares_namespaces(&self) -> bool {
        self.declares_namespaces
    }
}

/// Contexts of a document, keyed by node
///
/// The table owns the contexts. The document itself is only borrowed while
/// building, so the same tree can be processed by independent passes.
#[derive(Clone, Debug, Default)]
pub struct NamespaceContexts {
    contexts: HashMap<NodeId, NamespaceContext>,
}

impl NamespaceContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contexts for the root element and, with `options.recurse`, all
    /// elements below it
    pub fn build(
        document: &Document,
        registry: &mut NamespaceRegistry,
        options: &ContextOptions,
    ) -> Result<Self> {
        let root = document.root().ok_or(xns_dom::Error::NoRootElement)?;
        let mut contexts = Self::new();
        contexts.build_from(document, root, None, registry, options)?;
        Ok(contexts)
    }

    /// Build the context of `node` below the already built context of
    /// `parent` and, with `options.recurse`, of all elements below `node`
    ///
    /// Existing contexts of the visited nodes are replaced.
    pub fn build_from(
        &mut self,
        document: &Document,
        node: NodeId,
        parent: Option<NodeId>,
        registry: &mut NamespaceRegistry,
        options: &ContextOptions,
    ) -> Result<&NamespaceContext> {
        let mut pending = vec![(node, parent)];
        while let Some((current, parent)) = pending.pop() {
            let parent_context = match parent {
                Some(parent) => Some(self.context(parent)?),
                None => None,
            };
            let context =
                NamespaceContext::new(document, current, parent_context, registry, options)?;
            log::trace!(
                "{:?}: context built, {} bindings in scope{}",
                current,
                context.in_scope_namespaces.len(),
                if context.declares_namespaces { ", declares" } else { "" }
            );
            self.contexts.insert(current, context);

            if options.recurse {
                let children = document.children(current);
                pending.extend(
                    children
                        .iter()
                        .rev()
                        .filter(|child| document.is_element(**child))
                        .map(|&child| (child, Some(current))),
                );
            }
        }

        self.context(node)
    }

    pub fn get(&self, node: NodeId) -> Option<&NamespaceContext> {
        self.contexts.get(&node)
    }

    /// Like [`get`](Self::get), failing for nodes without context
    pub fn context(&self, node: NodeId) -> Result<&NamespaceContext> {
        self.get(node).ok_or(Error::MissingContext(node))
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn build(input: &str) -> (Document, NamespaceRegistry, NamespaceContexts) {
        let document = Document::parse_str(input).unwrap();
        let mut registry = NamespaceRegistry::new();
        let contexts =
            NamespaceContexts::build(&document, &mut registry, &ContextOptions::default())
                .unwrap();
        (document, registry, contexts)
    }

    #[test]
    fn root_defaults() {
        let (document, registry, contexts) = build("<a/>");
        let ctx = contexts.context(document.root().unwrap()).unwrap();

        assert_eq!(None, ctx.default_namespace());
        assert!(ctx.target_namespace().is_absent());
        assert!(Arc::ptr_eq(
            registry.undeclared_namespace_map(),
            ctx.in_scope_namespaces()
        ));
        assert!(!ctx.declares_namespaces());
        assert!(ctx.attribute_map().is_empty());
    }

    #[test]
    fn declarations_and_attribute_map() {
        let (document, _, contexts) =
            build(r#"<a xmlns="urn:x" xmlns:b="urn:y" b:c="1" d="2"/>"#);
        let ctx = contexts.context(document.root().unwrap()).unwrap();

        assert_eq!(Some("urn:x"), ctx.default_namespace().and_then(Namespace::uri));
        let in_scope = ctx.in_scope_namespaces();
        assert_eq!(Some("urn:x"), in_scope.get(None).and_then(Namespace::uri));
        assert_eq!(Some("urn:y"), in_scope.get(Some("b")).and_then(Namespace::uri));
        assert!(in_scope.contains(Some("xml")));

        let attrs = ctx.attribute_map();
        assert_eq!(2, attrs.len());
        assert_eq!(Some("1"), attrs.get(Some("urn:y"), "c"));
        assert_eq!(Some("2"), attrs.get(None, "d"));
        assert!(!attrs.contains(None, "xmlns"));
    }

    #[test]
    fn target_namespace_inherited_and_overridden() {
        let (document, _, contexts) = build(
            r#"<schema targetNamespace="urn:t"><a><b targetNamespace="urn:u"><c/></b></a></schema>"#,
        );
        let root = document.root().unwrap();
        let a = document.element_children(root).next().unwrap();
        let b = document.element_children(a).next().unwrap();
        let c = document.element_children(b).next().unwrap();

        let tns = |node| {
            contexts
                .context(node)
                .unwrap()
                .target_namespace()
                .uri()
                .map(str::to_string)
        };
        assert_eq!(Some("urn:t".to_string()), tns(root));
        assert_eq!(Some("urn:t".to_string()), tns(a));
        assert_eq!(Some("urn:u".to_string()), tns(b));
        assert_eq!(Some("urn:u".to_string()), tns(c));
    }

    #[test]
    fn empty_target_namespace_is_absent() {
        let (document, _, contexts) = build(r#"<schema targetNamespace=""/>"#);
        let ctx = contexts.context(document.root().unwrap()).unwrap();
        assert!(ctx.target_namespace().is_absent());
    }

    #[test]
    fn registry_namespaces_are_shared() {
        let (document, mut registry, contexts) = build(r#"<a xmlns="urn:x"/>"#);
        let ctx = contexts.context(document.root().unwrap()).unwrap();
        let registered = registry.resolve("urn:x", false).unwrap();
        assert!(Namespace::ptr_eq(&registered, ctx.default_namespace().unwrap()));
    }

    #[test]
    fn prefixed_declaration_never_sets_default() {
        use xns_dom::{Name, XMLNS_NS_URI};

        let mut document = Document::new();
        let root = document.append_element(None, Name::unqualified("a")).unwrap();
        document
            .set_attribute(
                root,
                Name::new(Some(XMLNS_NS_URI), Some("xmlns"), "xmlns"),
                "urn:x",
            )
            .unwrap();
        let mut registry = NamespaceRegistry::new();
        let ctx =
            NamespaceContext::new(&document, root, None, &mut registry, &ContextOptions::default())
                .unwrap();

        assert_eq!(None, ctx.default_namespace());
        assert!(!ctx.in_scope_namespaces().contains(None));
        assert_eq!(
            Some("urn:x"),
            ctx.in_scope_namespaces().get(Some("xmlns")).and_then(Namespace::uri)
        );
    }

    #[test]
    fn without_recursion() {
        let document = Document::parse_str("<a><b/></a>").unwrap();
        let mut registry = NamespaceRegistry::new();
        let options = ContextOptions::default().with_recurse(false);
        let contexts = NamespaceContexts::build(&document, &mut registry, &options).unwrap();

        let root = document.root().unwrap();
        let b = document.element_children(root).next().unwrap();
        assert_eq!(1, contexts.len());
        assert_matches!(contexts.context(b), Err(Error::MissingContext(node)) if node == b);
    }

    #[test]
    fn not_an_element() {
        let document = Document::parse_str("<a>text</a>").unwrap();
        let text = document.children(document.root().unwrap())[0];
        let mut registry = NamespaceRegistry::new();

        assert_matches!(
            NamespaceContext::new(&document, text, None, &mut registry, &ContextOptions::default()),
            Err(Error::NotAnElement(node)) if node == text
        );
    }

    #[test]
    fn missing_parent_context() {
        let document = Document::parse_str("<a><b/></a>").unwrap();
        let root = document.root().unwrap();
        let b = document.element_children(root).next().unwrap();
        let mut registry = NamespaceRegistry::new();
        let mut contexts = NamespaceContexts::new();

        assert_matches!(
            contexts.build_from(&document, b, Some(root), &mut registry, &ContextOptions::default()),
            Err(Error::MissingContext(node)) if node == root
        );
    }
}
