//! Namespace handling on top of [`xns_dom`] trees
//!
//! * [`NamespaceContexts`] records, for each element, the namespaces in
//!   scope, the default and target namespace and its plain attributes.
//! * [`NamespaceContext::interpret_qname`] resolves QNames found in attribute
//!   values or text, which the parser cannot see as names.
//! * [`OutputBinder`] builds a new document and picks the prefixes itself.
//!
//! ```
//! use xns::{ContextOptions, NameUsage, NamespaceContexts, NamespaceRegistry};
//! use xns_dom::Document;
//!
//! let doc = Document::parse_str(r#"<a xmlns:p="urn:p" type="p:T"/>"#).unwrap();
//! let mut registry = NamespaceRegistry::new();
//! let contexts = NamespaceContexts::build(&doc, &mut registry, &ContextOptions::default()).unwrap();
//!
//! let root = doc.root().unwrap();
//! let ctx = contexts.context(root).unwrap();
//! let value = ctx.attribute_map().get(None, "type").unwrap();
//! let name = ctx.interpret_qname(value, NameUsage::Reference).unwrap();
//! assert_eq!(Some("urn:p"), name.namespace_uri());
//! assert_eq!("T", name.local_name());
//! ```

pub use crate::binder::OutputBinder;
pub use crate::context::{AttributeMap, NamespaceContext, NamespaceContexts};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::namespace::{
    InScopeNamespaces, Namespace, NamespaceRegistry, XMLNS_NS_URI, XML_NS_URI,
    XML_SCHEMA_INSTANCE_URI, XML_SCHEMA_URI,
};
pub use crate::options::{BinderOptions, ContextOptions, UndeclarationPolicy};
pub use crate::qname::{
    interpret_attribute_qname, interpret_qname, node_attribute, NameUsage, ResolvedQName,
};

mod binder;
mod context;
mod error;
mod namespace;
mod options;
mod qname;
pub mod tree;
