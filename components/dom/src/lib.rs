//! Arena based XML tree with resolved namespace names
//!
//! Nodes live in a [`Document`] and are addressed by [`NodeId`]. Element and
//! attribute names carry the namespace URI they were resolved to when the
//! document was read, next to the prefix used in the source.
//!
//! ```
//! use xns_dom::Document;
//!
//! let doc = Document::parse_str(r#"<a xmlns="urn:x"><b/></a>"#).unwrap();
//! let root = doc.root().unwrap();
//! let a = doc.element(root).unwrap();
//! assert_eq!(Some("urn:x"), a.name().namespace());
//! assert_eq!(r#"<a xmlns="urn:x"><b/></a>"#, doc.to_xml_string().unwrap());
//! ```

pub use crate::dom::{Attribute, Document, Element, NodeId, NodeKind};
pub use crate::error::{Error, Result};
pub use crate::name::{split_qname, Name, XMLNS_NS_URI, XML_NS_URI};

pub mod chars;
mod dom;
mod error;
mod name;
pub mod reader;
mod serialize;
