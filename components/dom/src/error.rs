use std::io;
use std::str::Utf8Error;

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use crate::dom::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure while reading, building or writing a [`Document`](crate::Document)
#[derive(Debug, Error)]
pub enum Error {
    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("illegal qualified name `{0}`")]
    IllegalName(String),

    #[error("namespace prefix `{0}` is not declared")]
    UnknownPrefix(String),

    #[error("illegal namespace URI `{uri}` bound to {}", .prefix.as_deref().unwrap_or("the default namespace"))]
    IllegalNamespaceUri { prefix: Option<String>, uri: String },

    #[error("attribute `{0}` is not unique")]
    NonUniqueAttribute(String),

    #[error("document has no root element")]
    NoRootElement,

    #[error("document already has a root element")]
    SecondRootElement,

    #[error("element <{0}> is not closed")]
    UnclosedElement(String),

    #[error("character data outside of the root element")]
    ContentOutsideRoot,

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
}
