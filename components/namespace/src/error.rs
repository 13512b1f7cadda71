use thiserror::Error;
use xns_dom::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document is well-formed but violates a namespace or schema rule
    Validation,
    /// Content of an unexpected node type
    MalformedDocument,
    /// The caller broke the contract of the called function
    Precondition,
    /// Failure of the underlying tree
    Dom,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("multiple <{tag}> elements nested in <{parent}>")]
    MultipleChildren {
        node: NodeId,
        parent: String,
        tag: String,
    },

    #[error("expected <{tag}> element nested in <{parent}>")]
    MissingChild {
        node: NodeId,
        parent: String,
        tag: String,
    },

    #[error("QName {value} prefix is not declared")]
    UndeclaredPrefix {
        node: NodeId,
        value: String,
        prefix: String,
    },

    #[error("`{value}` is not a valid QName")]
    InvalidQName { node: NodeId, value: String },

    #[error("attribute {local} of <{element}> appears both unqualified and qualified with {namespace}")]
    AmbiguousAttribute {
        node: NodeId,
        element: String,
        local: String,
        namespace: String,
    },

    #[error("namespace prefix {prefix} must not be undeclared on <{element}>")]
    PrefixUndeclaration {
        node: NodeId,
        element: String,
        prefix: String,
    },

    #[error("non-text node found in content of <{element}>")]
    NonTextContent { node: NodeId, element: String },

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("prefixed QName {value} cannot name a definition")]
    PrefixedDefinition { node: NodeId, value: String },

    #[error("{local} cannot be put into the reserved namespace {uri}")]
    ReservedNamespace { local: String, uri: String },

    #[error("no namespace context was built for node {0:?}")]
    MissingContext(NodeId),

    #[error(transparent)]
    Dom(#[from] xns_dom::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MultipleChildren { .. }
            | Error::MissingChild { .. }
            | Error::UndeclaredPrefix { .. }
            | Error::InvalidQName { .. }
            | Error::AmbiguousAttribute { .. }
            | Error::PrefixUndeclaration { .. } => ErrorKind::Validation,
            Error::NonTextContent { .. } => ErrorKind::MalformedDocument,
            Error::NotAnElement(_)
            | Error::PrefixedDefinition { .. }
            | Error::ReservedNamespace { .. }
            | Error::MissingContext(_) => ErrorKind::Precondition,
            Error::Dom(_) => ErrorKind::Dom,
        }
    }

    /// Node the error was detected at, if known
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Error::MultipleChildren { node, .. }
            | Error::MissingChild { node, .. }
            | Error::UndeclaredPrefix { node, .. }
            | Error::InvalidQName { node, .. }
            | Error::AmbiguousAttribute { node, .. }
            | Error::PrefixUndeclaration { node, .. }
            | Error::NonTextContent { node, .. }
            | Error::PrefixedDefinition { node, .. } => Some(*node),
            Error::NotAnElement(node) | Error::MissingContext(node) => Some(*node),
            Error::ReservedNamespace { .. } | Error::Dom(_) => None,
        }
    }
}
