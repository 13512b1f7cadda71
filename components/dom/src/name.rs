use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};

pub const XML_NS_URI: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Split a lexical QName into prefix and local part
///
/// Fails for names with more than one colon or an empty part.
pub fn split_qname(input: &str) -> Result<(Option<&str>, &str)> {
    match input.split_once(':') {
        Some((prefix, local)) => {
            if prefix.is_empty() || local.is_empty() || local.contains(':') {
                Err(Error::IllegalName(input.to_string()))
            } else {
                Ok((Some(prefix), local))
            }
        }
        None if input.is_empty() => Err(Error::IllegalName(String::new())),
        None => Ok((None, input)),
    }
}

/// Expanded name plus the prefix it is written with
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Name {
    namespace: Option<String>,
    prefix: Option<String>,
    local: String,
}

impl Name {
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Name in no namespace without prefix
    pub fn unqualified(local: &str) -> Self {
        Self::new(None, None, local)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// The lexical name, `prefix:local` or `local`
    pub fn qualified(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.local)),
            None => Cow::Borrowed(&self.local),
        }
    }

    /// Compare the expanded name, ignoring the prefix
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }

    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_NS_URI)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}
