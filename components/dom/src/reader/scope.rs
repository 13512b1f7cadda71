use crate::error::{Error, Result};
use crate::name::{split_qname, Name, XMLNS_NS_URI, XML_NS_URI};

/// Namespace bindings of the currently open elements
///
/// A binding to `None` records an un-declaration, which hides outer bindings
/// of the same prefix until the scope is popped.
pub(crate) struct NamespaceScopes {
    bindings: Vec<(Option<String>, Option<String>)>,
    sizes: Vec<usize>,
}

impl NamespaceScopes {
    pub fn new() -> Self {
        Self {
            bindings: vec![
                (Some("xml".to_string()), Some(XML_NS_URI.to_string())),
                (Some("xmlns".to_string()), Some(XMLNS_NS_URI.to_string())),
            ],
            sizes: vec![],
        }
    }

    pub fn build_scope(&mut self) -> ScopeBuilder<'_> {
        ScopeBuilder {
            scopes: self,
            size: 0,
        }
    }

    pub fn pop_scope(&mut self) {
        if let Some(size) = self.sizes.pop() {
            self.bindings.truncate(self.bindings.len() - size);
        }
    }

    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound.as_deref() == prefix)
            .and_then(|(_, uri)| uri.as_deref())
    }

    pub fn resolve_element(&self, qname: &str) -> Result<Name> {
        let (prefix, local) = split_qname(qname)?;
        if prefix == Some("xmlns") {
            return Err(Error::IllegalName(qname.to_string()));
        }
        match prefix {
            Some(prefix) => match self.resolve(Some(prefix)) {
                Some(uri) => Ok(Name::new(Some(uri), Some(prefix), local)),
                None => Err(Error::UnknownPrefix(prefix.to_string())),
            },
            None => Ok(Name::new(self.resolve(None), None, local)),
        }
    }

    /// Unprefixed attributes are in no namespace, except `xmlns` itself
    pub fn resolve_attribute(&self, qname: &str) -> Result<Name> {
        match split_qname(qname)? {
            (None, "xmlns") => Ok(Name::new(Some(XMLNS_NS_URI), None, "xmlns")),
            (None, local) => Ok(Name::unqualified(local)),
            (Some(prefix), local) => match self.resolve(Some(prefix)) {
                Some(uri) => Ok(Name::new(Some(uri), Some(prefix), local)),
                None => Err(Error::UnknownPrefix(prefix.to_string())),
            },
        }
    }
}

pub(crate) struct ScopeBuilder<'a> {
    scopes: &'a mut NamespaceScopes,
    size: usize,
}

impl<'a> ScopeBuilder<'a> {
    /// Bind `prefix` (`None` for the default namespace) to `uri`
    ///
    /// An empty `uri` un-declares the binding.
    pub fn declare(&mut self, prefix: Option<&str>, uri: &str) -> Result<()> {
        let illegal = match prefix {
            Some("xml") => uri != XML_NS_URI,
            Some("xmlns") => true,
            _ => uri == XML_NS_URI || uri == XMLNS_NS_URI,
        };
        if illegal {
            return Err(Error::IllegalNamespaceUri {
                prefix: prefix.map(str::to_string),
                uri: uri.to_string(),
            });
        }

        let uri = if uri.is_empty() {
            None
        } else {
            Some(uri.to_string())
        };
        self.scopes
            .bindings
            .push((prefix.map(str::to_string), uri));
        self.size += 1;
        Ok(())
    }

    pub fn finish(self) {
        self.scopes.sizes.push(self.size);
    }
}
