/// Handling of `xmlns:p=""`
///
/// Namespaces in XML 1.0 only allows un-declaring the default namespace,
/// XML 1.1 and the infoset allow prefixes too.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UndeclarationPolicy {
    /// Remove the prefix binding
    #[default]
    Permit,
    /// Fail with [`Error::PrefixUndeclaration`](crate::Error::PrefixUndeclaration)
    Reject,
}

/// Settings for building namespace contexts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextOptions {
    pub recurse: bool,
    pub prefix_undeclaration: UndeclarationPolicy,
}

impl ContextOptions {
    pub fn with_recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    pub fn with_prefix_undeclaration(mut self, policy: UndeclarationPolicy) -> Self {
        self.prefix_undeclaration = policy;
        self
    }
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            recurse: true,
            prefix_undeclaration: UndeclarationPolicy::Permit,
        }
    }
}

/// Settings for an [`OutputBinder`](crate::OutputBinder)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinderOptions {
    /// Synthesized prefixes are this stem followed by a counter
    pub prefix_stem: String,
    /// Only this namespace may take the default slot
    pub default_namespace: Option<String>,
}

impl BinderOptions {
    pub fn with_prefix_stem(mut self, stem: impl Into<String>) -> Self {
        self.prefix_stem = stem.into();
        self
    }

    pub fn with_default_namespace(mut self, uri: impl Into<String>) -> Self {
        self.default_namespace = Some(uri.into());
        self
    }
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            prefix_stem: "ns".to_string(),
            default_namespace: None,
        }
    }
}
