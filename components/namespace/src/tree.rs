//! Child lookups used when interpreting schema-like documents

use xns_dom::{Document, NodeId, NodeKind};

use crate::error::{Error, Result};
use crate::namespace::{Namespace, XML_SCHEMA_URI};

fn element_name(document: &Document, node: NodeId) -> String {
    match document.element(node) {
        Some(element) => element.name().to_string(),
        None => format!("{:?}", node),
    }
}

fn is_named(document: &Document, node: NodeId, tag: &str, namespace: &Namespace) -> bool {
    document
        .element(node)
        .map_or(false, |element| element.name().is(namespace.uri(), tag))
}

fn is_annotation(document: &Document, node: NodeId) -> bool {
    document
        .element(node)
        .map_or(false, |element| element.name().is(Some(XML_SCHEMA_URI), "annotation"))
}

/// Element children of `node` named `tag` in `namespace`, in document order
pub fn locate_matching_children(
    document: &Document,
    node: NodeId,
    tag: &str,
    namespace: &Namespace,
) -> Vec<NodeId> {
    document
        .element_children(node)
        .filter(|&child| is_named(document, child, tag, namespace))
        .collect()
}

/// The only element child of `node` named `tag` in `namespace`
///
/// More than one match is an error, as is none unless `absent_ok` is set.
pub fn locate_unique_child(
    document: &Document,
    node: NodeId,
    tag: &str,
    namespace: &Namespace,
    absent_ok: bool,
) -> Result<Option<NodeId>> {
    let mut matches = document
        .element_children(node)
        .filter(|&child| is_named(document, child, tag, namespace));

    let candidate = matches.next();
    if matches.next().is_some() {
        return Err(Error::MultipleChildren {
            node,
            parent: element_name(document, node),
            tag: tag.to_string(),
        });
    }
    if candidate.is_none() && !absent_ok {
        return Err(Error::MissingChild {
            node,
            parent: element_name(document, node),
            tag: tag.to_string(),
        });
    }
    Ok(candidate)
}

/// First element child of `node`
///
/// `xs:annotation` elements are skipped when `ignore_annotations` is set.
/// With `require_unique` a second candidate is an error.
pub fn locate_first_child_element(
    document: &Document,
    node: NodeId,
    absent_ok: bool,
    require_unique: bool,
    ignore_annotations: bool,
) -> Result<Option<NodeId>> {
    let mut candidates = document
        .element_children(node)
        .filter(|&child| !(ignore_annotations && is_annotation(document, child)));

    let candidate = candidates.next();
    if require_unique && candidates.next().is_some() {
        return Err(Error::MultipleChildren {
            node,
            parent: element_name(document, node),
            tag: "*".to_string(),
        });
    }
    if candidate.is_none() && !absent_ok {
        return Err(Error::MissingChild {
            node,
            parent: element_name(document, node),
            tag: "*".to_string(),
        });
    }
    Ok(candidate)
}

/// Whether `node` has an element child other than `xs:annotation`
pub fn has_non_annotation_child(document: &Document, node: NodeId) -> bool {
    document
        .element_children(node)
        .any(|child| !is_annotation(document, child))
}

/// Concatenated text and CDATA children of `node`
///
/// Comments are skipped, element children are an error.
pub fn extract_text_content(document: &Document, node: NodeId) -> Result<String> {
    let mut text = String::new();
    for &child in document.children(node) {
        match document.kind(child) {
            NodeKind::Text(content) | NodeKind::CData(content) => text.push_str(content),
            NodeKind::Comment(_) => {}
            NodeKind::Element(_) => {
                return Err(Error::NonTextContent {
                    node: child,
                    element: element_name(document, node),
                })
            }
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::namespace::NamespaceRegistry;

    const SCHEMA: &str = r#"<xs:complexType xmlns:xs="http://www.w3.org/2001/XMLSchema">
        <xs:annotation/>
        <xs:sequence/>
        <xs:attribute name="a"/>
        <xs:attribute name="b"/>
    </xs:complexType>"#;

    #[test]
    fn matching_and_unique_children() {
        let document = Document::parse_str(SCHEMA).unwrap();
        let root = document.root().unwrap();
        let xs = NamespaceRegistry::new().xml_schema();

        assert_eq!(2, locate_matching_children(&document, root, "attribute", &xs).len());
        assert!(locate_unique_child(&document, root, "sequence", &xs, false)
            .unwrap()
            .is_some());
        assert_eq!(
            None,
            locate_unique_child(&document, root, "choice", &xs, true).unwrap()
        );
        assert_matches!(
            locate_unique_child(&document, root, "choice", &xs, false),
            Err(Error::MissingChild { ref tag, .. }) if tag == "choice"
        );
        assert_matches!(
            locate_unique_child(&document, root, "attribute", &xs, false),
            Err(Error::MultipleChildren { ref parent, .. }) if parent == "xs:complexType"
        );
    }

    #[test]
    fn first_child_element() {
        let document = Document::parse_str(SCHEMA).unwrap();
        let root = document.root().unwrap();

        let first = locate_first_child_element(&document, root, false, false, true)
            .unwrap()
            .unwrap();
        assert!(document
            .element(first)
            .unwrap()
            .name()
            .is(Some(XML_SCHEMA_URI), "sequence"));

        let first = locate_first_child_element(&document, root, false, false, false)
            .unwrap()
            .unwrap();
        assert!(is_annotation(&document, first));

        assert_matches!(
            locate_first_child_element(&document, root, false, true, true),
            Err(Error::MultipleChildren { .. })
        );
        assert!(has_non_annotation_child(&document, root));
    }

    #[test]
    fn annotation_only() {
        let document = Document::parse_str(
            r#"<xs:element xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:annotation/></xs:element>"#,
        )
        .unwrap();
        let root = document.root().unwrap();

        assert!(!has_non_annotation_child(&document, root));
        assert_eq!(
            None,
            locate_first_child_element(&document, root, true, true, true).unwrap()
        );
        assert_matches!(
            locate_first_child_element(&document, root, false, true, true),
            Err(Error::MissingChild { .. })
        );
    }

    #[test]
    fn text_content() {
        let document =
            Document::parse_str("<d>one <![CDATA[<two>]]><!--skip--> three</d>").unwrap();
        let root = document.root().unwrap();
        assert_eq!("one <two> three", extract_text_content(&document, root).unwrap());

        let document = Document::parse_str("<d>one<e/></d>").unwrap();
        let root = document.root().unwrap();
        assert_matches!(
            extract_text_content(&document, root),
            Err(Error::NonTextContent { ref element, .. }) if element == "d"
        );
    }
}
