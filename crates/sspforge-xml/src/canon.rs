//! ---
//! ssp_section: "04-serialization"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Namespace table, escaping, and annotation canonicalization."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use sspforge_model::Namespace;

use crate::{XmlError, SSC_NAMESPACE, SSD_NAMESPACE, SSV_NAMESPACE};

/// Prefix table in force for one document: the three standard SSP
/// vocabularies followed by the document's extra namespaces.
pub(crate) struct NamespaceTable<'a> {
    entries: Vec<(&'a str, &'a str)>,
}

impl<'a> NamespaceTable<'a> {
    pub(crate) fn with_extras(namespaces: &'a [Namespace]) -> Self {
        let mut entries = vec![
            ("ssd", SSD_NAMESPACE),
            ("ssc", SSC_NAMESPACE),
            ("ssv", SSV_NAMESPACE),
        ];
        for namespace in namespaces {
            entries.push((namespace.prefix.as_str(), namespace.uri.as_str()));
        }
        Self { entries }
    }

    pub(crate) fn entries(&self) -> &[(&'a str, &'a str)] {
        &self.entries
    }

    pub(crate) fn prefix_for(&self, uri: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(_, known)| *known == uri)
            .map(|(prefix, _)| *prefix)
    }

    /// Wrap raw annotation markup in an element declaring every known
    /// prefix, so it can be parsed on its own.
    fn wrap(&self, content: &str) -> String {
        let mut out = String::with_capacity(content.len() + 256);
        out.push_str("<wrapper");
        for (prefix, uri) in &self.entries {
            out.push_str(" xmlns:");
            out.push_str(prefix);
            out.push_str("=\"");
            out.push_str(&escape_xml(uri));
            out.push('"');
        }
        out.push('>');
        out.push_str(content);
        out.push_str("</wrapper>");
        out
    }
}

/// Escape text for use in XML content or attribute values.
///
/// Literal whitespace controls are escaped numerically: XML parsers
/// normalize raw newlines and tabs inside attribute values, and the
/// canonical form relies on every logical line staying a single
/// physical line.
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

/// Canonicalize raw annotation markup against the given extra namespaces.
///
/// The result has every element on its own line, two-space indentation
/// from level zero, attributes in authored order, and trimmed text.
/// Canonicalization is idempotent, which is what makes authored and
/// re-parsed annotation content compare equal.
pub fn canonicalize_annotation_content(
    content: &str,
    namespaces: &[Namespace],
) -> Result<String, XmlError> {
    let table = NamespaceTable::with_extras(namespaces);
    canonicalize_with_table(content, &table)
}

pub(crate) fn canonicalize_with_table(
    content: &str,
    table: &NamespaceTable<'_>,
) -> Result<String, XmlError> {
    if content.trim().is_empty() {
        return Ok(String::new());
    }
    let wrapped = table.wrap(content);
    let doc = roxmltree::Document::parse(&wrapped).map_err(XmlError::AnnotationContent)?;
    canonicalize_children(doc.root_element(), table)
}

/// Canonical form of a node's children, without the node itself.
pub(crate) fn canonicalize_children(
    node: roxmltree::Node<'_, '_>,
    table: &NamespaceTable<'_>,
) -> Result<String, XmlError> {
    let mut out = String::new();
    render_foreign_children(&mut out, 0, node, table)?;
    while out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// Render the children of a parsed node whose vocabulary this crate does
/// not know, resolving namespaces through the document's prefix table.
pub(crate) fn render_foreign_children(
    out: &mut String,
    level: usize,
    parent: roxmltree::Node<'_, '_>,
    table: &NamespaceTable<'_>,
) -> Result<(), XmlError> {
    for child in parent.children() {
        if child.is_element() {
            render_foreign_element(out, level, child, table)?;
        } else if child.is_text() {
            let text = child.text().unwrap_or("").trim();
            if !text.is_empty() {
                push_indent(out, level);
                out.push_str(&escape_xml(text));
                out.push('\n');
            }
        }
    }
    Ok(())
}

fn render_foreign_element(
    out: &mut String,
    level: usize,
    node: roxmltree::Node<'_, '_>,
    table: &NamespaceTable<'_>,
) -> Result<(), XmlError> {
    let name = qualified_name(node.tag_name().namespace(), node.tag_name().name(), table)?;
    push_indent(out, level);
    out.push('<');
    out.push_str(&name);
    for attribute in node.attributes() {
        let attribute_name = qualified_name(attribute.namespace(), attribute.name(), table)?;
        out.push(' ');
        out.push_str(&attribute_name);
        out.push_str("=\"");
        out.push_str(&escape_xml(attribute.value()));
        out.push('"');
    }

    let has_elements = node.children().any(|child| child.is_element());
    if !has_elements {
        let text: String = node
            .children()
            .filter_map(|child| if child.is_text() { child.text() } else { None })
            .collect();
        let text = text.trim();
        if text.is_empty() {
            out.push_str("/>\n");
        } else {
            out.push('>');
            out.push_str(&escape_xml(text));
            out.push_str("</");
            out.push_str(&name);
            out.push_str(">\n");
        }
        return Ok(());
    }

    out.push_str(">\n");
    render_foreign_children(out, level + 1, node, table)?;
    push_indent(out, level);
    out.push_str("</");
    out.push_str(&name);
    out.push_str(">\n");
    Ok(())
}

fn qualified_name(
    namespace: Option<&str>,
    local: &str,
    table: &NamespaceTable<'_>,
) -> Result<String, XmlError> {
    match namespace {
        None => Ok(local.to_owned()),
        Some(uri) => {
            let prefix = table
                .prefix_for(uri)
                .ok_or_else(|| XmlError::UndeclaredNamespace {
                    uri: uri.to_owned(),
                })?;
            Ok(format!("{prefix}:{local}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn osp() -> Vec<Namespace> {
        vec![Namespace::new(
            "osp",
            "http://opensimulationplatform.com/SSP/OSPAnnotations",
        )]
    }

    #[test]
    fn escaping_covers_markup_and_whitespace_controls() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(escape_xml("line\nbreak"), "line&#10;break");
    }

    #[test]
    fn canonical_form_normalizes_authored_whitespace() {
        let sloppy = "<osp:Algorithm>\n      <osp:FixedStepAlgorithm   baseStepSize=\"0.001\" />\n  </osp:Algorithm>";
        let canonical = canonicalize_annotation_content(sloppy, &osp()).unwrap();
        assert_eq!(
            canonical,
            "<osp:Algorithm>\n  <osp:FixedStepAlgorithm baseStepSize=\"0.001\"/>\n</osp:Algorithm>"
        );
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let once = canonicalize_annotation_content(
            "<osp:Algorithm><osp:FixedStepAlgorithm baseStepSize=\"0.001\"/></osp:Algorithm>",
            &osp(),
        )
        .unwrap();
        let twice = canonicalize_annotation_content(&once, &osp()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn text_only_elements_stay_on_one_line() {
        let canonical = canonicalize_annotation_content("<note>  spread  </note>", &[]).unwrap();
        assert_eq!(canonical, "<note>spread</note>");
    }

    #[test]
    fn undeclared_prefix_is_rejected() {
        let err = canonicalize_annotation_content("<mystery:thing/>", &[]).unwrap_err();
        assert!(matches!(err, XmlError::AnnotationContent(_)));

        let inline = canonicalize_annotation_content(
            "<local:thing xmlns:local=\"http://example.invalid/local\"/>",
            &[],
        )
        .unwrap_err();
        assert!(matches!(inline, XmlError::UndeclaredNamespace { .. }));
    }

    #[test]
    fn empty_content_canonicalizes_to_empty() {
        assert_eq!(canonicalize_annotation_content("   ", &[]).unwrap(), "");
    }
}
