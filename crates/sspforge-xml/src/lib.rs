//! ---
//! ssp_section: "04-serialization"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Deterministic SSD document serialization and parsing."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
//! Reader and writer for `SystemStructure.ssd` documents.
//!
//! [`render_ssd`] emits a fully deterministic document: fixed namespace
//! and attribute order, two-space indentation, floats in shortest
//! round-trip form, no timestamps. Rendering the same structure twice
//! yields byte-identical output.
//!
//! [`parse_ssd`] matches elements by namespace URI rather than literal
//! prefix, accepts only SSP version `1.0`, and enforces the model's
//! naming invariants. Connection endpoints that do not resolve to a
//! declared component or connector are reported as `tracing` warnings;
//! resolution is the consuming runtime's concern.
//!
//! Vendor annotation content is carried as markup text; both paths pass
//! it through [`canonicalize_annotation_content`], so whitespace
//! differences in authored markup never affect round trips.

use sspforge_model::StructureError;

mod canon;
mod reader;
mod writer;

pub use canon::canonicalize_annotation_content;
pub use reader::parse_ssd;
pub use writer::render_ssd;

/// Namespace URI of the `ssd` vocabulary.
pub const SSD_NAMESPACE: &str = "http://ssp-standard.org/SSP1/SystemStructureDescription";
/// Namespace URI of the `ssc` vocabulary.
pub const SSC_NAMESPACE: &str = "http://ssp-standard.org/SSP1/SystemStructureCommon";
/// Namespace URI of the `ssv` vocabulary.
pub const SSV_NAMESPACE: &str = "http://ssp-standard.org/SSP1/SystemStructureParameterValues";

/// Failures while reading or writing an SSD document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The document is not well-formed XML.
    #[error("malformed XML document: {0}")]
    Malformed(#[from] roxmltree::Error),
    /// The document root is not `ssd:SystemStructureDescription`.
    #[error("unexpected root element '{found}'")]
    UnexpectedRoot {
        /// Local name of the root element found.
        found: String,
    },
    /// The document declares an SSP version this toolkit does not read.
    #[error("unsupported SSP version '{found}'")]
    UnsupportedVersion {
        /// Version attribute found on the root.
        found: String,
    },
    /// A required attribute is absent.
    #[error("element '{element}' is missing attribute '{attribute}'")]
    MissingAttribute {
        /// Element the attribute was expected on.
        element: String,
        /// Missing attribute name.
        attribute: String,
    },
    /// A required child element is absent.
    #[error("element '{parent}' is missing child '{element}'")]
    MissingElement {
        /// Parent element inspected.
        parent: String,
        /// Missing child description.
        element: String,
    },
    /// An attribute value failed to parse.
    #[error("invalid {kind} value '{value}' on element '{element}'")]
    InvalidValue {
        /// Element carrying the attribute.
        element: String,
        /// Expected value kind.
        kind: &'static str,
        /// Offending text.
        value: String,
    },
    /// Annotation markup failed to parse.
    #[error("malformed annotation content: {0}")]
    AnnotationContent(#[source] roxmltree::Error),
    /// Annotation markup references a namespace the document does not declare.
    #[error("annotation content uses namespace '{uri}' not declared on the document root")]
    UndeclaredNamespace {
        /// Unresolvable namespace URI.
        uri: String,
    },
    /// The document violates a structural naming invariant.
    #[error(transparent)]
    Structure(#[from] StructureError),
}
