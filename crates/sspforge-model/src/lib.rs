//! ---
//! ssp_section: "02-structure-model"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Typed data model for SSP system structures."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
//! Typed data model for SSP 1.0 system structure descriptions.
//!
//! The types in this crate describe a co-simulation scenario as pure,
//! immutable data: which resources participate, which components expose
//! which connectors, how connections wire components together, and which
//! parameter values apply before the first step. Construction goes through
//! `sspforge-builder`; serialization to and from `SystemStructure.ssd`
//! lives in `sspforge-xml`.

#![warn(missing_docs)]

/// Result alias used throughout the model crate.
pub type Result<T> = std::result::Result<T, StructureError>;

/// Errors raised while assembling a system structure.
///
/// Only naming conflicts and malformed declarations are detected at this
/// layer. Resource existence is checked when packaging, and connection
/// endpoint resolution is left to the consuming runtime.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    /// Two components under one system share a name.
    #[error("duplicate component '{name}' in system '{system}'")]
    DuplicateComponent {
        /// System declaring the components.
        system: String,
        /// Conflicting component name.
        name: String,
    },
    /// Two connectors on one component share a name.
    #[error("duplicate connector '{name}' on component '{component}'")]
    DuplicateConnector {
        /// Component declaring the connectors.
        component: String,
        /// Conflicting connector name.
        name: String,
    },
    /// Two parameter sets on one component share a name.
    #[error("duplicate parameter set '{name}' on component '{component}'")]
    DuplicateParameterSet {
        /// Component declaring the sets.
        component: String,
        /// Conflicting set name.
        name: String,
    },
    /// Two resources map onto the same file inside the package.
    #[error("duplicate resource target '{target}' declared by '{path}'")]
    DuplicateResource {
        /// Target path inside the package.
        target: String,
        /// Declared source path that collides.
        path: String,
    },
    /// A resource path carries no usable file name.
    #[error("resource '{path}' has no usable file name")]
    MalformedResource {
        /// Declared source path.
        path: String,
    },
    /// A connection endpoint is not of the form `component.port`.
    #[error("malformed connection endpoint '{endpoint}': expected <component>.<port>")]
    MalformedEndpoint {
        /// Offending endpoint string.
        endpoint: String,
    },
    /// Two namespace declarations share a prefix.
    #[error("duplicate namespace prefix '{prefix}'")]
    DuplicateNamespace {
        /// Conflicting prefix.
        prefix: String,
    },
    /// A namespace declaration uses a prefix owned by the SSP standard.
    #[error("namespace prefix '{prefix}' is reserved")]
    ReservedNamespace {
        /// Reserved prefix.
        prefix: String,
    },
    /// Annotation content failed to canonicalize during assembly.
    #[error("annotation '{kind}' carries invalid content: {detail}")]
    InvalidAnnotation {
        /// Vendor identifier of the annotation.
        kind: String,
        /// Underlying canonicalization failure.
        detail: String,
    },
    /// A package was assembled without a structure description.
    #[error("package '{package}' declares no system structure description")]
    MissingStructure {
        /// Package being assembled.
        package: String,
    },
    /// A structure description was assembled without its system.
    #[error("system structure '{descriptor}' declares no system")]
    MissingSystem {
        /// Structure description being assembled.
        descriptor: String,
    },
    /// A connector kind string is not part of the SSP vocabulary.
    #[error("unknown connector kind '{value}'")]
    UnknownConnectorKind {
        /// Offending string.
        value: String,
    },
    /// A value kind string is not part of the SSP vocabulary.
    #[error("unknown value kind '{value}'")]
    UnknownValueKind {
        /// Offending string.
        value: String,
    },
}

pub mod package;
pub mod structure;
pub mod value;

pub use package::{Resource, SspPackage};
pub use structure::{
    Annotation, Component, Connection, Connector, ConnectorKind, DefaultExperiment,
    LinearTransformation, Namespace, System, SystemStructureDescription,
};
pub use value::{Parameter, ParameterSet, Value, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_conflict() {
        let err = StructureError::DuplicateComponent {
            system: "QuarterTruck".into(),
            name: "chassis".into(),
        };
        assert_eq!(
            format!("{err}"),
            "duplicate component 'chassis' in system 'QuarterTruck'"
        );
    }
}
