//! ---
//! ssp_section: "02-structure-model"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Components, connections, and the system structure root."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{ParameterSet, ValueKind};
use crate::StructureError;

/// Connector causalities from the SSP connector vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorKind {
    /// Value consumed by the component.
    Input,
    /// Value produced by the component.
    Output,
    /// Tunable parameter exposed for binding.
    Parameter,
    /// Parameter computed by the component itself.
    CalculatedParameter,
    /// Bidirectional connector.
    Inout,
    /// Connector internal to the component.
    Local,
}

impl ConnectorKind {
    /// All kinds in canonical order.
    pub const fn all() -> &'static [ConnectorKind] {
        &[
            ConnectorKind::Input,
            ConnectorKind::Output,
            ConnectorKind::Parameter,
            ConnectorKind::CalculatedParameter,
            ConnectorKind::Inout,
            ConnectorKind::Local,
        ]
    }

    /// Canonical attribute spelling used in `.ssd` documents.
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectorKind::Input => "input",
            ConnectorKind::Output => "output",
            ConnectorKind::Parameter => "parameter",
            ConnectorKind::CalculatedParameter => "calculatedParameter",
            ConnectorKind::Inout => "inout",
            ConnectorKind::Local => "local",
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorKind {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConnectorKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StructureError::UnknownConnectorKind {
                value: s.to_owned(),
            })
    }
}

/// Named, directionally typed variable exposed by a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    /// Variable name; dotted paths such as `p.e` are common.
    pub name: String,
    /// Causality of the connector.
    pub kind: ConnectorKind,
    /// Value kind of the underlying variable.
    pub value_kind: ValueKind,
}

impl Connector {
    /// Construct a connector.
    pub fn new(name: impl Into<String>, value_kind: ValueKind, kind: ConnectorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            value_kind,
        }
    }

    /// Construct a real-valued connector.
    pub fn real(name: impl Into<String>, kind: ConnectorKind) -> Self {
        Self::new(name, ValueKind::Real, kind)
    }
}

/// Instance of a resource inside a system.
///
/// Connector and parameter-set maps are keyed by name; builders keep the
/// key equal to the entry's own `name` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Instance name, unique within the owning system.
    pub name: String,
    /// Resource reference, e.g. `resources/chassis.fmu`.
    pub source: String,
    /// Connectors keyed by name.
    #[serde(default)]
    pub connectors: IndexMap<String, Connector>,
    /// Parameter bindings keyed by set name.
    #[serde(default)]
    pub parameter_sets: IndexMap<String, ParameterSet>,
}

impl Component {
    /// Look up a connector by name.
    pub fn connector(&self, name: &str) -> Option<&Connector> {
        self.connectors.get(name)
    }

    /// Look up a parameter set by name.
    pub fn parameter_set(&self, name: &str) -> Option<&ParameterSet> {
        self.parameter_sets.get(name)
    }
}

/// Linear scaling applied along a connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTransformation {
    /// Multiplicative factor.
    pub factor: f64,
    /// Additive offset.
    pub offset: f64,
}

/// Directed pairing between two component ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Component declaring the start port.
    pub start_element: String,
    /// Start port name.
    pub start_connector: String,
    /// Component declaring the end port.
    pub end_element: String,
    /// End port name.
    pub end_connector: String,
    /// Optional linear scaling between the endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<LinearTransformation>,
}

impl Connection {
    /// Build a connection from two `component.port` endpoint strings.
    ///
    /// The component name ends at the first dot; everything after it is
    /// the port, so port names may themselves contain dots or spaces.
    /// Whether the endpoints resolve to declared components is left to
    /// the consuming runtime.
    pub fn between(start: &str, end: &str) -> crate::Result<Self> {
        let (start_element, start_connector) = split_endpoint(start)?;
        let (end_element, end_connector) = split_endpoint(end)?;
        Ok(Self {
            start_element,
            start_connector,
            end_element,
            end_connector,
            transformation: None,
        })
    }

    /// Attach a linear transformation.
    pub fn with_transformation(mut self, factor: f64, offset: f64) -> Self {
        self.transformation = Some(LinearTransformation { factor, offset });
        self
    }
}

fn split_endpoint(endpoint: &str) -> crate::Result<(String, String)> {
    match endpoint.split_once('.') {
        Some((element, connector)) if !element.is_empty() && !connector.is_empty() => {
            Ok((element.to_owned(), connector.to_owned()))
        }
        _ => Err(StructureError::MalformedEndpoint {
            endpoint: endpoint.to_owned(),
        }),
    }
}

/// Named aggregate of components and connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    /// System name.
    pub name: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Components keyed by instance name.
    #[serde(default)]
    pub components: IndexMap<String, Component>,
    /// Connections in declaration order.
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl System {
    /// Look up a component by instance name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }
}

/// Vendor annotation with opaque XML content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Vendor identifier, emitted as the `type` attribute.
    pub kind: String,
    /// Raw inner markup, canonicalized on emission.
    pub content: String,
}

impl Annotation {
    /// Construct an annotation from a vendor identifier and raw markup.
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
        }
    }
}

/// Simulation-wide defaults not tied to any component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefaultExperiment {
    /// Suggested simulation start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    /// Suggested simulation stop time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<f64>,
    /// Vendor annotations in declaration order.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

/// Prefix/URI pair qualifying vendor annotation content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Short prefix, e.g. `osp`.
    pub prefix: String,
    /// Namespace URI the prefix maps to.
    pub uri: String,
}

impl Namespace {
    /// Prefixes bound to the SSP standard vocabularies on every document.
    pub const RESERVED_PREFIXES: &'static [&'static str] = &["ssd", "ssc", "ssv"];

    /// Construct a namespace declaration.
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// True when the prefix belongs to the SSP standard set.
    pub fn is_reserved(prefix: &str) -> bool {
        Self::RESERVED_PREFIXES.contains(&prefix)
    }
}

/// Root of a system structure description document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStructureDescription {
    /// Description name, emitted on the document root.
    pub name: String,
    /// Schema version; only [`Self::SUPPORTED_VERSION`] is understood.
    pub version: String,
    /// The single top-level system.
    pub system: System,
    /// Optional experiment defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_experiment: Option<DefaultExperiment>,
    /// Additional namespace declarations beyond the SSP standard set.
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
}

impl SystemStructureDescription {
    /// The only SSP version this toolkit reads and writes.
    pub const SUPPORTED_VERSION: &'static str = "1.0";
}
