//! ---
//! ssp_section: "06-command-line"
//! ssp_subsection: "scenario"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "TOML scenario schema and assembly into a package."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
//! Scenario files are the declarative front end of the builder API. A
//! scenario describes one package: its name, the files to bundle under
//! `resources/`, and the system structure to generate. Value types in
//! `initial-values` follow the TOML literal: `400.0` becomes a Real,
//! `400` an Integer, `true` a Boolean, and quoted text a String.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use sspforge_builder::{
    ComponentBuilder, ExperimentBuilder, ParameterSetBuilder, SsdBuilder, SspBuilder, SystemBuilder,
};
use sspforge_model::{Connector, ConnectorKind, Parameter, SspPackage, Value, ValueKind};

/// Prefix registered for the step-size annotation namespace.
pub const OSP_NAMESPACE_PREFIX: &str = "osp";
/// Namespace URI of the OSP annotation vocabulary.
pub const OSP_NAMESPACE_URI: &str = "http://opensimulationplatform.com/SSP/OSPAnnotations";
/// Annotation type under which the co-simulation algorithm is recorded.
pub const OSP_ANNOTATION_KIND: &str = "com.opensimulationplatform";

const INITIAL_VALUES_SET: &str = "initialValues";

/// Root of a scenario file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Scenario {
    /// Package name; the archive is written as `<name>.ssp`.
    pub name: String,
    /// Files to bundle under `resources/`, relative to the resource root.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Structure document identity.
    pub ssd: SsdSection,
    /// The single top-level system.
    pub system: SystemSection,
    /// Component instances, in document order.
    #[serde(default)]
    pub component: Vec<ComponentSection>,
    /// Connections between component connectors.
    #[serde(default)]
    pub connection: Vec<ConnectionSection>,
    /// Optional default experiment settings.
    #[serde(default)]
    pub experiment: Option<ExperimentSection>,
    /// Extra namespaces used by raw annotation content.
    #[serde(default)]
    pub namespace: Vec<NamespaceSection>,
}

/// `[ssd]` table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SsdSection {
    /// Name attribute of the structure document.
    pub name: String,
}

/// `[system]` table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SystemSection {
    /// System name.
    pub name: String,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
}

/// One `[[component]]` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ComponentSection {
    /// Instance name, unique within the system.
    pub name: String,
    /// Package-relative source reference, e.g. `resources/chassis.fmu`.
    pub source: String,
    /// Declared connectors.
    #[serde(default)]
    pub connectors: Vec<ConnectorSection>,
    /// Start values applied through the `initialValues` parameter set.
    #[serde(default)]
    pub initial_values: IndexMap<String, Value>,
}

/// Connector entry inside a component.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConnectorSection {
    /// Connector name; dots and spaces are allowed.
    pub name: String,
    /// Causality, e.g. `input` or `output`.
    pub kind: ConnectorKind,
    /// Value type; defaults to `real`.
    #[serde(default = "default_value_kind", rename = "type")]
    pub value_kind: ValueKind,
}

fn default_value_kind() -> ValueKind {
    ValueKind::Real
}

/// One `[[connection]]` entry. Endpoints use `component.connector` form,
/// split on the first dot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConnectionSection {
    /// Source endpoint.
    pub start: String,
    /// Destination endpoint.
    pub end: String,
    /// Optional linear scaling factor; implies a transformation.
    #[serde(default)]
    pub factor: Option<f64>,
    /// Optional linear offset; implies a transformation.
    #[serde(default)]
    pub offset: Option<f64>,
}

/// `[experiment]` table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExperimentSection {
    /// Suggested simulation start time.
    #[serde(default)]
    pub start_time: Option<f64>,
    /// Suggested simulation stop time.
    #[serde(default)]
    pub stop_time: Option<f64>,
    /// Convenience for the common fixed-step co-simulation setup: records
    /// the step size as an OSP algorithm annotation and registers the
    /// `osp` namespace.
    #[serde(default)]
    pub fixed_step_size: Option<f64>,
    /// Raw annotation entries carried verbatim (after canonicalisation).
    #[serde(default)]
    pub annotation: Vec<AnnotationSection>,
}

/// One `[[experiment.annotation]]` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnnotationSection {
    /// Annotation type identifier, conventionally reverse-DNS.
    #[serde(rename = "type")]
    pub kind: String,
    /// Well-formed XML content; prefixes must be declared via `[[namespace]]`.
    pub content: String,
}

/// One `[[namespace]]` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NamespaceSection {
    /// Prefix as used inside annotation content.
    pub prefix: String,
    /// Namespace URI bound to the prefix.
    pub uri: String,
}

/// Reads and parses the scenario at `path`.
pub fn load(path: &Path) -> Result<Scenario> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    let scenario = toml::from_str(&raw)
        .with_context(|| format!("scenario {} is not valid", path.display()))?;
    Ok(scenario)
}

impl Scenario {
    /// Assembles the scenario into a package, resolving relative resource
    /// paths against `resource_root`.
    pub fn assemble(&self, resource_root: &Path) -> Result<SspPackage> {
        let mut system = SystemBuilder::new(&self.system.name);
        if let Some(description) = &self.system.description {
            system = system.description(description);
        }
        for component in &self.component {
            let mut builder = ComponentBuilder::new(&component.name, &component.source);
            for connector in &component.connectors {
                builder = builder.connector(Connector::new(
                    &connector.name,
                    connector.value_kind,
                    connector.kind,
                ));
            }
            if !component.initial_values.is_empty() {
                let mut set = ParameterSetBuilder::new(INITIAL_VALUES_SET);
                for (name, value) in &component.initial_values {
                    set = set.parameter(Parameter {
                        name: name.clone(),
                        value: value.clone(),
                        unit: None,
                    });
                }
                builder = builder.parameter_set(set);
            }
            system = system.component(builder);
        }
        for connection in &self.connection {
            system = match (connection.factor, connection.offset) {
                (None, None) => system.connection(&connection.start, &connection.end),
                (factor, offset) => system.scaled_connection(
                    &connection.start,
                    &connection.end,
                    factor.unwrap_or(1.0),
                    offset.unwrap_or(0.0),
                ),
            };
        }

        let mut structure = SsdBuilder::new(&self.ssd.name).system(system);
        for namespace in &self.namespace {
            structure = structure.namespace(&namespace.prefix, &namespace.uri);
        }
        if let Some(experiment) = &self.experiment {
            let mut settings = ExperimentBuilder::new();
            if let Some(start) = experiment.start_time {
                settings = settings.start(start);
            }
            if let Some(stop) = experiment.stop_time {
                settings = settings.stop(stop);
            }
            if let Some(step) = experiment.fixed_step_size {
                settings = settings.annotation(OSP_ANNOTATION_KIND, step_size_annotation(step));
                if !self
                    .namespace
                    .iter()
                    .any(|namespace| namespace.prefix == OSP_NAMESPACE_PREFIX)
                {
                    structure = structure.namespace(OSP_NAMESPACE_PREFIX, OSP_NAMESPACE_URI);
                }
            }
            for annotation in &experiment.annotation {
                settings = settings.annotation(&annotation.kind, &annotation.content);
            }
            structure = structure.default_experiment(settings);
        }

        let mut package = SspBuilder::new(&self.name).structure(structure);
        for resource in &self.resources {
            package = package.resource(resource_root.join(resource));
        }
        Ok(package.build()?)
    }
}

fn step_size_annotation(step: f64) -> String {
    format!("<osp:Algorithm><osp:FixedStepAlgorithm baseStepSize=\"{step}\"/></osp:Algorithm>")
}
