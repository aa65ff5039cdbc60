//! ---
//! ssp_section: "03-authoring-dsl"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Chained builders assembling immutable scenario packages."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
//! Builder DSL for declaring co-simulation scenarios.
//!
//! Declarations accumulate through by-value chaining and nothing is
//! validated along the way. The single fallible step is [`SspBuilder::build`],
//! which assembles the immutable [`SspPackage`] and reports the first
//! naming conflict, malformed endpoint, or malformed annotation it finds.
//! Annotation markup is canonicalized during assembly so that authored
//! whitespace never shows up in comparisons. Resource existence and
//! connection-endpoint resolution are deliberately not checked here: the
//! former is a packaging concern, the latter belongs to the consuming
//! runtime.
//!
//! ```
//! use sspforge_builder::{ComponentBuilder, SsdBuilder, SspBuilder, SystemBuilder};
//! use sspforge_model::{Connector, ConnectorKind};
//!
//! let package = SspBuilder::new("demo")
//!     .resource("fmus/source.fmu")
//!     .structure(
//!         SsdBuilder::new("Demo").system(
//!             SystemBuilder::new("Demo")
//!                 .component(
//!                     ComponentBuilder::new("source", "resources/source.fmu")
//!                         .connector(Connector::real("out", ConnectorKind::Output)),
//!                 )
//!                 .connection("source.out", "sink.in"),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//! assert_eq!(package.structure.system.components.len(), 1);
//! ```

use std::path::PathBuf;

use indexmap::IndexMap;
use sspforge_model::{
    Annotation, Component, Connection, Connector, DefaultExperiment, LinearTransformation,
    Namespace, Parameter, ParameterSet, Resource, Result, SspPackage, StructureError, System,
    SystemStructureDescription,
};

/// Top-level builder pairing a structure description with its resources.
#[derive(Debug)]
pub struct SspBuilder {
    name: String,
    resources: Vec<PathBuf>,
    structure: Option<SsdBuilder>,
}

impl SspBuilder {
    /// Start a package declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
            structure: None,
        }
    }

    /// Register a file to be carried under `resources/` in the package.
    ///
    /// The path is recorded as-is; whether the file exists is only
    /// checked when the package is written out.
    pub fn resource(mut self, path: impl Into<PathBuf>) -> Self {
        self.resources.push(path.into());
        self
    }

    /// Attach the structure description declaration.
    pub fn structure(mut self, structure: SsdBuilder) -> Self {
        self.structure = Some(structure);
        self
    }

    /// Assemble the immutable package.
    pub fn build(self) -> Result<SspPackage> {
        let Self {
            name,
            resources,
            structure,
        } = self;
        let structure = structure
            .ok_or_else(|| StructureError::MissingStructure {
                package: name.clone(),
            })?
            .build()?;
        let mut packed: Vec<Resource> = Vec::with_capacity(resources.len());
        for path in resources {
            let resource = Resource::new(path)?;
            if packed.iter().any(|seen| seen.target == resource.target) {
                return Err(StructureError::DuplicateResource {
                    target: resource.target,
                    path: resource.source.display().to_string(),
                });
            }
            packed.push(resource);
        }
        Ok(SspPackage {
            name,
            structure,
            resources: packed,
        })
    }
}

/// Builder for the structure description root.
#[derive(Debug)]
pub struct SsdBuilder {
    name: String,
    system: Option<SystemBuilder>,
    default_experiment: Option<ExperimentBuilder>,
    namespaces: Vec<Namespace>,
}

impl SsdBuilder {
    /// Start a structure description declaration.
    ///
    /// The emitted document always carries version
    /// [`SystemStructureDescription::SUPPORTED_VERSION`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: None,
            default_experiment: None,
            namespaces: Vec::new(),
        }
    }

    /// Attach the single top-level system.
    pub fn system(mut self, system: SystemBuilder) -> Self {
        self.system = Some(system);
        self
    }

    /// Attach experiment defaults.
    pub fn default_experiment(mut self, experiment: ExperimentBuilder) -> Self {
        self.default_experiment = Some(experiment);
        self
    }

    /// Declare an extra namespace for qualifying annotation content.
    pub fn namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.push(Namespace::new(prefix, uri));
        self
    }

    fn build(self) -> Result<SystemStructureDescription> {
        let Self {
            name,
            system,
            default_experiment,
            namespaces,
        } = self;
        let system = system
            .ok_or_else(|| StructureError::MissingSystem {
                descriptor: name.clone(),
            })?
            .build()?;
        for (index, namespace) in namespaces.iter().enumerate() {
            if Namespace::is_reserved(&namespace.prefix) {
                return Err(StructureError::ReservedNamespace {
                    prefix: namespace.prefix.clone(),
                });
            }
            if namespaces[..index]
                .iter()
                .any(|seen| seen.prefix == namespace.prefix)
            {
                return Err(StructureError::DuplicateNamespace {
                    prefix: namespace.prefix.clone(),
                });
            }
        }
        let default_experiment = match default_experiment {
            None => None,
            Some(experiment) => {
                let mut experiment = experiment.build();
                // Canonicalizing here keeps an assembled structure equal
                // to the same structure read back from an emitted document.
                for annotation in &mut experiment.annotations {
                    annotation.content = sspforge_xml::canonicalize_annotation_content(
                        &annotation.content,
                        &namespaces,
                    )
                    .map_err(|err| StructureError::InvalidAnnotation {
                        kind: annotation.kind.clone(),
                        detail: err.to_string(),
                    })?;
                }
                Some(experiment)
            }
        };
        Ok(SystemStructureDescription {
            name,
            version: SystemStructureDescription::SUPPORTED_VERSION.to_owned(),
            system,
            default_experiment,
            namespaces,
        })
    }
}

#[derive(Debug)]
struct ConnectionDecl {
    start: String,
    end: String,
    transformation: Option<LinearTransformation>,
}

/// Builder for a system's components and connections.
#[derive(Debug)]
pub struct SystemBuilder {
    name: String,
    description: Option<String>,
    components: Vec<ComponentBuilder>,
    connections: Vec<ConnectionDecl>,
}

impl SystemBuilder {
    /// Start a system declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            components: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Attach a human-readable description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Declare a component instance.
    pub fn component(mut self, component: ComponentBuilder) -> Self {
        self.components.push(component);
        self
    }

    /// Declare a connection between two `component.port` endpoints.
    ///
    /// The component name ends at the first dot. Endpoints are not
    /// resolved against declared components or connectors.
    pub fn connection(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.connections.push(ConnectionDecl {
            start: start.into(),
            end: end.into(),
            transformation: None,
        });
        self
    }

    /// Declare a connection carrying a linear transformation.
    pub fn scaled_connection(
        mut self,
        start: impl Into<String>,
        end: impl Into<String>,
        factor: f64,
        offset: f64,
    ) -> Self {
        self.connections.push(ConnectionDecl {
            start: start.into(),
            end: end.into(),
            transformation: Some(LinearTransformation { factor, offset }),
        });
        self
    }

    fn build(self) -> Result<System> {
        let Self {
            name,
            description,
            components,
            connections,
        } = self;
        let mut built: IndexMap<String, Component> = IndexMap::with_capacity(components.len());
        for component in components {
            let component = component.build()?;
            if built.contains_key(&component.name) {
                return Err(StructureError::DuplicateComponent {
                    system: name,
                    name: component.name,
                });
            }
            built.insert(component.name.clone(), component);
        }
        let mut wired = Vec::with_capacity(connections.len());
        for decl in connections {
            let mut connection = Connection::between(&decl.start, &decl.end)?;
            connection.transformation = decl.transformation;
            wired.push(connection);
        }
        Ok(System {
            name,
            description,
            components: built,
            connections: wired,
        })
    }
}

/// Builder for a component's connectors and parameter bindings.
#[derive(Debug)]
pub struct ComponentBuilder {
    name: String,
    source: String,
    connectors: Vec<Connector>,
    parameter_sets: Vec<ParameterSetBuilder>,
}

impl ComponentBuilder {
    /// Start a component declaration bound to a resource reference.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            connectors: Vec::new(),
            parameter_sets: Vec::new(),
        }
    }

    /// Declare a connector.
    pub fn connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Declare a parameter set binding.
    pub fn parameter_set(mut self, set: ParameterSetBuilder) -> Self {
        self.parameter_sets.push(set);
        self
    }

    fn build(self) -> Result<Component> {
        let Self {
            name,
            source,
            connectors,
            parameter_sets,
        } = self;
        let mut ports: IndexMap<String, Connector> = IndexMap::with_capacity(connectors.len());
        for connector in connectors {
            if ports.contains_key(&connector.name) {
                return Err(StructureError::DuplicateConnector {
                    component: name,
                    name: connector.name,
                });
            }
            ports.insert(connector.name.clone(), connector);
        }
        let mut bindings: IndexMap<String, ParameterSet> =
            IndexMap::with_capacity(parameter_sets.len());
        for set in parameter_sets {
            let set = set.build();
            if bindings.contains_key(&set.name) {
                return Err(StructureError::DuplicateParameterSet {
                    component: name,
                    name: set.name,
                });
            }
            bindings.insert(set.name.clone(), set);
        }
        Ok(Component {
            name,
            source,
            connectors: ports,
            parameter_sets: bindings,
        })
    }
}

/// Builder for a named parameter set.
#[derive(Debug)]
pub struct ParameterSetBuilder {
    name: String,
    parameters: Vec<Parameter>,
}

impl ParameterSetBuilder {
    /// Start a parameter set declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a pre-constructed parameter, e.g. one carrying a unit.
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Add a real-valued entry.
    pub fn real(self, name: impl Into<String>, value: f64) -> Self {
        self.parameter(Parameter::real(name, value))
    }

    /// Add an integer-valued entry.
    pub fn integer(self, name: impl Into<String>, value: i64) -> Self {
        self.parameter(Parameter::integer(name, value))
    }

    /// Add a boolean-valued entry.
    pub fn boolean(self, name: impl Into<String>, value: bool) -> Self {
        self.parameter(Parameter::boolean(name, value))
    }

    /// Add a string-valued entry.
    pub fn string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter(Parameter::string(name, value))
    }

    fn build(self) -> ParameterSet {
        ParameterSet {
            name: self.name,
            parameters: self.parameters,
        }
    }
}

/// Builder for simulation-wide experiment defaults.
#[derive(Debug, Default)]
pub struct ExperimentBuilder {
    start: Option<f64>,
    stop: Option<f64>,
    annotations: Vec<Annotation>,
}

impl ExperimentBuilder {
    /// Start an experiment declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggested simulation start time.
    pub fn start(mut self, time: f64) -> Self {
        self.start = Some(time);
        self
    }

    /// Suggested simulation stop time.
    pub fn stop(mut self, time: f64) -> Self {
        self.stop = Some(time);
        self
    }

    /// Attach a vendor annotation with opaque inner markup.
    pub fn annotation(mut self, kind: impl Into<String>, content: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(kind, content));
        self
    }

    fn build(self) -> DefaultExperiment {
        DefaultExperiment {
            start: self.start,
            stop: self.stop,
            annotations: self.annotations,
        }
    }
}
