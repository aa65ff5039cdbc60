//! ---
//! ssp_section: "04-serialization"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Namespace-aware SystemStructure.ssd parser."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use indexmap::IndexMap;
use roxmltree::{Document, Node};
use sspforge_model::{
    Annotation, Component, Connection, Connector, ConnectorKind, DefaultExperiment,
    LinearTransformation, Namespace, Parameter, ParameterSet, StructureError, System,
    SystemStructureDescription, Value, ValueKind,
};
use tracing::warn;

use crate::canon::{self, NamespaceTable};
use crate::{XmlError, SSC_NAMESPACE, SSD_NAMESPACE, SSV_NAMESPACE};

/// Parse a `.ssd` document.
///
/// Elements are matched by namespace URI, so any prefix spelling is
/// accepted. Only SSP version `1.0` is understood. Model naming
/// invariants are enforced; connection endpoints that do not resolve to
/// declared components or connectors are logged as warnings and kept.
pub fn parse_ssd(text: &str) -> Result<SystemStructureDescription, XmlError> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    if root.tag_name().namespace() != Some(SSD_NAMESPACE)
        || root.tag_name().name() != "SystemStructureDescription"
    {
        return Err(XmlError::UnexpectedRoot {
            found: root.tag_name().name().to_owned(),
        });
    }
    let name = require_attribute(root, "name")?;
    let version = require_attribute(root, "version")?;
    if version != SystemStructureDescription::SUPPORTED_VERSION {
        return Err(XmlError::UnsupportedVersion {
            found: version.to_owned(),
        });
    }

    let namespaces = collect_extra_namespaces(root);
    let table = NamespaceTable::with_extras(&namespaces);

    let system_node =
        find_child(root, SSD_NAMESPACE, "System").ok_or_else(|| XmlError::MissingElement {
            parent: "SystemStructureDescription".to_owned(),
            element: "System".to_owned(),
        })?;
    let system = parse_system(system_node)?;

    let default_experiment = match find_child(root, SSD_NAMESPACE, "DefaultExperiment") {
        Some(node) => Some(parse_default_experiment(node, &table)?),
        None => None,
    };

    warn_unresolved_endpoints(&system);

    Ok(SystemStructureDescription {
        name: name.to_owned(),
        version: version.to_owned(),
        system,
        default_experiment,
        namespaces,
    })
}

fn collect_extra_namespaces(root: Node<'_, '_>) -> Vec<Namespace> {
    let mut extras = Vec::new();
    for namespace in root.namespaces() {
        let Some(prefix) = namespace.name() else {
            continue;
        };
        let uri = namespace.uri();
        if Namespace::is_reserved(prefix) || is_standard_uri(uri) {
            continue;
        }
        extras.push(Namespace::new(prefix, uri));
    }
    extras
}

fn is_standard_uri(uri: &str) -> bool {
    uri == SSD_NAMESPACE || uri == SSC_NAMESPACE || uri == SSV_NAMESPACE
}

fn is_element(node: Node<'_, '_>, uri: &str, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(uri)
        && node.tag_name().name() == local
}

fn find_child<'a, 'input>(
    node: Node<'a, 'input>,
    uri: &str,
    local: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_element(*child, uri, local))
}

fn require_attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, XmlError> {
    node.attribute(name)
        .ok_or_else(|| XmlError::MissingAttribute {
            element: node.tag_name().name().to_owned(),
            attribute: name.to_owned(),
        })
}

fn parse_f64(node: Node<'_, '_>, raw: &str) -> Result<f64, XmlError> {
    raw.parse().map_err(|_| XmlError::InvalidValue {
        element: node.tag_name().name().to_owned(),
        kind: "double",
        value: raw.to_owned(),
    })
}

fn parse_system(node: Node<'_, '_>) -> Result<System, XmlError> {
    let name = require_attribute(node, "name")?.to_owned();
    let description = node.attribute("description").map(str::to_owned);

    let mut components: IndexMap<String, Component> = IndexMap::new();
    if let Some(elements) = find_child(node, SSD_NAMESPACE, "Elements") {
        for child in elements.children() {
            if !is_element(child, SSD_NAMESPACE, "Component") {
                continue;
            }
            let component = parse_component(child)?;
            if components.contains_key(&component.name) {
                return Err(StructureError::DuplicateComponent {
                    system: name,
                    name: component.name,
                }
                .into());
            }
            components.insert(component.name.clone(), component);
        }
    }

    let mut connections = Vec::new();
    if let Some(wires) = find_child(node, SSD_NAMESPACE, "Connections") {
        for child in wires.children() {
            if !is_element(child, SSD_NAMESPACE, "Connection") {
                continue;
            }
            connections.push(parse_connection(child)?);
        }
    }

    Ok(System {
        name,
        description,
        components,
        connections,
    })
}

fn parse_component(node: Node<'_, '_>) -> Result<Component, XmlError> {
    let name = require_attribute(node, "name")?.to_owned();
    let source = require_attribute(node, "source")?.to_owned();

    let mut connectors: IndexMap<String, Connector> = IndexMap::new();
    if let Some(ports) = find_child(node, SSD_NAMESPACE, "Connectors") {
        for child in ports.children() {
            if !is_element(child, SSD_NAMESPACE, "Connector") {
                continue;
            }
            let connector = parse_connector(child)?;
            if connectors.contains_key(&connector.name) {
                return Err(StructureError::DuplicateConnector {
                    component: name,
                    name: connector.name,
                }
                .into());
            }
            connectors.insert(connector.name.clone(), connector);
        }
    }

    let mut parameter_sets: IndexMap<String, ParameterSet> = IndexMap::new();
    if let Some(bindings) = find_child(node, SSD_NAMESPACE, "ParameterBindings") {
        for child in bindings.children() {
            if !is_element(child, SSD_NAMESPACE, "ParameterBinding") {
                continue;
            }
            let Some(set) = parse_parameter_binding(child, &name)? else {
                continue;
            };
            if parameter_sets.contains_key(&set.name) {
                return Err(StructureError::DuplicateParameterSet {
                    component: name,
                    name: set.name,
                }
                .into());
            }
            parameter_sets.insert(set.name.clone(), set);
        }
    }

    Ok(Component {
        name,
        source,
        connectors,
        parameter_sets,
    })
}

fn parse_connector(node: Node<'_, '_>) -> Result<Connector, XmlError> {
    let name = require_attribute(node, "name")?.to_owned();
    let kind = require_attribute(node, "kind")?.parse::<ConnectorKind>()?;
    let value_kind = connector_value_kind(node).ok_or_else(|| XmlError::MissingElement {
        parent: format!("Connector '{name}'"),
        element: "connector type".to_owned(),
    })?;
    Ok(Connector {
        name,
        kind,
        value_kind,
    })
}

fn connector_value_kind(node: Node<'_, '_>) -> Option<ValueKind> {
    for child in node.children() {
        if !child.is_element() || child.tag_name().namespace() != Some(SSC_NAMESPACE) {
            continue;
        }
        if let Ok(kind) = child.tag_name().name().parse::<ValueKind>() {
            return Some(kind);
        }
    }
    None
}

/// Returns `Ok(None)` for bindings referencing an external `.ssv` file;
/// resolving those is left to the consuming runtime.
fn parse_parameter_binding(
    node: Node<'_, '_>,
    component: &str,
) -> Result<Option<ParameterSet>, XmlError> {
    let Some(values) = find_child(node, SSD_NAMESPACE, "ParameterValues") else {
        if let Some(source) = node.attribute("source") {
            warn!(
                component,
                source, "skipping external parameter binding; only inline values are read"
            );
            return Ok(None);
        }
        return Err(XmlError::MissingElement {
            parent: "ParameterBinding".to_owned(),
            element: "ParameterValues".to_owned(),
        });
    };
    let set_node =
        find_child(values, SSV_NAMESPACE, "ParameterSet").ok_or_else(|| XmlError::MissingElement {
            parent: "ParameterValues".to_owned(),
            element: "ParameterSet".to_owned(),
        })?;
    let name = require_attribute(set_node, "name")?.to_owned();
    let mut parameters = Vec::new();
    if let Some(list) = find_child(set_node, SSV_NAMESPACE, "Parameters") {
        for child in list.children() {
            if !is_element(child, SSV_NAMESPACE, "Parameter") {
                continue;
            }
            parameters.push(parse_parameter(child)?);
        }
    }
    Ok(Some(ParameterSet { name, parameters }))
}

fn parse_parameter(node: Node<'_, '_>) -> Result<Parameter, XmlError> {
    let name = require_attribute(node, "name")?.to_owned();
    let mut found = None;
    for child in node.children() {
        if !child.is_element() || child.tag_name().namespace() != Some(SSV_NAMESPACE) {
            continue;
        }
        if let Ok(kind) = child.tag_name().name().parse::<ValueKind>() {
            found = Some((kind, child));
            break;
        }
    }
    let (kind, type_node) = found.ok_or_else(|| XmlError::MissingElement {
        parent: format!("Parameter '{name}'"),
        element: "typed value".to_owned(),
    })?;
    let raw = require_attribute(type_node, "value")?;
    let value = parse_value(kind, raw, type_node)?;
    let unit = type_node.attribute("unit").map(str::to_owned);
    Ok(Parameter { name, value, unit })
}

fn parse_value(kind: ValueKind, raw: &str, node: Node<'_, '_>) -> Result<Value, XmlError> {
    let invalid = |expected: &'static str| XmlError::InvalidValue {
        element: node.tag_name().name().to_owned(),
        kind: expected,
        value: raw.to_owned(),
    };
    Ok(match kind {
        ValueKind::Real => Value::Real(raw.parse().map_err(|_| invalid("double"))?),
        ValueKind::Integer => Value::Integer(raw.parse().map_err(|_| invalid("integer"))?),
        ValueKind::Boolean => Value::Boolean(parse_bool(raw).ok_or_else(|| invalid("boolean"))?),
        ValueKind::String => Value::String(raw.to_owned()),
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_connection(node: Node<'_, '_>) -> Result<Connection, XmlError> {
    let start_element = require_attribute(node, "startElement")?.to_owned();
    let start_connector = require_attribute(node, "startConnector")?.to_owned();
    let end_element = require_attribute(node, "endElement")?.to_owned();
    let end_connector = require_attribute(node, "endConnector")?.to_owned();
    let transformation = match find_child(node, SSC_NAMESPACE, "LinearTransformation") {
        None => None,
        Some(transformation_node) => {
            let factor = match transformation_node.attribute("factor") {
                Some(raw) => parse_f64(transformation_node, raw)?,
                None => 1.0,
            };
            let offset = match transformation_node.attribute("offset") {
                Some(raw) => parse_f64(transformation_node, raw)?,
                None => 0.0,
            };
            Some(LinearTransformation { factor, offset })
        }
    };
    Ok(Connection {
        start_element,
        start_connector,
        end_element,
        end_connector,
        transformation,
    })
}

fn parse_default_experiment(
    node: Node<'_, '_>,
    table: &NamespaceTable<'_>,
) -> Result<DefaultExperiment, XmlError> {
    let start = match node.attribute("startTime") {
        Some(raw) => Some(parse_f64(node, raw)?),
        None => None,
    };
    let stop = match node.attribute("stopTime") {
        Some(raw) => Some(parse_f64(node, raw)?),
        None => None,
    };
    let mut annotations = Vec::new();
    if let Some(list) = find_child(node, SSD_NAMESPACE, "Annotations") {
        for child in list.children() {
            if !child.is_element() {
                continue;
            }
            let kind = require_attribute(child, "type")?.to_owned();
            let content = canon::canonicalize_children(child, table)?;
            annotations.push(Annotation { kind, content });
        }
    }
    Ok(DefaultExperiment {
        start,
        stop,
        annotations,
    })
}

fn warn_unresolved_endpoints(system: &System) {
    for connection in &system.connections {
        warn_endpoint(system, &connection.start_element, &connection.start_connector);
        warn_endpoint(system, &connection.end_element, &connection.end_connector);
    }
}

fn warn_endpoint(system: &System, element: &str, connector: &str) {
    match system.component(element) {
        None => warn!(
            element,
            connector, "connection endpoint references an undeclared component"
        ),
        Some(component) if component.connector(connector).is_none() => warn!(
            element,
            connector, "connection endpoint references an undeclared connector"
        ),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_ssd;

    fn fixture() -> SystemStructureDescription {
        let mut source_connectors = IndexMap::new();
        source_connectors.insert(
            "out".to_owned(),
            Connector::real("out", ConnectorKind::Output),
        );
        let mut source_sets = IndexMap::new();
        source_sets.insert(
            "initialValues".to_owned(),
            ParameterSet {
                name: "initialValues".to_owned(),
                parameters: vec![Parameter::real("gain", 2.5).with_unit("m")],
            },
        );
        let mut sink_connectors = IndexMap::new();
        sink_connectors.insert("in".to_owned(), Connector::real("in", ConnectorKind::Input));

        let mut components = IndexMap::new();
        components.insert(
            "source".to_owned(),
            Component {
                name: "source".to_owned(),
                source: "resources/source.fmu".to_owned(),
                connectors: source_connectors,
                parameter_sets: source_sets,
            },
        );
        components.insert(
            "sink".to_owned(),
            Component {
                name: "sink".to_owned(),
                source: "resources/sink.fmu".to_owned(),
                connectors: sink_connectors,
                parameter_sets: IndexMap::new(),
            },
        );

        SystemStructureDescription {
            name: "Demo".to_owned(),
            version: "1.0".to_owned(),
            system: System {
                name: "Demo".to_owned(),
                description: Some("Two boxes".to_owned()),
                components,
                connections: vec![Connection {
                    start_element: "source".to_owned(),
                    start_connector: "out".to_owned(),
                    end_element: "sink".to_owned(),
                    end_connector: "in".to_owned(),
                    transformation: Some(LinearTransformation {
                        factor: 2.0,
                        offset: 0.5,
                    }),
                }],
            },
            default_experiment: Some(DefaultExperiment {
                start: Some(0.0),
                stop: Some(10.0),
                annotations: vec![Annotation::new(
                    "com.opensimulationplatform",
                    "<osp:Algorithm>\n  <osp:FixedStepAlgorithm baseStepSize=\"0.001\"/>\n</osp:Algorithm>",
                )],
            }),
            namespaces: vec![Namespace::new(
                "osp",
                "http://opensimulationplatform.com/SSP/OSPAnnotations",
            )],
        }
    }

    #[test]
    fn rendered_document_matches_expected_layout() {
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<ssd:SystemStructureDescription xmlns:ssd="http://ssp-standard.org/SSP1/SystemStructureDescription" xmlns:ssc="http://ssp-standard.org/SSP1/SystemStructureCommon" xmlns:ssv="http://ssp-standard.org/SSP1/SystemStructureParameterValues" xmlns:osp="http://opensimulationplatform.com/SSP/OSPAnnotations" name="Demo" version="1.0">
  <ssd:System name="Demo" description="Two boxes">
    <ssd:Elements>
      <ssd:Component name="source" source="resources/source.fmu">
        <ssd:Connectors>
          <ssd:Connector name="out" kind="output">
            <ssc:Real/>
          </ssd:Connector>
        </ssd:Connectors>
        <ssd:ParameterBindings>
          <ssd:ParameterBinding>
            <ssd:ParameterValues>
              <ssv:ParameterSet name="initialValues" version="1.0">
                <ssv:Parameters>
                  <ssv:Parameter name="gain">
                    <ssv:Real value="2.5" unit="m"/>
                  </ssv:Parameter>
                </ssv:Parameters>
              </ssv:ParameterSet>
            </ssd:ParameterValues>
          </ssd:ParameterBinding>
        </ssd:ParameterBindings>
      </ssd:Component>
      <ssd:Component name="sink" source="resources/sink.fmu">
        <ssd:Connectors>
          <ssd:Connector name="in" kind="input">
            <ssc:Real/>
          </ssd:Connector>
        </ssd:Connectors>
      </ssd:Component>
    </ssd:Elements>
    <ssd:Connections>
      <ssd:Connection startElement="source" startConnector="out" endElement="sink" endConnector="in">
        <ssc:LinearTransformation factor="2" offset="0.5"/>
      </ssd:Connection>
    </ssd:Connections>
  </ssd:System>
  <ssd:DefaultExperiment startTime="0" stopTime="10">
    <ssd:Annotations>
      <ssc:Annotation type="com.opensimulationplatform">
        <osp:Algorithm>
          <osp:FixedStepAlgorithm baseStepSize="0.001"/>
        </osp:Algorithm>
      </ssc:Annotation>
    </ssd:Annotations>
  </ssd:DefaultExperiment>
</ssd:SystemStructureDescription>
"#;
        assert_eq!(render_ssd(&fixture()).unwrap(), expected);
    }

    #[test]
    fn round_trip_preserves_the_structure() {
        let original = fixture();
        let document = render_ssd(&original).unwrap();
        let reloaded = parse_ssd(&document).unwrap();
        assert_eq!(reloaded, original);
    }

    #[test]
    fn rendering_is_idempotent_through_a_parse() {
        let first = render_ssd(&fixture()).unwrap();
        let second = render_ssd(&parse_ssd(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let document = render_ssd(&fixture())
            .unwrap()
            .replace("version=\"1.0\">", "version=\"2.0\">");
        let err = parse_ssd(&document).unwrap_err();
        assert!(matches!(err, XmlError::UnsupportedVersion { ref found } if found == "2.0"));
    }

    #[test]
    fn unexpected_root_is_rejected() {
        let err = parse_ssd("<note xmlns=\"http://example.invalid\">hi</note>").unwrap_err();
        assert!(matches!(err, XmlError::UnexpectedRoot { .. }));
    }

    #[test]
    fn any_prefix_spelling_is_accepted() {
        let document = "<?xml version=\"1.0\"?>\n\
            <SystemStructureDescription xmlns=\"http://ssp-standard.org/SSP1/SystemStructureDescription\" name=\"Plain\" version=\"1.0\">\n\
              <System name=\"Plain\"/>\n\
            </SystemStructureDescription>";
        let parsed = parse_ssd(document).unwrap();
        assert_eq!(parsed.name, "Plain");
        assert!(parsed.system.components.is_empty());
        assert!(parsed.namespaces.is_empty());
    }

    #[test]
    fn duplicate_component_names_in_a_document_are_rejected() {
        let document = render_ssd(&fixture()).unwrap().replace(
            "name=\"sink\" source=\"resources/sink.fmu\"",
            "name=\"source\" source=\"resources/sink.fmu\"",
        );
        let err = parse_ssd(&document).unwrap_err();
        assert!(matches!(
            err,
            XmlError::Structure(StructureError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn external_parameter_bindings_are_skipped() {
        let document = "<?xml version=\"1.0\"?>\n\
            <ssd:SystemStructureDescription xmlns:ssd=\"http://ssp-standard.org/SSP1/SystemStructureDescription\" xmlns:ssc=\"http://ssp-standard.org/SSP1/SystemStructureCommon\" name=\"Ext\" version=\"1.0\">\n\
              <ssd:System name=\"Ext\">\n\
                <ssd:Elements>\n\
                  <ssd:Component name=\"box\" source=\"resources/box.fmu\">\n\
                    <ssd:ParameterBindings>\n\
                      <ssd:ParameterBinding source=\"resources/init.ssv\"/>\n\
                    </ssd:ParameterBindings>\n\
                  </ssd:Component>\n\
                </ssd:Elements>\n\
              </ssd:System>\n\
            </ssd:SystemStructureDescription>";
        let parsed = parse_ssd(document).unwrap();
        let component = parsed.system.component("box").unwrap();
        assert!(component.parameter_sets.is_empty());
    }

    #[test]
    fn transformation_attributes_default_to_identity() {
        let document = "<?xml version=\"1.0\"?>\n\
            <ssd:SystemStructureDescription xmlns:ssd=\"http://ssp-standard.org/SSP1/SystemStructureDescription\" xmlns:ssc=\"http://ssp-standard.org/SSP1/SystemStructureCommon\" name=\"Id\" version=\"1.0\">\n\
              <ssd:System name=\"Id\">\n\
                <ssd:Connections>\n\
                  <ssd:Connection startElement=\"a\" startConnector=\"x\" endElement=\"b\" endConnector=\"y\">\n\
                    <ssc:LinearTransformation/>\n\
                  </ssd:Connection>\n\
                </ssd:Connections>\n\
              </ssd:System>\n\
            </ssd:SystemStructureDescription>";
        let parsed = parse_ssd(document).unwrap();
        let transformation = parsed.system.connections[0].transformation.unwrap();
        assert_eq!(transformation.factor, 1.0);
        assert_eq!(transformation.offset, 0.0);
    }

    #[test]
    fn missing_required_attributes_are_reported() {
        let document = "<?xml version=\"1.0\"?>\n\
            <ssd:SystemStructureDescription xmlns:ssd=\"http://ssp-standard.org/SSP1/SystemStructureDescription\" version=\"1.0\">\n\
              <ssd:System name=\"x\"/>\n\
            </ssd:SystemStructureDescription>";
        let err = parse_ssd(document).unwrap_err();
        assert!(matches!(
            err,
            XmlError::MissingAttribute { ref attribute, .. } if attribute == "name"
        ));
    }
}
