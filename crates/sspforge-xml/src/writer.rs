//! ---
//! ssp_section: "04-serialization"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Deterministic SystemStructure.ssd writer."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use sspforge_model::{
    Annotation, Component, Connection, Connector, DefaultExperiment, Namespace, Parameter,
    ParameterSet, StructureError, System, SystemStructureDescription,
};

use crate::canon::{self, escape_xml, push_indent, NamespaceTable};
use crate::XmlError;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Render a structure description as a complete `.ssd` document.
///
/// Output is deterministic: same structure in, same bytes out. Floats
/// use their shortest round-trip form and no timestamp is embedded.
pub fn render_ssd(description: &SystemStructureDescription) -> Result<String, XmlError> {
    validate_extras(&description.namespaces)?;
    let table = NamespaceTable::with_extras(&description.namespaces);
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    out.push_str("<ssd:SystemStructureDescription");
    for (prefix, uri) in table.entries() {
        out.push_str(" xmlns:");
        out.push_str(prefix);
        out.push_str("=\"");
        out.push_str(&escape_xml(uri));
        out.push('"');
    }
    push_attribute(&mut out, "name", &description.name);
    push_attribute(&mut out, "version", &description.version);
    out.push_str(">\n");
    render_system(&mut out, 1, &description.system);
    if let Some(experiment) = &description.default_experiment {
        render_default_experiment(&mut out, 1, experiment, &table)?;
    }
    out.push_str("</ssd:SystemStructureDescription>\n");
    Ok(out)
}

fn validate_extras(namespaces: &[Namespace]) -> Result<(), XmlError> {
    for (index, namespace) in namespaces.iter().enumerate() {
        if Namespace::is_reserved(&namespace.prefix) {
            return Err(StructureError::ReservedNamespace {
                prefix: namespace.prefix.clone(),
            }
            .into());
        }
        if namespaces[..index]
            .iter()
            .any(|seen| seen.prefix == namespace.prefix)
        {
            return Err(StructureError::DuplicateNamespace {
                prefix: namespace.prefix.clone(),
            }
            .into());
        }
    }
    Ok(())
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_xml(value));
    out.push('"');
}

fn render_system(out: &mut String, level: usize, system: &System) {
    push_indent(out, level);
    out.push_str("<ssd:System");
    push_attribute(out, "name", &system.name);
    if let Some(description) = &system.description {
        push_attribute(out, "description", description);
    }
    if system.components.is_empty() && system.connections.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    if !system.components.is_empty() {
        push_indent(out, level + 1);
        out.push_str("<ssd:Elements>\n");
        for component in system.components.values() {
            render_component(out, level + 2, component);
        }
        push_indent(out, level + 1);
        out.push_str("</ssd:Elements>\n");
    }
    if !system.connections.is_empty() {
        push_indent(out, level + 1);
        out.push_str("<ssd:Connections>\n");
        for connection in &system.connections {
            render_connection(out, level + 2, connection);
        }
        push_indent(out, level + 1);
        out.push_str("</ssd:Connections>\n");
    }
    push_indent(out, level);
    out.push_str("</ssd:System>\n");
}

fn render_component(out: &mut String, level: usize, component: &Component) {
    push_indent(out, level);
    out.push_str("<ssd:Component");
    push_attribute(out, "name", &component.name);
    push_attribute(out, "source", &component.source);
    if component.connectors.is_empty() && component.parameter_sets.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    if !component.connectors.is_empty() {
        push_indent(out, level + 1);
        out.push_str("<ssd:Connectors>\n");
        for connector in component.connectors.values() {
            render_connector(out, level + 2, connector);
        }
        push_indent(out, level + 1);
        out.push_str("</ssd:Connectors>\n");
    }
    if !component.parameter_sets.is_empty() {
        push_indent(out, level + 1);
        out.push_str("<ssd:ParameterBindings>\n");
        for set in component.parameter_sets.values() {
            render_parameter_binding(out, level + 2, set);
        }
        push_indent(out, level + 1);
        out.push_str("</ssd:ParameterBindings>\n");
    }
    push_indent(out, level);
    out.push_str("</ssd:Component>\n");
}

fn render_connector(out: &mut String, level: usize, connector: &Connector) {
    push_indent(out, level);
    out.push_str("<ssd:Connector");
    push_attribute(out, "name", &connector.name);
    push_attribute(out, "kind", connector.kind.as_str());
    out.push_str(">\n");
    push_indent(out, level + 1);
    out.push_str("<ssc:");
    out.push_str(connector.value_kind.canonical_name());
    out.push_str("/>\n");
    push_indent(out, level);
    out.push_str("</ssd:Connector>\n");
}

fn render_parameter_binding(out: &mut String, level: usize, set: &ParameterSet) {
    push_indent(out, level);
    out.push_str("<ssd:ParameterBinding>\n");
    push_indent(out, level + 1);
    out.push_str("<ssd:ParameterValues>\n");
    push_indent(out, level + 2);
    out.push_str("<ssv:ParameterSet");
    push_attribute(out, "name", &set.name);
    push_attribute(out, "version", "1.0");
    if set.parameters.is_empty() {
        out.push_str("/>\n");
    } else {
        out.push_str(">\n");
        push_indent(out, level + 3);
        out.push_str("<ssv:Parameters>\n");
        for parameter in &set.parameters {
            render_parameter(out, level + 4, parameter);
        }
        push_indent(out, level + 3);
        out.push_str("</ssv:Parameters>\n");
        push_indent(out, level + 2);
        out.push_str("</ssv:ParameterSet>\n");
    }
    push_indent(out, level + 1);
    out.push_str("</ssd:ParameterValues>\n");
    push_indent(out, level);
    out.push_str("</ssd:ParameterBinding>\n");
}

fn render_parameter(out: &mut String, level: usize, parameter: &Parameter) {
    push_indent(out, level);
    out.push_str("<ssv:Parameter");
    push_attribute(out, "name", &parameter.name);
    out.push_str(">\n");
    push_indent(out, level + 1);
    out.push_str("<ssv:");
    out.push_str(parameter.value.kind().canonical_name());
    push_attribute(out, "value", &parameter.value.to_string());
    if let Some(unit) = &parameter.unit {
        push_attribute(out, "unit", unit);
    }
    out.push_str("/>\n");
    push_indent(out, level);
    out.push_str("</ssv:Parameter>\n");
}

fn render_connection(out: &mut String, level: usize, connection: &Connection) {
    push_indent(out, level);
    out.push_str("<ssd:Connection");
    push_attribute(out, "startElement", &connection.start_element);
    push_attribute(out, "startConnector", &connection.start_connector);
    push_attribute(out, "endElement", &connection.end_element);
    push_attribute(out, "endConnector", &connection.end_connector);
    match &connection.transformation {
        None => out.push_str("/>\n"),
        Some(transformation) => {
            out.push_str(">\n");
            push_indent(out, level + 1);
            out.push_str("<ssc:LinearTransformation");
            push_attribute(out, "factor", &transformation.factor.to_string());
            push_attribute(out, "offset", &transformation.offset.to_string());
            out.push_str("/>\n");
            push_indent(out, level);
            out.push_str("</ssd:Connection>\n");
        }
    }
}

fn render_default_experiment(
    out: &mut String,
    level: usize,
    experiment: &DefaultExperiment,
    table: &NamespaceTable<'_>,
) -> Result<(), XmlError> {
    push_indent(out, level);
    out.push_str("<ssd:DefaultExperiment");
    if let Some(start) = experiment.start {
        push_attribute(out, "startTime", &start.to_string());
    }
    if let Some(stop) = experiment.stop {
        push_attribute(out, "stopTime", &stop.to_string());
    }
    if experiment.annotations.is_empty() {
        out.push_str("/>\n");
        return Ok(());
    }
    out.push_str(">\n");
    push_indent(out, level + 1);
    out.push_str("<ssd:Annotations>\n");
    for annotation in &experiment.annotations {
        render_annotation(out, level + 2, annotation, table)?;
    }
    push_indent(out, level + 1);
    out.push_str("</ssd:Annotations>\n");
    push_indent(out, level);
    out.push_str("</ssd:DefaultExperiment>\n");
    Ok(())
}

fn render_annotation(
    out: &mut String,
    level: usize,
    annotation: &Annotation,
    table: &NamespaceTable<'_>,
) -> Result<(), XmlError> {
    let canonical = canon::canonicalize_with_table(&annotation.content, table)?;
    push_indent(out, level);
    out.push_str("<ssc:Annotation");
    push_attribute(out, "type", &annotation.kind);
    if canonical.is_empty() {
        out.push_str("/>\n");
        return Ok(());
    }
    out.push_str(">\n");
    for line in canonical.lines() {
        push_indent(out, level + 1);
        out.push_str(line);
        out.push('\n');
    }
    push_indent(out, level);
    out.push_str("</ssc:Annotation>\n");
    Ok(())
}
