//! ---
//! ssp_section: "07-integration-tests"
//! ssp_subsection: "integration-tests"
//! ssp_type: "test"
//! ssp_scope: "verification"
//! ssp_description: "Assembly failures for duplicate names across the structure."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use sspforge_builder::{ComponentBuilder, ParameterSetBuilder, SsdBuilder, SspBuilder, SystemBuilder};
use sspforge_model::{Connector, ConnectorKind, StructureError};

fn assemble(system: SystemBuilder) -> Result<(), StructureError> {
    SspBuilder::new("demo")
        .structure(SsdBuilder::new("Demo").system(system))
        .build()
        .map(|_| ())
}

#[test]
fn duplicate_component_names_fail_assembly() {
    let err = assemble(
        SystemBuilder::new("Demo")
            .component(ComponentBuilder::new("box", "resources/a.fmu"))
            .component(ComponentBuilder::new("box", "resources/b.fmu")),
    )
    .unwrap_err();
    assert!(matches!(err, StructureError::DuplicateComponent { .. }));
    assert!(err.to_string().contains("box"));
}

#[test]
fn duplicate_connector_names_fail_assembly() {
    let err = assemble(
        SystemBuilder::new("Demo").component(
            ComponentBuilder::new("box", "resources/a.fmu")
                .connector(Connector::real("p.e", ConnectorKind::Output))
                .connector(Connector::real("p.e", ConnectorKind::Input)),
        ),
    )
    .unwrap_err();
    assert!(matches!(err, StructureError::DuplicateConnector { .. }));
}

#[test]
fn duplicate_parameter_set_names_fail_assembly() {
    let err = assemble(
        SystemBuilder::new("Demo").component(
            ComponentBuilder::new("box", "resources/a.fmu")
                .parameter_set(ParameterSetBuilder::new("initialValues").real("x", 1.0))
                .parameter_set(ParameterSetBuilder::new("initialValues").real("y", 2.0)),
        ),
    )
    .unwrap_err();
    assert!(matches!(err, StructureError::DuplicateParameterSet { .. }));
}

#[test]
fn duplicate_resource_targets_fail_assembly() {
    let err = SspBuilder::new("demo")
        .resource("models/a/osc.fmu")
        .resource("models/b/osc.fmu")
        .structure(SsdBuilder::new("Demo").system(SystemBuilder::new("Demo")))
        .build()
        .unwrap_err();
    assert!(matches!(err, StructureError::DuplicateResource { .. }));
    assert!(err.to_string().contains("resources/osc.fmu"));
}

#[test]
fn reserved_namespace_prefixes_are_rejected() {
    let err = SspBuilder::new("demo")
        .structure(
            SsdBuilder::new("Demo")
                .system(SystemBuilder::new("Demo"))
                .namespace("ssd", "http://example.com/clash"),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, StructureError::ReservedNamespace { .. }));
}

#[test]
fn duplicate_namespace_prefixes_are_rejected() {
    let err = SspBuilder::new("demo")
        .structure(
            SsdBuilder::new("Demo")
                .system(SystemBuilder::new("Demo"))
                .namespace("osp", "http://example.com/one")
                .namespace("osp", "http://example.com/two"),
        )
        .build()
        .unwrap_err();
    assert!(matches!(err, StructureError::DuplicateNamespace { .. }));
}

#[test]
fn missing_structure_fails_assembly() {
    let err = SspBuilder::new("demo").build().unwrap_err();
    assert!(matches!(err, StructureError::MissingStructure { .. }));
}
