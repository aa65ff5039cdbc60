//! ---
//! ssp_section: "07-integration-tests"
//! ssp_subsection: "integration-tests"
//! ssp_type: "test"
//! ssp_scope: "verification"
//! ssp_description: "Checks that file and endpoint resolution stay deferred to use."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use std::path::Path;

use sspforge_builder::{ComponentBuilder, SsdBuilder, SspBuilder, SystemBuilder};
use sspforge_model::SspPackage;
use sspforge_package::{write_archive, PackageError};
use sspforge_xml::{parse_ssd, render_ssd};

fn ghost_package() -> SspPackage {
    // Sources and endpoints reference things that do not exist anywhere.
    SspBuilder::new("ghost")
        .resource("models/never/written.fmu")
        .structure(
            SsdBuilder::new("Ghost")
                .system(
                    SystemBuilder::new("Ghost")
                        .component(ComponentBuilder::new("box", "resources/written.fmu"))
                        .connection("box.phantom port", "elsewhere.another port"),
                )
        )
        .build()
        .unwrap()
}

#[test]
fn assembly_never_touches_the_filesystem() {
    let package = ghost_package();
    assert_eq!(package.resources.len(), 1);
    assert!(!Path::new("models/never/written.fmu").exists());
}

#[test]
fn unresolved_endpoints_render_and_parse() {
    let package = ghost_package();
    let document = render_ssd(&package.structure).unwrap();
    let parsed = parse_ssd(&document).unwrap();
    assert_eq!(parsed.system.connections[0].end_element, "elsewhere");
}

#[test]
fn packaging_is_where_missing_files_surface() {
    let scratch = tempfile::tempdir().unwrap();
    let package = ghost_package();
    let err = write_archive(&package, &scratch.path().join("ghost.ssp")).unwrap_err();
    assert!(matches!(err, PackageError::MissingResource(_)));
}
