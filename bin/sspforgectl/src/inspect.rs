//! ---
//! ssp_section: "06-command-line"
//! ssp_subsection: "binary"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Inspect subcommand summarising package contents."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use serde::Serialize;
use sspforge_model::{Component, Connection, SystemStructureDescription};

#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Package path: an .ssp archive or an expanded directory.
    #[arg(value_name = "PACKAGE")]
    package: PathBuf,

    /// Emit the structure as JSON instead of a text summary.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Serialize)]
struct InspectReport<'a> {
    structure: &'a SystemStructureDescription,
    resources: Vec<String>,
}

impl InspectCommand {
    pub fn execute(self) -> Result<()> {
        let loaded = sspforge_package::load(&self.package)
            .with_context(|| format!("failed to load package {}", self.package.display()))?;

        if self.json {
            let report = InspectReport {
                structure: loaded.structure(),
                resources: loaded.resources(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        print_summary(loaded.structure(), &loaded.resources());
        Ok(())
    }
}

fn print_summary(structure: &SystemStructureDescription, resources: &[String]) {
    println!("Package: {} (SSP {})", structure.name, structure.version);
    let system = &structure.system;
    match &system.description {
        Some(description) => println!("System: {} ({})", system.name, description),
        None => println!("System: {}", system.name),
    }

    if !system.components.is_empty() {
        println!("Components:");
        for component in system.components.values() {
            print_component(component);
        }
    }

    if !system.connections.is_empty() {
        println!("Connections:");
        for connection in &system.connections {
            println!("  {}", describe_connection(connection));
        }
    }

    if let Some(experiment) = &structure.default_experiment {
        let mut parts = Vec::new();
        if let Some(start) = experiment.start {
            parts.push(format!("start {start}"));
        }
        if let Some(stop) = experiment.stop {
            parts.push(format!("stop {stop}"));
        }
        if parts.is_empty() {
            println!("Default experiment:");
        } else {
            println!("Default experiment: {}", parts.join(", "));
        }
        for annotation in &experiment.annotations {
            println!("  annotation {}", annotation.kind);
        }
    }

    if !resources.is_empty() {
        println!("Resources:");
        for resource in resources {
            println!("  {resource}");
        }
    }
}

fn print_component(component: &Component) {
    println!("  {} <- {}", component.name, component.source);
    if !component.connectors.is_empty() {
        let connectors: Vec<String> = component
            .connectors
            .values()
            .map(|connector| {
                format!(
                    "{} ({} {})",
                    connector.name,
                    connector.kind,
                    connector.value_kind.canonical_name()
                )
            })
            .collect();
        println!("    connectors: {}", connectors.join(", "));
    }
    for set in component.parameter_sets.values() {
        let entries: Vec<String> = set
            .parameters
            .iter()
            .map(|parameter| match &parameter.unit {
                Some(unit) => format!("{} = {} {}", parameter.name, parameter.value, unit),
                None => format!("{} = {}", parameter.name, parameter.value),
            })
            .collect();
        println!("    {}: {}", set.name, entries.join(", "));
    }
}

fn describe_connection(connection: &Connection) -> String {
    let base = format!(
        "{}.{} -> {}.{}",
        connection.start_element,
        connection.start_connector,
        connection.end_element,
        connection.end_connector
    );
    match connection.transformation {
        Some(transformation) => format!(
            "{} (factor {}, offset {})",
            base, transformation.factor, transformation.offset
        ),
        None => base,
    }
}
