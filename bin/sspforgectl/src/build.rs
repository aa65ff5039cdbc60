//! ---
//! ssp_section: "06-command-line"
//! ssp_subsection: "binary"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Build subcommand assembling packages from scenario files."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use sspforge_package::{write_archive, write_directory};

use crate::scenario;

#[derive(Debug, Args)]
pub struct BuildCommand {
    /// Scenario file describing the package.
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Output path; defaults to the package name in the current directory.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write an expanded directory instead of a zip archive.
    #[arg(long, action = ArgAction::SetTrue)]
    expand: bool,

    /// Base directory for relative resource paths (defaults to the
    /// scenario file's directory).
    #[arg(long = "resource-root", value_name = "DIR")]
    resource_root: Option<PathBuf>,
}

impl BuildCommand {
    pub fn execute(self) -> Result<()> {
        let scenario = scenario::load(&self.scenario)?;
        let resource_root = match self.resource_root {
            Some(dir) => dir,
            None => self
                .scenario
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let package = scenario
            .assemble(&resource_root)
            .with_context(|| format!("failed to assemble scenario {}", self.scenario.display()))?;

        if self.expand {
            let out = self.output.unwrap_or_else(|| PathBuf::from(&package.name));
            write_directory(&package, &out)?;
            println!("Wrote expanded package to {}", out.display());
        } else {
            let out = self
                .output
                .unwrap_or_else(|| PathBuf::from(package.archive_file_name()));
            write_archive(&package, &out)?;
            println!("Wrote package archive to {}", out.display());
        }
        Ok(())
    }
}
