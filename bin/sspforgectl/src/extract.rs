//! ---
//! ssp_section: "06-command-line"
//! ssp_subsection: "binary"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Extract subcommand expanding package archives."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Package archive to extract.
    #[arg(value_name = "PACKAGE")]
    package: PathBuf,

    /// Destination directory; defaults to the archive name without its
    /// extension.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

impl ExtractCommand {
    pub fn execute(self) -> Result<()> {
        let dest = match self.output {
            Some(dir) => dir,
            None => default_destination(&self.package)?,
        };
        sspforge_package::extract(&self.package, &dest)
            .with_context(|| format!("failed to extract {}", self.package.display()))?;
        println!("Extracted {} to {}", self.package.display(), dest.display());
        Ok(())
    }
}

fn default_destination(package: &Path) -> Result<PathBuf> {
    let stem = package
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| {
            anyhow!(
                "cannot derive a destination directory from {}",
                package.display()
            )
        })?;
    Ok(package.with_file_name(stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_defaults_to_the_archive_stem() {
        let dest = default_destination(Path::new("out/quarter_truck.ssp")).unwrap();
        assert_eq!(dest, PathBuf::from("out/quarter_truck"));
    }
}
