//! ---
//! ssp_section: "02-structure-model"
//! ssp_subsection: "module"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Package-level model: resources and the packable scenario."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::structure::SystemStructureDescription;
use crate::StructureError;

/// File carried into the package `resources/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Source path on the authoring machine.
    pub source: PathBuf,
    /// Archive path the file is packed under, e.g. `resources/chassis.fmu`.
    pub target: String,
}

impl Resource {
    /// Derive the archive target from the source file name.
    ///
    /// The source is not required to exist yet; existence is checked
    /// when the package is written.
    pub fn new(source: impl Into<PathBuf>) -> crate::Result<Self> {
        let source = source.into();
        let file_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| StructureError::MalformedResource {
                path: source.display().to_string(),
            })?;
        let target = format!("resources/{file_name}");
        Ok(Self { source, target })
    }

    /// File name portion of the archive target.
    pub fn file_name(&self) -> &str {
        self.target
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.target)
    }
}

/// A complete scenario ready for packaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SspPackage {
    /// Package name, used as the default archive stem.
    pub name: String,
    /// The structure description written to `SystemStructure.ssd`.
    pub structure: SystemStructureDescription,
    /// Resources in registration order.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl SspPackage {
    /// Look up a resource by archive target.
    pub fn resource(&self, target: &str) -> Option<&Resource> {
        self.resources.iter().find(|res| res.target == target)
    }

    /// Default archive file name, `<name>.ssp`.
    pub fn archive_file_name(&self) -> String {
        format!("{}.ssp", self.name)
    }
}

/// True when the path points at a resource packed without recompression.
///
/// FMUs and other zip containers are already deflate-compressed, so they
/// are stored as-is.
pub fn is_precompressed(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("fmu" | "zip" | "ssp")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_target_uses_file_name() {
        let res = Resource::new("fmus/quarter_truck/chassis.fmu").unwrap();
        assert_eq!(res.target, "resources/chassis.fmu");
        assert_eq!(res.file_name(), "chassis.fmu");
    }

    #[test]
    fn resource_without_file_name_is_rejected() {
        assert!(Resource::new("..").is_err());
    }

    #[test]
    fn fmu_and_zip_resources_are_precompressed() {
        assert!(is_precompressed(Path::new("resources/chassis.fmu")));
        assert!(is_precompressed(Path::new("nested.zip")));
        assert!(!is_precompressed(Path::new("notes.txt")));
    }
}
