//! ---
//! ssp_section: "05-packaging"
//! ssp_subsection: "loader"
//! ssp_type: "module"
//! ssp_scope: "runtime"
//! ssp_description: "Opens packages from expanded directories or .ssp archives."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---

use std::fs;
use std::path::{Component, Path, PathBuf};

use sspforge_model::SystemStructureDescription;
use sspforge_xml::parse_ssd;
use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use crate::{PackageError, Result, STRUCTURE_FILE_NAME};

/// A package opened from disk.
///
/// Archives are extracted into a temporary directory that lives as long as
/// this value and is removed when it is dropped, so resource paths resolved
/// through [`LoadedPackage::file`] stay valid for the lifetime of the load.
#[derive(Debug)]
pub struct LoadedPackage {
    structure: SystemStructureDescription,
    root: PathBuf,
    _extracted: Option<TempDir>,
}

impl LoadedPackage {
    /// The parsed structure document.
    pub fn structure(&self) -> &SystemStructureDescription {
        &self.structure
    }

    /// Directory holding the package contents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a source reference from the structure document to a path on
    /// disk.
    pub fn file(&self, source: &str) -> PathBuf {
        self.root.join(source)
    }

    /// Package-relative paths of every file under `resources/`, sorted.
    pub fn resources(&self) -> Vec<String> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(self.root.join("resources"))
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                entries.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
        entries.sort();
        entries
    }
}

/// Opens the package at `path`.
///
/// Directories are read in place. Anything else is treated as a zip archive
/// and extracted to a temporary directory first. Entries whose names would
/// escape the extraction root are rejected.
pub fn load(path: &Path) -> Result<LoadedPackage> {
    if !path.exists() {
        return Err(PackageError::NotFound(path.to_path_buf()));
    }

    let (root, extracted) = if path.is_dir() {
        (path.to_path_buf(), None)
    } else {
        let temp = TempDir::new()?;
        extract_archive(path, temp.path())?;
        (temp.path().to_path_buf(), Some(temp))
    };

    let structure_path = root.join(STRUCTURE_FILE_NAME);
    if !structure_path.is_file() {
        return Err(PackageError::MissingStructure(structure_path));
    }
    let document = fs::read_to_string(structure_path)?;
    let structure = parse_ssd(&document)?;

    debug!(root = %root.display(), name = %structure.name, "loaded package");
    Ok(LoadedPackage {
        structure,
        root,
        _extracted: extracted,
    })
}

/// Extracts the archive at `path` into `dest`, creating `dest` if needed.
///
/// Unlike [`load`], the extracted tree persists after the call. The archive
/// must carry a structure document at its root.
pub fn extract(path: &Path, dest: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PackageError::NotFound(path.to_path_buf()));
    }
    if path.is_dir() {
        return Err(PackageError::NotAnArchive(path.to_path_buf()));
    }

    fs::create_dir_all(dest)?;
    extract_archive(path, dest)?;

    let structure_path = dest.join(STRUCTURE_FILE_NAME);
    if !structure_path.is_file() {
        return Err(PackageError::MissingStructure(structure_path));
    }
    debug!(archive = %path.display(), dest = %dest.display(), "extracted package archive");
    Ok(())
}

fn extract_archive(path: &Path, out_dir: &Path) -> Result<()> {
    let buf = fs::read(path)?;
    let archive = rawzip::ZipArchive::from_slice(&buf).map_err(archive_error)?;
    for entry in archive.entries() {
        let entry = entry.map_err(archive_error)?;
        let name = entry
            .file_path()
            .try_normalize()
            .map_err(archive_error)?
            .as_ref()
            .to_string();
        let relative = Path::new(&name);
        if relative.is_absolute()
            || relative
                .components()
                .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(PackageError::MaliciousEntry { name });
        }

        let out_path = out_dir.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let located = archive.get_entry(entry.wayfinder()).map_err(archive_error)?;
        let data = located.data();
        let mut out = fs::File::create(&out_path)?;
        match entry.compression_method() {
            rawzip::CompressionMethod::Store => {
                std::io::copy(&mut &*data, &mut out)?;
            }
            rawzip::CompressionMethod::Deflate => {
                let mut decoder = flate2::read::DeflateDecoder::new(data);
                std::io::copy(&mut decoder, &mut out)?;
            }
            method => {
                return Err(PackageError::UnsupportedCompression {
                    name,
                    method: format!("{method:?}"),
                });
            }
        }
    }
    Ok(())
}

fn archive_error(err: rawzip::Error) -> PackageError {
    PackageError::Archive(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use sspforge_builder::{
        ComponentBuilder, ExperimentBuilder, ParameterSetBuilder, SsdBuilder, SspBuilder,
        SystemBuilder,
    };
    use sspforge_model::{Connector, ConnectorKind, SspPackage};

    use crate::{extract, load, write_archive, write_directory, PackageError, STRUCTURE_FILE_NAME};

    fn sample_package(resource_dir: &std::path::Path) -> SspPackage {
        let fmu = resource_dir.join("osc.fmu");
        fs::write(&fmu, b"fake model archive bytes").unwrap();
        SspBuilder::new("oscillator")
            .resource(&fmu)
            .structure(
                SsdBuilder::new("Oscillator")
                    .system(
                        SystemBuilder::new("Oscillator")
                            .component(
                                ComponentBuilder::new("osc", "resources/osc.fmu")
                                    .connector(Connector::real("x", ConnectorKind::Output))
                                    .parameter_set(
                                        ParameterSetBuilder::new("initialValues")
                                            .real("omega", 3.5),
                                    ),
                            ),
                    )
                    .default_experiment(ExperimentBuilder::new().start(0.0).stop(10.0)),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn directory_write_and_load_round_trip() {
        let scratch = tempfile::tempdir().unwrap();
        let package = sample_package(scratch.path());

        let out = scratch.path().join("oscillator");
        write_directory(&package, &out).unwrap();
        assert!(out.join(STRUCTURE_FILE_NAME).is_file());
        assert!(out.join("resources/osc.fmu").is_file());

        let loaded = load(&out).unwrap();
        assert_eq!(*loaded.structure(), package.structure);
        assert_eq!(loaded.resources(), vec!["resources/osc.fmu".to_string()]);
        assert!(loaded.file("resources/osc.fmu").is_file());
    }

    #[test]
    fn archive_write_and_load_round_trip() {
        let scratch = tempfile::tempdir().unwrap();
        let package = sample_package(scratch.path());

        let out = scratch.path().join(package.archive_file_name());
        write_archive(&package, &out).unwrap();

        let loaded = load(&out).unwrap();
        assert_eq!(*loaded.structure(), package.structure);
        assert_eq!(loaded.resources(), vec!["resources/osc.fmu".to_string()]);
        let extracted = fs::read(loaded.file("resources/osc.fmu")).unwrap();
        assert_eq!(extracted, b"fake model archive bytes");
    }

    #[test]
    fn extraction_persists_the_expanded_layout() {
        let scratch = tempfile::tempdir().unwrap();
        let package = sample_package(scratch.path());

        let archive = scratch.path().join(package.archive_file_name());
        write_archive(&package, &archive).unwrap();

        let dest = scratch.path().join("expanded");
        extract(&archive, &dest).unwrap();
        assert!(dest.join(STRUCTURE_FILE_NAME).is_file());
        assert!(dest.join("resources/osc.fmu").is_file());

        let err = extract(&dest, &scratch.path().join("again")).unwrap_err();
        assert!(matches!(err, PackageError::NotAnArchive(_)));
    }

    #[test]
    fn loading_a_missing_path_is_reported() {
        let scratch = tempfile::tempdir().unwrap();
        let err = load(&scratch.path().join("absent.ssp")).unwrap_err();
        assert!(matches!(err, PackageError::NotFound(_)));
    }

    #[test]
    fn directories_without_a_structure_document_are_rejected() {
        let scratch = tempfile::tempdir().unwrap();
        let err = load(scratch.path()).unwrap_err();
        assert!(matches!(err, PackageError::MissingStructure(_)));
    }

    #[test]
    fn entries_escaping_the_package_root_are_rejected() {
        let scratch = tempfile::tempdir().unwrap();
        let mut buf = Vec::new();
        let mut archive = rawzip::ZipArchiveWriter::new(&mut buf);
        let mut entry = archive
            .new_file("../escape.txt")
            .compression_method(rawzip::CompressionMethod::Store)
            .create()
            .unwrap();
        let mut writer = rawzip::ZipDataWriter::new(&mut entry);
        writer.write_all(b"payload").unwrap();
        let (_, descriptor) = writer.finish().unwrap();
        entry.finish(descriptor).unwrap();
        archive.finish().unwrap();

        let path = scratch.path().join("evil.ssp");
        fs::write(&path, &buf).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, PackageError::MaliciousEntry { .. }));
    }
}
