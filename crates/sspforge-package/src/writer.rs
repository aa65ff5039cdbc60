//! ---
//! ssp_section: "05-packaging"
//! ssp_subsection: "writer"
//! ssp_type: "module"
//! ssp_scope: "runtime"
//! ssp_description: "Deterministic emission of expanded package directories and .ssp archives."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---

use std::fs;
use std::io::Write;
use std::path::Path;

use sspforge_model::{package::is_precompressed, SspPackage};
use sspforge_xml::render_ssd;
use tracing::info;

use crate::{PackageError, Result, STRUCTURE_FILE_NAME};

/// Writes `package` as an expanded directory rooted at `dir`.
///
/// The directory is created if needed. The structure document lands at the
/// root and every resource is copied under its registered target path. Fails
/// with [`PackageError::MissingResource`] before touching the destination if
/// any resource source file is absent.
pub fn write_directory(package: &SspPackage, dir: &Path) -> Result<()> {
    let document = render_ssd(&package.structure)?;
    check_resources(package)?;

    fs::create_dir_all(dir)?;
    fs::write(dir.join(STRUCTURE_FILE_NAME), &document)?;
    for resource in &package.resources {
        let target = dir.join(&resource.target);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&resource.source, &target)?;
    }

    info!(
        dir = %dir.display(),
        resources = package.resources.len(),
        "wrote expanded package directory"
    );
    Ok(())
}

/// Writes `package` as a zip archive at `path`.
///
/// Entry order is fixed: the structure document first, then resources in
/// registration order. The document is deflated; resources that are already
/// compressed containers (`.fmu`, `.zip`, `.ssp`) are stored as-is. No
/// timestamps are recorded, so repeated runs over the same inputs produce
/// byte-identical archives.
pub fn write_archive(package: &SspPackage, path: &Path) -> Result<()> {
    let document = render_ssd(&package.structure)?;
    check_resources(package)?;

    let mut buf = Vec::new();
    let mut archive = rawzip::ZipArchiveWriter::new(&mut buf);
    append_entry(&mut archive, STRUCTURE_FILE_NAME, document.as_bytes(), false)?;
    for resource in &package.resources {
        let data = fs::read(&resource.source)?;
        let store = is_precompressed(&resource.source);
        append_entry(&mut archive, &resource.target, &data, store)?;
    }
    archive.finish().map_err(archive_error)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, &buf)?;

    info!(
        path = %path.display(),
        resources = package.resources.len(),
        bytes = buf.len(),
        "wrote package archive"
    );
    Ok(())
}

fn check_resources(package: &SspPackage) -> Result<()> {
    for resource in &package.resources {
        if !resource.source.is_file() {
            return Err(PackageError::MissingResource(resource.source.clone()));
        }
    }
    Ok(())
}

fn append_entry<W: Write>(
    archive: &mut rawzip::ZipArchiveWriter<W>,
    name: &str,
    data: &[u8],
    store: bool,
) -> Result<()> {
    if store {
        let mut entry = archive
            .new_file(name)
            .compression_method(rawzip::CompressionMethod::Store)
            .create()
            .map_err(archive_error)?;
        let mut writer = rawzip::ZipDataWriter::new(&mut entry);
        writer.write_all(data)?;
        let (_, descriptor) = writer.finish().map_err(archive_error)?;
        entry.finish(descriptor).map_err(archive_error)?;
    } else {
        let mut entry = archive
            .new_file(name)
            .compression_method(rawzip::CompressionMethod::Deflate)
            .create()
            .map_err(archive_error)?;
        let encoder =
            flate2::write::DeflateEncoder::new(&mut entry, flate2::Compression::default());
        let mut writer = rawzip::ZipDataWriter::new(encoder);
        writer.write_all(data)?;
        let (encoder, descriptor) = writer.finish().map_err(archive_error)?;
        encoder.finish()?;
        entry.finish(descriptor).map_err(archive_error)?;
    }
    Ok(())
}

fn archive_error(err: rawzip::Error) -> PackageError {
    PackageError::Archive(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sspforge_builder::{ComponentBuilder, SsdBuilder, SspBuilder, SystemBuilder};
    use sspforge_model::SspPackage;

    use super::{write_archive, write_directory};
    use crate::PackageError;

    fn sample_package(resource_dir: &std::path::Path) -> SspPackage {
        let fmu = resource_dir.join("osc.fmu");
        fs::write(&fmu, b"fake model archive bytes").unwrap();
        SspBuilder::new("oscillator")
            .resource(&fmu)
            .structure(
                SsdBuilder::new("Oscillator")
                    .system(SystemBuilder::new("Oscillator").component(ComponentBuilder::new(
                        "osc",
                        "resources/osc.fmu",
                    ))),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn archives_are_byte_identical_across_runs() {
        let scratch = tempfile::tempdir().unwrap();
        let package = sample_package(scratch.path());

        let first = scratch.path().join("first.ssp");
        let second = scratch.path().join("second.ssp");
        write_archive(&package, &first).unwrap();
        write_archive(&package, &second).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn missing_resource_files_fail_before_writing() {
        let scratch = tempfile::tempdir().unwrap();
        let mut package = sample_package(scratch.path());
        fs::remove_file(&package.resources[0].source).unwrap();
        package.resources[0].source = scratch.path().join("gone.fmu");

        let out = scratch.path().join("out.ssp");
        let err = write_archive(&package, &out).unwrap_err();
        assert!(matches!(err, PackageError::MissingResource(_)));
        assert!(!out.exists());

        let err = write_directory(&package, &scratch.path().join("out")).unwrap_err();
        assert!(matches!(err, PackageError::MissingResource(_)));
    }
}
