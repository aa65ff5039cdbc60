//! ---
//! ssp_section: "05-packaging"
//! ssp_subsection: "entrypoint"
//! ssp_type: "library"
//! ssp_scope: "runtime"
//! ssp_description: "Packaging layer turning an assembled package into an .ssp archive or expanded directory, and back."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
//!
//! A package has two on-disk forms with identical layout: an expanded
//! directory, and a zip archive with the `.ssp` extension. Both carry the
//! structure document at the root under [`STRUCTURE_FILE_NAME`] and every
//! registered resource under `resources/`.
//!
//! Writing is deterministic. Entries are emitted in registration order with
//! fixed compression settings and no timestamps, so packaging the same
//! assembly twice produces byte-identical archives.

#![warn(missing_docs)]

use std::path::PathBuf;

mod loader;
mod writer;

pub use loader::{extract, load, LoadedPackage};
pub use writer::{write_archive, write_directory};

/// File name of the structure document at the package root.
pub const STRUCTURE_FILE_NAME: &str = "SystemStructure.ssd";

/// Errors raised while writing or loading packages.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// Underlying filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The structure document could not be rendered or parsed.
    #[error("structure document error: {0}")]
    Xml(#[from] sspforge_xml::XmlError),
    /// The given path names neither a directory nor an archive.
    #[error("no such package: {}", .0.display())]
    NotFound(PathBuf),
    /// Extraction was asked for something that is not an archive.
    #[error("not a package archive: {}", .0.display())]
    NotAnArchive(PathBuf),
    /// An expanded directory carries no structure document.
    #[error("package has no structure document: {}", .0.display())]
    MissingStructure(PathBuf),
    /// A registered resource points at a file that does not exist.
    #[error("resource file does not exist: {}", .0.display())]
    MissingResource(PathBuf),
    /// The zip container itself is damaged or could not be written.
    #[error("archive error: {0}")]
    Archive(String),
    /// An archive entry would escape the extraction directory.
    #[error("archive entry '{name}' escapes the package root")]
    MaliciousEntry {
        /// Entry name as stored in the archive.
        name: String,
    },
    /// An archive entry uses a compression method this crate does not read.
    #[error("archive entry '{name}' uses unsupported compression method {method}")]
    UnsupportedCompression {
        /// Entry name as stored in the archive.
        name: String,
        /// The offending method, as reported by the container.
        method: String,
    },
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, PackageError>;
