//! ---
//! ssp_section: "01-foundation"
//! ssp_subsection: "entrypoint"
//! ssp_type: "library"
//! ssp_scope: "runtime"
//! ssp_description: "Shared foundation utilities consumed across the workspace."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
//! Shared foundation pieces for the sspforge workspace: tracing setup for
//! the command-line surfaces and build version metadata.

#![warn(missing_docs)]

pub mod logging;
pub mod version;

pub use logging::init_tracing;
pub use version::{clap_long_version, VersionInfo};
