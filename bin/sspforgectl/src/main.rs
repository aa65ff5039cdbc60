//! ---
//! ssp_section: "06-command-line"
//! ssp_subsection: "binary"
//! ssp_type: "source"
//! ssp_scope: "code"
//! ssp_description: "Command-line tool for building, inspecting, and extracting .ssp packages."
//! ssp_version: "v0.1.0"
//! ssp_owner: "tbd"
//! ---
use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use sspforge_common::{init_tracing, VersionInfo};

mod build;
mod extract;
mod inspect;
mod scenario;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Authoring and inspection utility for .ssp co-simulation packages",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,
    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Enable debug logging"
    )]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Assemble a package from a scenario file")]
    Build(build::BuildCommand),
    #[command(about = "Summarise the contents of a package")]
    Inspect(inspect::InspectCommand),
    #[command(about = "Extract a package archive into a directory")]
    Extract(extract::ExtractCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.version {
        println!("{}", VersionInfo::current().extended());
        return Ok(());
    }
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    match command {
        Commands::Build(cmd) => cmd.execute()?,
        Commands::Inspect(cmd) => cmd.execute()?,
        Commands::Extract(cmd) => cmd.execute()?,
    }
    Ok(())
}
