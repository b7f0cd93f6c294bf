use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

/// Command-line arguments for the assembler
#[derive(Debug)]
pub struct Args {
    /// Enable verbose output
    pub verbose: bool,

    /// Locate artifacts but don't build anything
    pub dry_run: bool,

    /// Leave the staging tree in place after the run
    pub no_cleanup: bool,

    /// Package layout file
    pub layout: PathBuf,

    /// Directory holding the downloaded CI artifacts
    pub directory: PathBuf,

    /// Directory holding common support artifacts
    pub common: PathBuf,

    /// Release version, with or without a leading `v`
    pub nuget_version: String,

    /// Required artifact tags, as `key=value`
    pub matches: Vec<String>,

    /// Packer backend (`nuget` or `zip`)
    pub packer: String,

    /// NuGet CLI executable
    pub nuget: String,

    /// Output directory for the package
    pub output: PathBuf,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        let matches = Command::new("nuget-assembler")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Assemble a NuGet release package from CI build artifacts")
            .arg(
                Arg::new("layout")
                    .short('l')
                    .long("layout")
                    .value_name("FILE")
                    .env("NUGET_ASSEMBLER_LAYOUT")
                    .required(true)
                    .help("Package layout file (mapping table and expected files)"),
            )
            .arg(
                Arg::new("directory")
                    .short('d')
                    .long("directory")
                    .value_name("DIR")
                    .default_value("dl-6f")
                    .help("Download directory"),
            )
            .arg(
                Arg::new("common")
                    .long("common")
                    .value_name("DIR")
                    .default_value("common")
                    .help("Directory of common support artifacts (skipped if absent)"),
            )
            .arg(
                Arg::new("nuget-version")
                    .long("nuget-version")
                    .value_name("VERSION")
                    .env("NUGET_ASSEMBLER_VERSION")
                    .required(true)
                    .help("The nuget package version"),
            )
            .arg(
                Arg::new("match")
                    .long("match")
                    .value_name("KEY=VALUE")
                    .action(ArgAction::Append)
                    .help("Artifact tag that must match (default: tag=6f)"),
            )
            .arg(
                Arg::new("packer")
                    .long("packer")
                    .value_name("PACKER")
                    .value_parser(["nuget", "zip"])
                    .default_value("nuget")
                    .help("Packer used to produce the .nupkg"),
            )
            .arg(
                Arg::new("nuget")
                    .long("nuget")
                    .value_name("PATH")
                    .env("NUGET")
                    .default_value("nuget")
                    .help("NuGet CLI executable"),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .value_name("DIR")
                    .default_value(".")
                    .help("Output directory for the package"),
            )
            .arg(
                Arg::new("dry-run")
                    .long("dry-run")
                    .action(ArgAction::SetTrue)
                    .help("Locate artifacts but don't build anything"),
            )
            .arg(
                Arg::new("no-cleanup")
                    .long("no-cleanup")
                    .action(ArgAction::SetTrue)
                    .help("Don't clean up temporary folders"),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::SetTrue)
                    .help("Enable verbose output"),
            )
            .get_matches();

        let string = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();

        Self {
            verbose: matches.get_flag("verbose"),
            dry_run: matches.get_flag("dry-run"),
            no_cleanup: matches.get_flag("no-cleanup"),
            layout: PathBuf::from(string("layout")),
            directory: PathBuf::from(string("directory")),
            common: PathBuf::from(string("common")),
            nuget_version: string("nuget-version"),
            matches: matches
                .get_many::<String>("match")
                .map(|values| values.cloned().collect())
                .unwrap_or_else(|| vec!["tag=6f".to_string()]),
            packer: string("packer"),
            nuget: string("nuget"),
            output: PathBuf::from(string("output")),
        }
    }
}
