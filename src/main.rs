mod args;

use args::Args;
use nuget_assembler::artifact::{ArtifactSet, Tags, parse_tag};
use nuget_assembler::assembler::Assembler;
use nuget_assembler::context::Context;
use nuget_assembler::error::Error;
use nuget_assembler::layout::PackageLayout;
use nuget_assembler::packer::{NugetPacker, Packer, ZipPacker};
use nuget_assembler::result::Result;
use nuget_assembler::verify;
use std::path::PathBuf;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    cliclack::intro("nuget-assembler")?;

    let layout = {
        let spinner = cliclack::spinner();
        spinner.start("Loading layout...");
        match PackageLayout::load(&args.layout) {
            Ok(layout) => {
                spinner.stop(format!(
                    "Loaded layout for {} ({} mapping entries)",
                    layout.id,
                    layout.mapping.len()
                ));
                layout
            }
            Err(e) => {
                spinner.error("Failed to load layout");
                return Err(e);
            }
        }
    };

    let mut required = Tags::new();
    for tag in &args.matches {
        let (key, value) = parse_tag(tag)?;
        required.insert(key, value);
    }

    // Collect common local artifacts, such as support files.
    let mut artifacts = ArtifactSet::new();
    if args.common.is_dir() {
        artifacts.collect_local(&args.common, &required, false)?;
    }
    artifacts.collect_local(&args.directory, &required, true)?;
    if artifacts.is_empty() {
        return Err(Error::NoArtifacts {
            dir: args.directory.clone(),
        });
    }

    let listing: Vec<String> = artifacts
        .iter()
        .map(|a| format!(" {}", a.path().display()))
        .collect();
    cliclack::log::info(format!(
        "Collected artifacts ({}):\n{}",
        args.directory.display(),
        listing.join("\n")
    ))?;

    artifacts.enrich();

    let ctx = Context::new(PathBuf::from("."), args.output.clone())
        .with_verbose(args.verbose)
        .with_dry_run(args.dry_run)
        .with_retain_staging(args.no_cleanup);

    let packer: Box<dyn Packer> = match args.packer.as_str() {
        "zip" => Box::new(ZipPacker),
        _ => Box::new(NugetPacker::new(args.nuget.clone())),
    };
    let assembler = Assembler::new(ctx, packer);

    let assembly = {
        let spinner = cliclack::spinner();
        spinner.start("Building package...");
        match assembler.assemble(&layout, &artifacts, &args.nuget_version) {
            Ok(assembly) => {
                spinner.stop("Package built");
                assembly
            }
            Err(e) => {
                spinner.error("Package build failed");
                return Err(e);
            }
        }
    };

    let Some(assembly) = assembly else {
        cliclack::outro("Dry run: all artifacts located")?;
        return Ok(());
    };

    if let Some(staging) = &assembly.staging {
        cliclack::log::remark(format!("--no-cleanup: leaving {}", staging.display()))?;
    }

    let report = verify::verify(&assembly.package, &layout.expected);
    if !report.ok {
        cliclack::log::error(format!("{}: {}", assembly.package.display(), report))?;
        cliclack::outro_cancel("Package failed verification.")?;
        return Err(Error::custom(format!(
            "{} is missing {} expected files",
            assembly.package.display(),
            report.missing.len()
        )));
    }

    cliclack::log::success(report.to_string())?;
    cliclack::outro(format!("Created package: {}", assembly.package.display()))?;
    Ok(())
}
