use crate::cmd;
use crate::context::Context;
use crate::error::Error;
use crate::layout::PackageLayout;
use crate::result::Result;
use crate::utils;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Packs a completed staging tree into the final package file.
pub trait Packer {
    /// Produce the package for `layout` from `staging` and return its path.
    fn pack(&self, ctx: &Context, layout: &PackageLayout, staging: &Path, version: &str) -> Result<PathBuf>;
}

/// Runs the NuGet CLI (`nuget pack`).
pub struct NugetPacker {
    program: String,
}

impl NugetPacker {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NugetPacker {
    fn default() -> Self {
        Self::new("nuget")
    }
}

impl Packer for NugetPacker {
    fn pack(&self, ctx: &Context, layout: &PackageLayout, staging: &Path, version: &str) -> Result<PathBuf> {
        utils::ensure_dir(&ctx.output_dir)?;
        let nuspec = staging.join(&layout.nuspec);
        let args = [
            OsStr::new("pack"),
            nuspec.as_os_str(),
            OsStr::new("-BasePath"),
            staging.as_os_str(),
            OsStr::new("-NonInteractive"),
            OsStr::new("-OutputDirectory"),
            ctx.output_dir.as_os_str(),
        ];
        cmd::execute_with_output(ctx, &self.program, &args)?;

        let package = ctx.output_dir.join(layout.package_filename(version));
        if !package.is_file() {
            return Err(Error::ExternalTool {
                program: self.program.clone(),
                code: 0,
                output: format!("expected package {} was not produced", package.display()),
            });
        }
        Ok(package)
    }
}

/// Zips the staging tree directly, for hosts without the NuGet CLI.
#[derive(Default)]
pub struct ZipPacker;

impl Packer for ZipPacker {
    fn pack(&self, ctx: &Context, layout: &PackageLayout, staging: &Path, version: &str) -> Result<PathBuf> {
        utils::ensure_dir(&ctx.output_dir)?;
        let package = ctx.output_dir.join(layout.package_filename(version));

        if let Err(e) = create_zip_file(staging, &package) {
            let _ = fs::remove_file(&package);
            return Err(e);
        }

        log::info!("Packed {} into {}", staging.display(), package.display());
        Ok(package)
    }
}

fn create_zip_file(source_dir: &Path, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut zip = ZipWriter::new(file);

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| Error::custom(e.to_string()))?;
        let name: Vec<String> = name
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        zip.start_file(name.join("/"), options)?;
        let mut f = File::open(entry.path())?;
        io::copy(&mut f, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}
