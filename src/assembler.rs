use crate::archive;
use crate::artifact::{Artifact, ArtifactSet};
use crate::context::Context;
use crate::layout::{MappingEntry, PackageLayout};
use crate::packer::Packer;
use crate::result::Result;
use crate::staging::Staging;
use crate::tpl::{Tpl, strip_version_prefix};
use crate::utils;
use std::path::PathBuf;

/// Outcome of a successful, non-dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub package: PathBuf,
    /// Set when the staging tree was kept on request.
    pub staging: Option<PathBuf>,
}

pub struct Assembler {
    ctx: Context,
    packer: Box<dyn Packer>,
}

impl Assembler {
    pub fn new(ctx: Context, packer: Box<dyn Packer>) -> Self {
        Self { ctx, packer }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Resolve every mapping entry without touching the file system.
    pub fn resolve_all<'a, 'l>(
        &self,
        layout: &'l PackageLayout,
        artifacts: &'a ArtifactSet,
    ) -> Result<Vec<(&'l MappingEntry, &'a Artifact)>> {
        layout
            .mapping
            .iter()
            .map(|entry| entry.selector.resolve(artifacts).map(|artifact| (entry, artifact)))
            .collect()
    }

    /// Build the staging tree for `layout`.
    ///
    /// Any failure drops the returned [`Staging`] before it escapes, which
    /// removes the partial tree.
    pub fn stage(&self, layout: &PackageLayout, artifacts: &ArtifactSet, version: &str) -> Result<Staging> {
        let version = strip_version_prefix(version);
        let staging = Staging::create(&self.ctx.work_dir, "release", self.ctx.retain_staging)?;

        for source in &layout.support_files {
            let name = source.file_name().unwrap_or(source.as_os_str());
            utils::copy_recursively(source, &staging.path().join(name))?;
        }

        let mut tpl = Tpl::new();
        tpl.register("VERSION", version);
        tpl.register("ID", layout.id.as_str());
        for template in &layout.templates {
            tpl.render_file(&template.source, &staging.join(&template.dest))?;
        }

        for entry in &layout.mapping {
            let artifact = entry.selector.resolve(artifacts)?;
            log::debug!(
                "{} <- {}:{} ({})",
                entry.dest,
                artifact.filename(),
                entry.member,
                artifact.tag("variant").unwrap_or("-")
            );
            archive::extract(artifact.path(), &entry.member, &staging.join(&entry.dest))?;
        }

        log::info!("Tree extracted to {}", staging.path().display());
        Ok(staging)
    }

    /// Stage and pack `layout`. Returns `None` for a dry run.
    pub fn assemble(&self, layout: &PackageLayout, artifacts: &ArtifactSet, version: &str) -> Result<Option<Assembly>> {
        if self.ctx.dry_run {
            for (entry, artifact) in self.resolve_all(layout, artifacts)? {
                log::info!("{} <- {}", entry.dest, artifact.path().display());
            }
            return Ok(None);
        }

        let staging = self.stage(layout, artifacts, version)?;
        let package = self
            .packer
            .pack(&self.ctx, layout, staging.path(), strip_version_prefix(version))?;

        let kept = staging.is_retained().then(|| staging.path().to_path_buf());
        Ok(Some(Assembly {
            package,
            staging: kept,
        }))
    }
}
