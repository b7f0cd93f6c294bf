use crate::artifact::Tags;
use crate::error::Error;
use crate::result::Result;
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayoutToml {
    pub id: String,

    pub nuspec: String,

    #[serde(default)]
    pub support_files: Vec<String>,

    #[serde(rename = "template", default)]
    pub templates: Vec<TemplateToml>,

    #[serde(rename = "mapping", default)]
    pub mappings: Vec<MappingToml>,

    #[serde(default)]
    pub expected: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TemplateToml {
    pub source: String,
    pub dest: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MappingToml {
    #[serde(default)]
    pub select: Tags,

    pub glob: String,

    #[serde(default)]
    pub excludes: Vec<String>,

    pub member: String,

    pub dest: String,
}

/// One slot of the package: which archive, which member, where it lands.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    pub selector: Selector,
    pub member: String,
    pub dest: String,
}

#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub source: PathBuf,
    pub dest: String,
}

/// Parsed and validated package layout
#[derive(Debug)]
pub struct PackageLayout {
    pub id: String,
    pub nuspec: String,
    pub support_files: Vec<PathBuf>,
    pub templates: Vec<TemplateFile>,
    pub mapping: Vec<MappingEntry>,
    pub expected: Vec<String>,
}

impl PackageLayout {
    /// Load a layout file. Relative paths in it resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(&content, &base_dir, path)
    }

    pub fn parse(content: &str, base_dir: &Path, origin: &Path) -> Result<Self> {
        let raw: LayoutToml = toml::from_str(content)?;
        let invalid = |reason: String| Error::InvalidLayout {
            path: origin.to_path_buf(),
            reason,
        };

        if raw.id.trim().is_empty() {
            return Err(invalid("`id` must not be empty".to_string()));
        }

        let mut destinations = HashSet::new();
        let mut claim = |dest: &str| -> Result<()> {
            check_relative(dest).map_err(invalid)?;
            if !destinations.insert(dest.to_string()) {
                return Err(invalid(format!("destination {dest} is written twice")));
            }
            Ok(())
        };

        let mut support_files = Vec::new();
        for file in &raw.support_files {
            let source = base_dir.join(file);
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| invalid(format!("support file {file} has no file name")))?;
            claim(&name)?;
            support_files.push(source);
        }

        let mut templates = Vec::new();
        for template in &raw.templates {
            claim(&template.dest)?;
            templates.push(TemplateFile {
                source: base_dir.join(&template.source),
                dest: template.dest.clone(),
            });
        }

        let mut mapping = Vec::new();
        for entry in raw.mappings {
            claim(&entry.dest)?;
            mapping.push(MappingEntry {
                selector: Selector::new(entry.select, &entry.glob, entry.excludes)?,
                member: entry.member,
                dest: entry.dest,
            });
        }

        if !destinations.contains(&raw.nuspec) {
            return Err(invalid(format!(
                "nuspec {} is not produced by any template or support file",
                raw.nuspec
            )));
        }

        let layout = PackageLayout {
            id: raw.id,
            nuspec: raw.nuspec,
            support_files,
            templates,
            mapping,
            expected: raw.expected,
        };
        layout.lint();
        Ok(layout)
    }

    /// File name the packer produces for `version` (already stripped of `v`).
    pub fn package_filename(&self, version: &str) -> String {
        format!("{}.{}.nupkg", self.id, version)
    }

    /// Mapping and template destinations that the expected-file list omits.
    pub fn unverified_destinations(&self) -> Vec<&str> {
        let expected: HashSet<&str> = self.expected.iter().map(String::as_str).collect();
        self.templates
            .iter()
            .map(|t| t.dest.as_str())
            .chain(self.mapping.iter().map(|m| m.dest.as_str()))
            .filter(|dest| !expected.contains(dest))
            .collect()
    }

    /// Support files that do not exist relative to the layout directory.
    pub fn missing_support_files(&self) -> Vec<&Path> {
        self.support_files
            .iter()
            .filter(|source| !source.exists())
            .map(PathBuf::as_path)
            .collect()
    }

    fn lint(&self) {
        for dest in self.unverified_destinations() {
            log::warn!("{dest} is staged for {} but not in the expected file list", self.id);
        }
        for source in self.missing_support_files() {
            log::warn!("support file {} does not exist, staging will fail", source.display());
        }
    }
}

fn check_relative(dest: &str) -> std::result::Result<(), String> {
    let path = Path::new(dest);
    if dest.is_empty() {
        return Err("empty destination path".to_string());
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(format!("destination {dest} must stay inside the package root")),
        }
    }
    Ok(())
}
