use crate::error::Error;
use crate::result::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Tag name to tag value, e.g. `plat` -> `win`.
pub type Tags = BTreeMap<String, String>;

pub const DEFAULT_BUILD_TYPE: &str = "release";
pub const DEFAULT_TOOLSET: &str = "v120";

/// A build output archive discovered on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    filename: String,
    tags: Tags,
}

impl Artifact {
    pub fn new<P: Into<PathBuf>>(path: P, tags: Tags) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            filename,
            tags,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Fill in `bldtype` and `toolset` defaults and recompute `variant`.
    pub fn enrich(&mut self) {
        self.tags
            .entry("bldtype".to_string())
            .or_insert_with(|| DEFAULT_BUILD_TYPE.to_string());
        self.tags
            .entry("toolset".to_string())
            .or_insert_with(|| DEFAULT_TOOLSET.to_string());

        let variant = format!(
            "{}-{}-{}",
            self.tag("plat").unwrap_or("unknown"),
            self.tag("arch").unwrap_or("unknown"),
            self.tag("bldtype").unwrap_or(DEFAULT_BUILD_TYPE),
        );
        self.tags.insert("variant".to_string(), variant);
    }
}

/// Artifacts in discovery order. Selection tie-breaks on this order.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    artifacts: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn enrich(&mut self) {
        for artifact in &mut self.artifacts {
            artifact.enrich();
        }
    }

    /// Collect every file below `dir` as an artifact.
    ///
    /// Tags come from the directory names between `dir` and the file, written
    /// as `key-value` pairs joined by `__` (for example
    /// `p-librdkafka__plat-win__arch-x64`). When `require_match` is set, files
    /// whose tags do not include every entry of `required` are skipped.
    ///
    /// Returns the number of artifacts added.
    pub fn collect_local(&mut self, dir: &Path, required: &Tags, require_match: bool) -> Result<usize> {
        if !dir.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("artifact directory {} does not exist", dir.display()),
            )));
        }

        let mut added = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            let tags = relative
                .parent()
                .map(tags_from_components)
                .unwrap_or_default();

            if require_match && !satisfies(&tags, required) {
                log::debug!("skipping {}: tags {:?} do not match", entry.path().display(), tags);
                continue;
            }

            log::debug!("collected {} with tags {:?}", entry.path().display(), tags);
            self.push(Artifact::new(entry.path(), tags));
            added += 1;
        }

        Ok(added)
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a Artifact;
    type IntoIter = std::slice::Iter<'a, Artifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Artifact> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        Self {
            artifacts: iter.into_iter().collect(),
        }
    }
}

/// Every `(name, value)` in `required` is present in `tags`.
pub fn satisfies(tags: &Tags, required: &Tags) -> bool {
    required
        .iter()
        .all(|(name, value)| tags.get(name) == Some(value))
}

fn tags_from_components(path: &Path) -> Tags {
    let mut tags = Tags::new();
    for component in path.components() {
        let component = component.as_os_str().to_string_lossy();
        for piece in component.split("__") {
            if let Some((key, value)) = piece.split_once('-') {
                if !key.is_empty() && !value.is_empty() {
                    tags.insert(key.to_string(), value.to_string());
                }
            }
        }
    }
    tags
}

/// Parse `key=value` into a tag pair.
pub fn parse_tag(input: &str) -> Result<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::custom(format!("expected key=value, got \"{input}\""))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn filename_derived_from_path() {
        let artifact = Artifact::new("dl/p-x__plat-win/librdkafka.redist.2.0.nupkg", Tags::new());
        assert_eq!(artifact.filename(), "librdkafka.redist.2.0.nupkg");
    }

    #[test]
    fn enrich_fills_defaults_and_variant() {
        let mut artifact = Artifact::new("a.zip", tags(&[("plat", "win"), ("arch", "x64")]));
        artifact.enrich();
        assert_eq!(artifact.tag("bldtype"), Some("release"));
        assert_eq!(artifact.tag("toolset"), Some("v120"));
        assert_eq!(artifact.tag("variant"), Some("win-x64-release"));
    }

    #[test]
    fn enrich_keeps_existing_tags() {
        let mut artifact = Artifact::new(
            "a.zip",
            tags(&[("plat", "win"), ("arch", "x86"), ("bldtype", "debug"), ("toolset", "v142")]),
        );
        artifact.enrich();
        assert_eq!(artifact.tag("toolset"), Some("v142"));
        assert_eq!(artifact.tag("variant"), Some("win-x86-debug"));
    }

    #[test]
    fn tags_getter_reflects_enrichment() {
        let mut artifact = Artifact::new("a.zip", tags(&[("plat", "win"), ("arch", "x64")]));
        artifact.enrich();
        assert_eq!(
            artifact.tags(),
            &tags(&[
                ("plat", "win"),
                ("arch", "x64"),
                ("bldtype", "release"),
                ("toolset", "v120"),
                ("variant", "win-x64-release"),
            ])
        );
    }

    #[test]
    fn enrich_leaves_platform_absent() {
        let mut artifact = Artifact::new("a.zip", Tags::new());
        artifact.enrich();
        assert_eq!(artifact.tag("plat"), None);
        assert_eq!(artifact.tag("variant"), Some("unknown-unknown-release"));
    }

    #[test]
    fn tags_parsed_from_directory_names() {
        let parsed = tags_from_components(Path::new("p-librdkafka__plat-win__arch-x64__tag-6f/extra"));
        assert_eq!(
            parsed,
            tags(&[("p", "librdkafka"), ("plat", "win"), ("arch", "x64"), ("tag", "6f")])
        );
    }

    #[test]
    fn collect_local_filters_on_required_tags() {
        let temp = tempfile::tempdir().expect("temp dir");
        let matching = temp.path().join("plat-win__arch-x64__tag-6f");
        let other = temp.path().join("plat-win__arch-x86__tag-5e");
        fs::create_dir_all(&matching).expect("mkdir");
        fs::create_dir_all(&other).expect("mkdir");
        fs::write(matching.join("b.zip"), b"b").expect("write");
        fs::write(matching.join("a.zip"), b"a").expect("write");
        fs::write(other.join("c.zip"), b"c").expect("write");

        let mut set = ArtifactSet::new();
        let added = set
            .collect_local(temp.path(), &tags(&[("tag", "6f")]), true)
            .expect("collect");

        assert_eq!(added, 2);
        let names: Vec<&str> = set.iter().map(Artifact::filename).collect();
        assert_eq!(names, vec!["a.zip", "b.zip"]);
        assert_eq!(set.iter().next().and_then(|a| a.tag("arch")), Some("x64"));
    }

    #[test]
    fn collect_local_without_requirement_keeps_everything() {
        let temp = tempfile::tempdir().expect("temp dir");
        fs::write(temp.path().join("msvcr120.zip"), b"zip").expect("write");

        let mut set = ArtifactSet::new();
        set.collect_local(temp.path(), &tags(&[("tag", "6f")]), false)
            .expect("collect");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn collect_local_missing_directory_fails() {
        let temp = tempfile::tempdir().expect("temp dir");
        let mut set = ArtifactSet::new();
        let result = set.collect_local(&temp.path().join("nope"), &Tags::new(), false);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn parse_tag_requires_equals() {
        assert_eq!(
            parse_tag("tag=6f").expect("parse"),
            ("tag".to_string(), "6f".to_string())
        );
        assert!(parse_tag("tag").is_err());
    }
}
