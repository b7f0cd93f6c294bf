use crate::error::Error;
use crate::result::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Template processor for resolving $VARIABLE format variables
pub struct Tpl {
    variables: HashMap<String, String>,
}

impl Tpl {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Register a variable with its value
    pub fn register<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.variables.insert(key.into(), value.into());
    }

    /// Parse a string and resolve all $VARIABLE references
    pub fn parse(&self, input: &str) -> String {
        // Longest names first so $VERSION does not eat into $VERSION_MAJOR.
        let mut keys: Vec<&String> = self.variables.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut result = input.to_string();
        for key in keys {
            let pattern = format!("${}", key);
            result = result.replace(&pattern, &self.variables[key]);
        }

        result
    }

    /// Render the template at `source` into `dest`, creating parent directories.
    pub fn render_file(&self, source: &Path, dest: &Path) -> Result<()> {
        let content = fs::read_to_string(source).map_err(|e| Error::Template {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, self.parse(&content))?;

        log::debug!("rendered {} to {}", source.display(), dest.display());
        Ok(())
    }
}

impl Default for Tpl {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the leading `v` used by release tags (`v2.3.0` -> `2.3.0`).
pub fn strip_version_prefix(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parsing() {
        let mut tpl = Tpl::new();
        tpl.register("VERSION", "2.3.0");
        tpl.register("ID", "librdkafka.redist");

        let result = tpl.parse("$ID.$VERSION.nupkg");
        assert_eq!(result, "librdkafka.redist.2.3.0.nupkg");
    }

    #[test]
    fn test_multiple_occurrences() {
        let mut tpl = Tpl::new();
        tpl.register("NAME", "test");

        let result = tpl.parse("$NAME-$NAME");
        assert_eq!(result, "test-test");
    }

    #[test]
    fn longer_names_resolve_first() {
        let mut tpl = Tpl::new();
        tpl.register("VERSION", "2.3.0");
        tpl.register("VERSION_MAJOR", "2");

        assert_eq!(tpl.parse("$VERSION_MAJOR/$VERSION"), "2/2.3.0");
    }

    #[test]
    fn render_file_writes_substituted_content() {
        let temp = tempfile::tempdir().expect("temp dir");
        let source = temp.path().join("pkg.nuspec");
        fs::write(&source, "<version>$VERSION</version>").expect("write template");

        let mut tpl = Tpl::new();
        tpl.register("VERSION", "2.3.0");
        let dest = temp.path().join("stage/build/pkg.nuspec");
        tpl.render_file(&source, &dest).expect("render");

        assert_eq!(
            fs::read_to_string(dest).expect("read"),
            "<version>2.3.0</version>"
        );
    }

    #[test]
    fn missing_template_is_template_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let tpl = Tpl::new();
        let result = tpl.render_file(&temp.path().join("absent"), &temp.path().join("out"));
        assert!(matches!(result, Err(Error::Template { .. })));
    }

    #[test]
    fn version_prefix_is_stripped_once() {
        assert_eq!(strip_version_prefix("v2.3.0"), "2.3.0");
        assert_eq!(strip_version_prefix("2.3.0"), "2.3.0");
    }
}
