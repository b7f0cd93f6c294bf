use crate::artifact::{Artifact, ArtifactSet, Tags, satisfies};
use crate::error::Error;
use crate::result::Result;
use glob::Pattern;

/// One logical slot of a package layout: required tag values, a shell-style
/// filename glob and filename substrings that disqualify a match.
#[derive(Debug, Clone)]
pub struct Selector {
    constraints: Tags,
    glob: String,
    pattern: Pattern,
    excludes: Vec<String>,
}

impl Selector {
    /// Build a selector, compiling `glob`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `glob` is not a valid pattern.
    pub fn new(constraints: Tags, glob: &str, excludes: Vec<String>) -> Result<Self> {
        let pattern = Pattern::new(&shell_glob(glob)).map_err(|e| Error::InvalidPattern {
            pattern: glob.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            constraints,
            glob: glob.to_string(),
            pattern,
            excludes,
        })
    }

    pub fn constraints(&self) -> &Tags {
        &self.constraints
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn excludes(&self) -> &[String] {
        &self.excludes
    }

    pub fn matches(&self, artifact: &Artifact) -> bool {
        satisfies(artifact.tags(), &self.constraints)
            && self.pattern.matches(artifact.filename())
            && !self
                .excludes
                .iter()
                .any(|exclude| artifact.filename().contains(exclude.as_str()))
    }

    /// Return the first artifact, in set order, that this selector matches.
    ///
    /// Further candidates are not an error; they are only logged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArtifact`] if no artifact qualifies.
    pub fn resolve<'a>(&self, artifacts: &'a ArtifactSet) -> Result<&'a Artifact> {
        let mut candidates = artifacts.iter().filter(|a| self.matches(a));

        let Some(found) = candidates.next() else {
            return Err(Error::MissingArtifact {
                constraints: self.describe_constraints(),
                glob: self.glob().to_string(),
            });
        };

        for shadowed in candidates {
            log::debug!(
                "{} also matches \"{}\" but {} was selected first",
                shadowed.path().display(),
                self.glob(),
                found.path().display()
            );
        }

        Ok(found)
    }

    fn describe_constraints(&self) -> String {
        let pairs: Vec<String> = self
            .constraints
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    }
}

/// Rewrite a flat-filename shell glob into `glob::Pattern` syntax.
///
/// Runs of `*` collapse to one `*` and a `[` without a closing `]` matches
/// itself. A `]` directly after `[` or `[!` belongs to the class.
fn shell_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
            }
            '[' => {
                let mut j = i + 1;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j < chars.len() {
                    out.extend(&chars[i..=j]);
                    i = j;
                } else {
                    out.push_str("[[]");
                }
            }
            c => out.push(c),
        }
        i += 1;
    }
    out
}
