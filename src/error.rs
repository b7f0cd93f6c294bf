use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Custom(String),

    /// No artifact satisfied a mapping selector.
    #[error("unable to find artifact with tags {constraints} matching \"{glob}\"")]
    MissingArtifact { constraints: String, glob: String },

    /// A matched archive lacks the requested member.
    #[error(
        "file not found in archive {}: {member}. Files in archive are: [{}]",
        archive.display(),
        members.join(", ")
    )]
    MemberNotFound {
        archive: PathBuf,
        member: String,
        members: Vec<String>,
    },

    /// The packaging tool exited unsuccessfully.
    #[error("{program} failed with exit code {code}:\n{output}")]
    ExternalTool {
        program: String,
        code: i32,
        output: String,
    },

    #[error("failed to render template {}: {reason}", path.display())]
    Template { path: PathBuf, reason: String },

    #[error("invalid layout {}: {reason}", path.display())]
    InvalidLayout { path: PathBuf, reason: String },

    #[error("invalid filename glob \"{pattern}\": {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("unsupported archive format: {}", path.display())]
    UnsupportedArchive { path: PathBuf },

    #[error("no artifacts found in {}", dir.display())]
    NoArtifacts { dir: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_not_found_lists_archive_contents() {
        let err = Error::MemberNotFound {
            archive: PathBuf::from("dl/win-x64.zip"),
            member: "bin/rdkafka.dll".to_string(),
            members: vec!["bin/other.dll".to_string(), "README".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("dl/win-x64.zip"));
        assert!(msg.contains("bin/rdkafka.dll"));
        assert!(msg.contains("[bin/other.dll, README]"));
    }

    #[test]
    fn missing_artifact_names_glob() {
        let err = Error::MissingArtifact {
            constraints: "{arch: x64, plat: win}".to_string(),
            glob: "librdkafka.redist*".to_string(),
        };
        assert!(err.to_string().contains("\"librdkafka.redist*\""));
    }
}
