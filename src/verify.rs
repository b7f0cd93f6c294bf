use crate::archive::Archive;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub ok: bool,
    /// Expected paths absent from the package, in expected-list order.
    pub missing: Vec<String>,
    pub expected: usize,
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ok {
            write!(f, "OK - {} expected files found", self.expected)
        } else {
            write!(f, "Missing files in package:\n{}", self.missing.join("\n"))
        }
    }
}

/// Compare the members of `package` against `expected`.
///
/// Member names are percent-decoded first, since packaging tools may store
/// `a b.txt` as `a%20b.txt`. An unreadable package reports every expected
/// path as missing.
pub fn verify(package: &Path, expected: &[String]) -> Verification {
    log::info!("Verifying {}", package.display());

    let names = match Archive::open(package).and_then(|a| a.names()) {
        Ok(names) => names,
        Err(e) => {
            log::warn!("cannot read package {}: {e}", package.display());
            Vec::new()
        }
    };
    let present: HashSet<String> = names.iter().map(|n| percent_decode(n)).collect();

    let missing: Vec<String> = expected
        .iter()
        .filter(|path| !present.contains(path.as_str()))
        .cloned()
        .collect();

    Verification {
        ok: missing.is_empty(),
        missing,
        expected: expected.len(),
    }
}

/// Decode `%XX` escapes. Malformed escapes are kept verbatim and invalid
/// UTF-8 is replaced.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn package(dir: &Path, members: &[&str]) -> std::path::PathBuf {
        let path = dir.join("librdkafka.redist.2.3.0.nupkg");
        let mut zip = ZipWriter::new(File::create(&path).expect("create"));
        for name in members {
            zip.start_file(*name, SimpleFileOptions::default()).expect("start");
            zip.write_all(b"x").expect("write");
        }
        zip.finish().expect("finish");
        path
    }

    fn expected(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn complete_package_is_ok() {
        let temp = tempfile::tempdir().expect("temp dir");
        let pkg = package(temp.path(), &["LICENSES.txt", "runtimes/win-x64/native/librdkafka.dll"]);

        let result = verify(&pkg, &expected(&["LICENSES.txt", "runtimes/win-x64/native/librdkafka.dll"]));
        assert!(result.ok);
        assert!(result.missing.is_empty());
        assert_eq!(result.to_string(), "OK - 2 expected files found");
    }

    #[test]
    fn missing_files_keep_expected_order() {
        let temp = tempfile::tempdir().expect("temp dir");
        let pkg = package(temp.path(), &["b.txt"]);

        let result = verify(&pkg, &expected(&["c.txt", "b.txt", "a.txt"]));
        assert!(!result.ok);
        assert_eq!(result.missing, expected(&["c.txt", "a.txt"]));
    }

    #[test]
    fn encoded_member_names_are_decoded() {
        let temp = tempfile::tempdir().expect("temp dir");
        let pkg = package(temp.path(), &["a%20b.txt"]);

        assert!(verify(&pkg, &expected(&["a b.txt"])).ok);
    }

    #[test]
    fn repeated_verification_is_identical() {
        let temp = tempfile::tempdir().expect("temp dir");
        let pkg = package(temp.path(), &["LICENSES.txt"]);
        let list = expected(&["LICENSES.txt", "README.md"]);

        assert_eq!(verify(&pkg, &list), verify(&pkg, &list));
    }

    #[test]
    fn unreadable_package_reports_everything_missing() {
        let temp = tempfile::tempdir().expect("temp dir");
        let result = verify(&temp.path().join("absent.nupkg"), &expected(&["LICENSES.txt"]));
        assert!(!result.ok);
        assert_eq!(result.missing, expected(&["LICENSES.txt"]));
    }

    #[rstest]
    #[case::space("a%20b.txt", "a b.txt")]
    #[case::plus_sign("lib%2Bcpp.dll", "lib+cpp.dll")]
    #[case::lowercase_hex("%7efile", "~file")]
    #[case::utf8("caf%C3%A9", "café")]
    #[case::truncated("abc%2", "abc%2")]
    #[case::not_hex("100%zz", "100%zz")]
    #[case::plain("build/native/rdkafka.h", "build/native/rdkafka.h")]
    fn decodes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(percent_decode(input), expected);
    }
}
