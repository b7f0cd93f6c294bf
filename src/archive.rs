use crate::error::Error;
use crate::result::Result;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Detect the container format from the file name.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") || name.ends_with(".nupkg") {
            Some(ArchiveKind::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }
}

pub struct Archive {
    path: PathBuf,
    kind: ArchiveKind,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        let kind = ArchiveKind::detect(path).ok_or_else(|| Error::UnsupportedArchive {
            path: path.to_path_buf(),
        })?;
        if !path.is_file() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("archive {} does not exist", path.display()),
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArchiveKind {
        self.kind
    }

    /// Names of all members exactly as stored, in archive order.
    pub fn names(&self) -> Result<Vec<String>> {
        match self.kind {
            ArchiveKind::Zip => {
                let zip = ZipArchive::new(File::open(&self.path)?)?;
                Ok(zip.file_names().map(str::to_string).collect())
            }
            ArchiveKind::Tar | ArchiveKind::TarGz => {
                let mut tar = tar::Archive::new(self.reader()?);
                let mut names = Vec::new();
                for entry in tar.entries()? {
                    let entry = entry?;
                    names.push(String::from_utf8_lossy(&entry.path_bytes()).into_owned());
                }
                Ok(names)
            }
        }
    }

    /// Write the bytes of `member` to `dest`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if the archive has no such member.
    pub fn extract(&self, member: &str, dest: &Path) -> Result<()> {
        let found = match self.kind {
            ArchiveKind::Zip => self.extract_zip(member, dest)?,
            ArchiveKind::Tar | ArchiveKind::TarGz => self.extract_tar(member, dest)?,
        };

        if !found {
            return Err(Error::MemberNotFound {
                archive: self.path.clone(),
                member: member.to_string(),
                members: self.names()?,
            });
        }

        log::debug!("extracted {}:{} to {}", self.path.display(), member, dest.display());
        Ok(())
    }

    fn extract_zip(&self, member: &str, dest: &Path) -> Result<bool> {
        let mut zip = ZipArchive::new(File::open(&self.path)?)?;
        let mut file = match zip.by_name(member) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        write_member(&mut file, dest)?;
        Ok(true)
    }

    fn extract_tar(&self, member: &str, dest: &Path) -> Result<bool> {
        let mut tar = tar::Archive::new(self.reader()?);
        for entry in tar.entries()? {
            let mut entry = entry?;
            if entry.header().entry_type().is_dir() {
                continue;
            }
            if tar_member_name(&entry.path_bytes()) == member {
                write_member(&mut entry, dest)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn reader(&self) -> Result<Box<dyn Read>> {
        let file = File::open(&self.path)?;
        Ok(match self.kind {
            ArchiveKind::TarGz => Box::new(GzDecoder::new(file)),
            _ => Box::new(file),
        })
    }
}

/// Extract a single `member` of the archive at `archive_path` to `dest`.
pub fn extract(archive_path: &Path, member: &str, dest: &Path) -> Result<()> {
    Archive::open(archive_path)?.extract(member, dest)
}

fn write_member<R: Read + ?Sized>(reader: &mut R, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(dest)?;
    io::copy(reader, &mut out)?;
    Ok(())
}

/// Stored tar name as it is addressed in a layout (`./lib/x` -> `lib/x`).
fn tar_member_name(stored: &[u8]) -> String {
    let name = String::from_utf8_lossy(stored).replace('\\', "/");
    name.strip_prefix("./").map(str::to_string).unwrap_or(name)
}
