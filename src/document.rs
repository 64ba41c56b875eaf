//! Temporary HTML documents handed to the engine
//!
//! A `TemporaryDocument` owns a uniquely named `.html` file for the duration
//! of one conversion. The file is deleted on every exit path: explicitly via
//! [`TemporaryDocument::remove`], or by `Drop` if the owning future is
//! cancelled or unwinds.

use crate::{Error, Result};
use log::debug;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;

const PREFIX: &str = "html-to-pdf-";
const SUFFIX: &str = ".html";

pub struct TemporaryDocument {
    file: NamedTempFile,
    url: Url,
}

impl TemporaryDocument {
    /// Write `html` as UTF-8 into a fresh file inside `dir`.
    pub fn create(dir: &Path, html: &str) -> Result<Self> {
        // file:// URLs need an absolute path
        let dir = dir.canonicalize().map_err(|source| Error::WriteError {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut file = tempfile::Builder::new()
            .prefix(PREFIX)
            .suffix(SUFFIX)
            .tempfile_in(&dir)
            .map_err(|source| Error::WriteError { path: dir.clone(), source })?;

        file.write_all(html.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| Error::WriteError {
                path: file.path().to_path_buf(),
                source,
            })?;

        let url = Url::from_file_path(file.path()).map_err(|_| {
            Error::Other(format!("Cannot build a file URL for {}", file.path().display()))
        })?;

        debug!("wrote {} bytes of HTML to {}", html.len(), file.path().display());
        Ok(Self { file, url })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// `file://` URL the engine should load
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Delete the file now, reporting failure. A file that is already gone
    /// counts as removed.
    pub fn remove(self) -> Result<()> {
        let path: PathBuf = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::CleanupError { path, source }),
        }
    }
}
