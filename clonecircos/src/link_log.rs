use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::CircosResult;
use crate::link::{LinkSet, LINK_HEADER};
use crate::tsv::{open_append, tsv_writer};

/// Cumulative, append-only link file collecting the links of several views.
///
/// The file outlives the handle: [`LinkLog::create`] starts it afresh, while
/// [`LinkLog::append_to`] keeps growing whatever is already on disk. A handle
/// appends each view at most once, so retrying a view through the same handle
/// cannot duplicate its rows. The file is not locked; concurrent runs must
/// each use their own log file.
#[derive(Debug)]
pub struct LinkLog {
    path: PathBuf,
    appended_views: HashSet<String>,
}

impl LinkLog {
    /// Creates the log file, replacing any previous content, and writes the
    /// header.
    pub fn create<P: Into<PathBuf>>(path: P) -> CircosResult<Self> {
        let path = path.into();
        let mut tsv = tsv_writer(File::create(&path)?);
        tsv.write_record(LINK_HEADER)?;
        tsv.flush()?;

        debug!("Started link log {}", path.display());
        Ok(Self::with_path(path))
    }

    /// Opens the log file for appending. The header is written only if the
    /// file does not exist yet or is empty.
    pub fn append_to<P: Into<PathBuf>>(path: P) -> CircosResult<Self> {
        let path = path.into();
        let is_new = match std::fs::metadata(&path) {
            Ok(metadata) => metadata.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        if is_new {
            let mut tsv = tsv_writer(open_append(&path)?);
            tsv.write_record(LINK_HEADER)?;
            tsv.flush()?;
        }

        debug!(
            "Continuing link log {} (new: {})",
            path.display(),
            is_new
        );
        Ok(Self::with_path(path))
    }

    fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            appended_views: HashSet::new(),
        }
    }

    /// Appends the links of a view, without a header.
    ///
    /// Returns `false`, leaving the file untouched, if this view has already
    /// been appended through this handle.
    pub fn append(&mut self, links: &LinkSet) -> CircosResult<bool> {
        if self.appended_views.contains(links.view()) {
            warn!(
                "Links of view `{}` already appended to {}, skipping",
                links.view(),
                self.path.display()
            );
            return Ok(false);
        }

        let mut tsv = tsv_writer(open_append(&self.path)?);
        links.write_rows(&mut tsv)?;
        tsv.flush()?;

        self.appended_views.insert(links.view().to_owned());
        info!(
            "Appended {} links of view `{}` to {}",
            links.len(),
            links.view(),
            self.path.display()
        );
        Ok(true)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether the links of given view were appended through this
    /// handle.
    #[must_use]
    pub fn contains_view(&self, view: &str) -> bool {
        self.appended_views.contains(view)
    }
}
