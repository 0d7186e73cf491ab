use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, FileKind, FileSpec};
use crate::disk::DiskSpace;
use crate::download::{DownloadOutcome, ResumableDownloader};
use crate::error::AvrcError;
use crate::extract::extract_tar_gz;
use crate::http::Transport;
use crate::zenodo::{RecordFetcher, RemoteFileIndex, RemoteFileInfo};

#[derive(Debug, Clone, Serialize)]
pub struct SubsetReport {
    pub subset: String,
    pub output_dir: String,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub kind: FileKind,
    pub size: u64,
    pub outcome: DownloadOutcome,
    pub extracted: bool,
    /// `None` when the archive was removed after extraction.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub subsets: Vec<SubsetSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubsetSummary {
    pub name: String,
    pub description: String,
    pub total_size: u64,
}

#[derive(Debug, Clone, Copy)]
pub enum ProgressEvent<'a> {
    Started {
        filename: &'a str,
        offset: u64,
        total: u64,
    },
    Transferred {
        filename: &'a str,
        written: u64,
        total: u64,
    },
    Verifying {
        filename: &'a str,
    },
    Extracting {
        filename: &'a str,
    },
    Finished {
        filename: &'a str,
    },
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent<'_>);
}

pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn event(&self, _event: ProgressEvent<'_>) {}
}

pub struct App<T: Transport, D: DiskSpace> {
    catalog: Catalog,
    transport: T,
    disk: D,
    record_url: String,
}

impl<T: Transport, D: DiskSpace> App<T, D> {
    pub fn new(catalog: Catalog, transport: T, disk: D, record_url: impl Into<String>) -> Self {
        Self {
            catalog,
            transport,
            disk,
            record_url: record_url.into(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn list_subsets(&self) -> Result<ListResult, AvrcError> {
        let index = self.fetch_index()?;
        let subsets = self
            .catalog
            .subsets()
            .map(|subset| SubsetSummary {
                name: subset.name.to_string(),
                description: subset.description.to_string(),
                total_size: index.total_size(subset),
            })
            .collect();
        Ok(ListResult { subsets })
    }

    pub fn download_subset(
        &self,
        name: &str,
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<SubsetReport, AvrcError> {
        let subset = self.catalog.lookup(name)?;
        let index = self.fetch_index()?;

        fs::create_dir_all(output_dir).map_err(|err| {
            AvrcError::Filesystem(format!("create {}: {err}", output_dir.display()))
        })?;

        info!(subset = subset.name, files = subset.files.len(), "downloading subset");
        let downloader = ResumableDownloader::new(&self.transport, &self.disk);
        let mut files = Vec::with_capacity(subset.files.len());
        for spec in subset.files {
            let info = index
                .get(spec.filename)
                .ok_or_else(|| AvrcError::MissingFileInfo(spec.filename.to_string()))?;
            files.push(self.fetch_file(&downloader, spec, info, output_dir, sink)?);
        }

        Ok(SubsetReport {
            subset: subset.name.to_string(),
            output_dir: output_dir.display().to_string(),
            files,
        })
    }

    fn fetch_file(
        &self,
        downloader: &ResumableDownloader<'_, T, D>,
        spec: &FileSpec,
        info: &RemoteFileInfo,
        output_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<FileReport, AvrcError> {
        let path = output_dir.join(spec.filename);
        let outcome = downloader.download(spec.filename, info, &path, sink)?;

        let mut final_path = Some(path.clone());
        if spec.extract {
            sink.event(ProgressEvent::Extracting {
                filename: spec.filename,
            });
            extract_tar_gz(&path, output_dir, spec.extract_subfolder)?;
            final_path = remove_archive(&path);
        }
        sink.event(ProgressEvent::Finished {
            filename: spec.filename,
        });

        Ok(FileReport {
            filename: spec.filename.to_string(),
            kind: spec.kind,
            size: info.size,
            outcome,
            extracted: spec.extract,
            path: final_path.map(|path| path.display().to_string()),
        })
    }

    fn fetch_index(&self) -> Result<RemoteFileIndex, AvrcError> {
        RecordFetcher::new(&self.transport, &self.record_url).fetch()
    }
}

// Returns the path when the archive is still on disk.
fn remove_archive(path: &Path) -> Option<PathBuf> {
    match fs::remove_file(path) {
        Ok(()) => None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not remove extracted archive");
            Some(path.to_path_buf())
        }
    }
}
