use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app::{ProgressEvent, ProgressSink};
use crate::checksum::{self, parse_checksum};
use crate::disk::DiskSpace;
use crate::error::{AvrcError, TransportError};
use crate::http::Transport;
use crate::zenodo::RemoteFileInfo;

pub const TEMP_SUFFIX: &str = ".tmp";

const CHUNK_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Downloaded {
        resumed_from: u64,
        bytes_transferred: u64,
    },
    Reused,
}

pub fn temp_path_for(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

pub struct ResumableDownloader<'a, T: Transport + ?Sized, D: DiskSpace + ?Sized> {
    transport: &'a T,
    disk: &'a D,
}

impl<'a, T: Transport + ?Sized, D: DiskSpace + ?Sized> ResumableDownloader<'a, T, D> {
    pub fn new(transport: &'a T, disk: &'a D) -> Self {
        Self { transport, disk }
    }

    pub fn download(
        &self,
        filename: &str,
        info: &RemoteFileInfo,
        dest: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<DownloadOutcome, AvrcError> {
        let (algorithm, _) = parse_checksum(&info.checksum)?;
        let temp_path = temp_path_for(dest);

        let mut offset = 0;
        if let Some(existing) = partial_len(&temp_path)? {
            // A corrupt complete file cannot be repaired by a ranged resume.
            if existing >= info.size {
                sink.event(ProgressEvent::Verifying { filename });
                if checksum::verify(&temp_path, &info.checksum)? {
                    info!(filename, "reusing completed partial download");
                    promote(&temp_path, dest)?;
                    return Ok(DownloadOutcome::Reused);
                }
                warn!(filename, existing, "discarding stale partial download");
                remove_file(&temp_path)?;
            } else {
                offset = existing;
            }
        }

        self.preflight(dest, info.size - offset)?;

        if offset > 0 {
            info!(filename, offset, total = info.size, "resuming download");
        } else {
            debug!(filename, total = info.size, "starting download");
        }
        sink.event(ProgressEvent::Started {
            filename,
            offset,
            total: info.size,
        });

        let transfer_error = |source: TransportError| AvrcError::Transfer {
            filename: filename.to_string(),
            source,
        };
        let mut body = self
            .transport
            .get(&info.download_url, (offset > 0).then_some(offset))
            .map_err(transfer_error)?;
        debug!(filename, partial = body.partial, content_length = ?body.content_length, "response received");
        if offset > 0 && !body.partial {
            warn!(filename, "server ignored range request, restarting from zero");
            offset = 0;
        }

        let mut file = open_temp(&temp_path, offset > 0)?;
        let mut written = offset;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let n = match body.reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(transfer_error(TransportError::Io(err))),
            };
            file.write_all(&buffer[..n])
                .map_err(|err| fs_error(&temp_path, err))?;
            written += n as u64;
            sink.event(ProgressEvent::Transferred {
                filename,
                written,
                total: info.size,
            });
        }
        file.sync_all().map_err(|err| fs_error(&temp_path, err))?;
        drop(file);

        sink.event(ProgressEvent::Verifying { filename });
        let actual = checksum::digest(&temp_path, algorithm)?;
        if !actual.eq_ignore_ascii_case(info.checksum.trim()) {
            remove_file(&temp_path)?;
            return Err(AvrcError::ChecksumMismatch {
                filename: filename.to_string(),
                expected: info.checksum.clone(),
                actual,
            });
        }

        promote(&temp_path, dest)?;
        Ok(DownloadOutcome::Downloaded {
            resumed_from: offset,
            bytes_transferred: written - offset,
        })
    }

    fn preflight(&self, dest: &Path, required: u64) -> Result<(), AvrcError> {
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let available = self
            .disk
            .available(dir)
            .map_err(|err| AvrcError::Filesystem(format!("disk space of {}: {err}", dir.display())))?;
        debug!(required, available, "disk space preflight");
        if available < required {
            return Err(AvrcError::InsufficientDiskSpace {
                path: dir.to_path_buf(),
                required,
                available,
            });
        }
        Ok(())
    }
}

fn partial_len(temp_path: &Path) -> Result<Option<u64>, AvrcError> {
    match fs::metadata(temp_path) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Err(AvrcError::Filesystem(format!(
            "{} exists and is not a file",
            temp_path.display()
        ))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(fs_error(temp_path, err)),
    }
}

fn open_temp(temp_path: &Path, append: bool) -> Result<File, AvrcError> {
    let mut options = OpenOptions::new();
    if append {
        options.append(true);
    } else {
        options.write(true).create(true).truncate(true);
    }
    options
        .open(temp_path)
        .map_err(|err| fs_error(temp_path, err))
}

fn promote(temp_path: &Path, dest: &Path) -> Result<(), AvrcError> {
    // rename only replaces an existing file atomically on Unix.
    if cfg!(windows) && dest.exists() {
        fs::remove_file(dest).map_err(|err| fs_error(dest, err))?;
    }
    fs::rename(temp_path, dest).map_err(|err| fs_error(dest, err))
}

fn remove_file(path: &Path) -> Result<(), AvrcError> {
    fs::remove_file(path).map_err(|err| fs_error(path, err))
}

fn fs_error(path: &Path, err: std::io::Error) -> AvrcError {
    AvrcError::Filesystem(format!("{}: {err}", path.display()))
}
