#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::path::Path;
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::GzEncoder;
use md5::{Digest, Md5};

use avrc_data::app::{ProgressEvent, ProgressSink};
use avrc_data::disk::DiskSpace;
use avrc_data::error::TransportError;
use avrc_data::http::{RemoteBody, Transport};
use avrc_data::zenodo::RemoteFileInfo;

pub const RECORD_URL: &str = "https://zenodo.test/api/records/11426065";

#[derive(Clone)]
pub struct Route {
    pub body: Vec<u8>,
    pub status: u16,
    pub honor_range: bool,
    /// Break the stream with a connection reset after this many bytes.
    pub fail_after: Option<usize>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            status: 200,
            honor_range: true,
            fail_after: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            body: b"error".to_vec(),
            status,
            honor_range: true,
            fail_after: None,
        }
    }
}

#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<(String, Option<u64>)>>,
    served: Mutex<u64>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_string(), route);
        self
    }

    pub fn serve(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.route(url, Route::ok(body))
    }

    pub fn requests(&self) -> Vec<(String, Option<u64>)> {
        self.requests.lock().unwrap().clone()
    }

    /// Body bytes handed to the client across all requests.
    pub fn bytes_served(&self) -> u64 {
        *self.served.lock().unwrap()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, range_start: Option<u64>) -> Result<RemoteBody, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), range_start));
        let route = self
            .routes
            .get(url)
            .ok_or_else(|| TransportError::Http(format!("no route for {url}")))?;
        if !(200..300).contains(&route.status) {
            return Err(TransportError::Status {
                status: route.status,
                message: String::from_utf8_lossy(&route.body).to_string(),
            });
        }

        let (partial, data) = match range_start {
            Some(offset) if route.honor_range => (true, route.body[offset as usize..].to_vec()),
            _ => (false, route.body.clone()),
        };
        let served = route
            .fail_after
            .map(|limit| limit.min(data.len()))
            .unwrap_or(data.len());
        *self.served.lock().unwrap() += served as u64;

        let content_length = Some(data.len() as u64);
        let reader: Box<dyn Read + Send> = match route.fail_after {
            Some(limit) => Box::new(FlakyReader {
                inner: Cursor::new(data),
                remaining: limit,
            }),
            None => Box::new(Cursor::new(data)),
        };
        Ok(RemoteBody {
            partial,
            content_length,
            reader,
        })
    }
}

struct FlakyReader {
    inner: Cursor<Vec<u8>>,
    remaining: usize,
}

impl Read for FlakyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ));
        }
        let max = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..max])?;
        self.remaining -= n;
        Ok(n)
    }
}

pub struct FixedDisk(pub u64);

impl DiskSpace for FixedDisk {
    fn available(&self, _path: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Started { offset: u64, total: u64 },
    Transferred { written: u64 },
    Verifying,
    Extracting,
    Finished,
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(String, Recorded)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(String, Recorded)> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent<'_>) {
        let (filename, recorded) = match event {
            ProgressEvent::Started {
                filename,
                offset,
                total,
            } => (filename, Recorded::Started { offset, total }),
            ProgressEvent::Transferred {
                filename, written, ..
            } => (filename, Recorded::Transferred { written }),
            ProgressEvent::Verifying { filename } => (filename, Recorded::Verifying),
            ProgressEvent::Extracting { filename } => (filename, Recorded::Extracting),
            ProgressEvent::Finished { filename } => (filename, Recorded::Finished),
        };
        self.events
            .lock()
            .unwrap()
            .push((filename.to_string(), recorded));
    }
}

pub fn md5_checksum(bytes: &[u8]) -> String {
    format!("md5:{}", hex::encode(Md5::digest(bytes)))
}

pub fn file_url(filename: &str) -> String {
    format!("{RECORD_URL}/files/{filename}/content")
}

pub fn remote_info(filename: &str, body: &[u8]) -> RemoteFileInfo {
    RemoteFileInfo {
        filename: filename.to_string(),
        checksum: md5_checksum(body),
        size: body.len() as u64,
        download_url: file_url(filename),
    }
}

/// Zenodo record JSON listing the given files.
pub fn record_json(files: &[(&str, &[u8])]) -> Vec<u8> {
    let entries = files
        .iter()
        .map(|(name, body)| {
            serde_json::json!({
                "key": name,
                "checksum": md5_checksum(body),
                "size": body.len(),
                "links": { "self": file_url(name) },
            })
        })
        .collect::<Vec<_>>();
    serde_json::to_vec(&serde_json::json!({ "id": 11426065, "files": entries })).unwrap()
}

pub fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, path, data.as_bytes())
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
