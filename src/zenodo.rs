use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::SubsetDefinition;
use crate::error::{AvrcError, TransportError};
use crate::http::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFileInfo {
    pub filename: String,
    /// Algorithm-prefixed digest, e.g. `md5:0123...`.
    pub checksum: String,
    pub size: u64,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    files: Vec<RecordFile>,
}

#[derive(Debug, Deserialize)]
struct RecordFile {
    key: String,
    checksum: String,
    size: u64,
    links: RecordLinks,
}

#[derive(Debug, Deserialize)]
struct RecordLinks {
    #[serde(rename = "self")]
    self_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct RemoteFileIndex {
    files: BTreeMap<String, RemoteFileInfo>,
}

impl RemoteFileIndex {
    pub fn get(&self, filename: &str) -> Option<&RemoteFileInfo> {
        self.files.get(filename)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    // Files missing from the listing are not counted.
    pub fn total_size(&self, subset: &SubsetDefinition) -> u64 {
        subset
            .files
            .iter()
            .filter_map(|spec| self.get(spec.filename))
            .map(|info| info.size)
            .sum()
    }
}

impl FromIterator<RemoteFileInfo> for RemoteFileIndex {
    fn from_iter<I: IntoIterator<Item = RemoteFileInfo>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|info| (info.filename.clone(), info))
                .collect(),
        }
    }
}

pub struct RecordFetcher<'a, T: Transport + ?Sized> {
    transport: &'a T,
    record_url: &'a str,
}

impl<'a, T: Transport + ?Sized> RecordFetcher<'a, T> {
    pub fn new(transport: &'a T, record_url: &'a str) -> Self {
        Self {
            transport,
            record_url,
        }
    }

    pub fn fetch(&self) -> Result<RemoteFileIndex, AvrcError> {
        debug!(url = self.record_url, "fetching record file listing");
        let body = self
            .transport
            .get(self.record_url, None)
            .map_err(|source| self.metadata_error(source))?;
        let record: RecordResponse = serde_json::from_reader(body.reader)
            .map_err(|err| self.metadata_error(TransportError::Decode(err.to_string())))?;
        let index = parse_record(record);
        debug!(files = index.len(), "record listing parsed");
        Ok(index)
    }

    fn metadata_error(&self, source: TransportError) -> AvrcError {
        AvrcError::RemoteMetadata {
            url: self.record_url.to_string(),
            source,
        }
    }
}

fn parse_record(record: RecordResponse) -> RemoteFileIndex {
    record
        .files
        .into_iter()
        .map(|file| RemoteFileInfo {
            filename: file.key,
            checksum: file.checksum,
            size: file.size,
            download_url: file.links.self_url,
        })
        .collect()
}
