use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::error::AvrcError;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Md5,
    Sha256,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumAlgorithm::Md5 => write!(f, "md5"),
            ChecksumAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = AvrcError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(ChecksumAlgorithm::Md5),
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            _ => Err(AvrcError::UnsupportedChecksum(value.to_string())),
        }
    }
}

pub fn parse_checksum(expected: &str) -> Result<(ChecksumAlgorithm, &str), AvrcError> {
    let (algorithm, hex) = expected
        .split_once(':')
        .ok_or_else(|| AvrcError::UnsupportedChecksum(expected.to_string()))?;
    Ok((algorithm.parse()?, hex.trim()))
}

pub fn digest(path: &Path, algorithm: ChecksumAlgorithm) -> Result<String, AvrcError> {
    let file = File::open(path)
        .map_err(|err| AvrcError::Filesystem(format!("open {}: {err}", path.display())))?;
    let hex = match algorithm {
        ChecksumAlgorithm::Md5 => hash_reader::<Md5, _>(file),
        ChecksumAlgorithm::Sha256 => hash_reader::<Sha256, _>(file),
    }
    .map_err(|err| AvrcError::Filesystem(format!("read {}: {err}", path.display())))?;
    Ok(format!("{algorithm}:{hex}"))
}

pub fn verify(path: &Path, expected: &str) -> Result<bool, AvrcError> {
    let (algorithm, _) = parse_checksum(expected)?;
    let actual = digest(path, algorithm)?;
    Ok(actual.eq_ignore_ascii_case(expected.trim()))
}

fn hash_reader<D: Digest, R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
