use std::fmt;

use serde::Serialize;

use crate::error::AvrcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Sequence,
    Archive,
    MetadataArchive,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Sequence => write!(f, "sequence"),
            FileKind::Archive => write!(f, "archive"),
            FileKind::MetadataArchive => write!(f, "metadata_archive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSpec {
    pub filename: &'static str,
    pub kind: FileKind,
    pub extract: bool,
    /// Top-level folder the archive unpacks into; its contents get moved up
    /// into the output directory after extraction.
    pub extract_subfolder: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsetDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub files: &'static [FileSpec],
}

pub const AVRC_SUBSETS: &[SubsetDefinition] = &[
    SubsetDefinition {
        name: "all",
        description: "All representative sequences with metadata",
        files: &[
            FileSpec {
                filename: "AVrC_allrepresentatives.fasta.gz",
                kind: FileKind::Sequence,
                extract: false,
                extract_subfolder: None,
            },
            FileSpec {
                filename: "database_csv.tar.gz",
                kind: FileKind::MetadataArchive,
                extract: true,
                extract_subfolder: Some("database_csv"),
            },
        ],
    },
    SubsetDefinition {
        name: "hq",
        description: "High quality sequences",
        files: &[FileSpec {
            filename: "subset1_HighQuality.tar.gz",
            kind: FileKind::Archive,
            extract: true,
            extract_subfolder: None,
        }],
    },
    SubsetDefinition {
        name: "phage",
        description: "Bacteriophage sequences",
        files: &[FileSpec {
            filename: "subset2_Bacteriophages.tar.gz",
            kind: FileKind::Archive,
            extract: true,
            extract_subfolder: None,
        }],
    },
];

#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    subsets: &'static [SubsetDefinition],
}

impl Catalog {
    pub fn new(subsets: &'static [SubsetDefinition]) -> Self {
        Self { subsets }
    }

    pub fn builtin() -> Self {
        Self::new(AVRC_SUBSETS)
    }

    pub fn lookup(&self, name: &str) -> Result<&'static SubsetDefinition, AvrcError> {
        self.subsets
            .iter()
            .find(|subset| subset.name == name)
            .ok_or_else(|| AvrcError::UnknownSubset(name.to_string()))
    }

    pub fn all_names(&self) -> Vec<&'static str> {
        self.subsets.iter().map(|subset| subset.name).collect()
    }

    pub fn subsets(&self) -> impl Iterator<Item = &'static SubsetDefinition> {
        self.subsets.iter()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
