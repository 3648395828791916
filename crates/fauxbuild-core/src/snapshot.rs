//! On-disk snapshot container and the index-based graph payload it carries.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! u32   magic (0xfcfcfcfc)
//! u32   kind length
//! [u8]  kind (ASCII discriminator, e.g. "cargo")
//! [u8]  gzip stream of the JSON payload
//! ```

use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fauxbuild_util::errors::FauxError;

pub const SNAPSHOT_MAGIC: u32 = 0xfcfc_fcfc;

const HEADER_LEN: usize = 8;

/// Errors raised while decoding a snapshot. All are fatal to loading.
#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error(
        "not a snapshot file: magic {found:#010x} does not match {expected:#010x}",
        expected = SNAPSHOT_MAGIC
    )]
    BadMagic { found: u32 },

    #[error("snapshot truncated: {len} bytes is too short for its header")]
    #[diagnostic(help("The file may have been cut off while copying; regenerate it with `fauxbuild gen`"))]
    Truncated { len: usize },

    #[error("snapshot kind tag is not ASCII")]
    KindNotAscii,

    #[error("snapshot kind tag of {len} bytes does not fit the header")]
    KindTooLong { len: usize },

    #[error("snapshot is for `{found}` work, expected `{expected}`")]
    #[diagnostic(help("Pass the matching --compiler type for this snapshot"))]
    KindMismatch { expected: String, found: String },

    #[error("snapshot payload is corrupt: {0}")]
    Corrupt(#[source] std::io::Error),

    #[error("snapshot payload is malformed: {0}")]
    Payload(#[source] serde_json::Error),

    #[error("snapshot package #{package} has {field} index {index}, but only {len} packages exist")]
    DanglingIndex {
        package: usize,
        field: &'static str,
        index: usize,
        len: usize,
    },

    #[error("snapshot package #{package} lists {field} index {index} more than once")]
    DuplicateEdge {
        package: usize,
        field: &'static str,
        index: usize,
    },

    #[error("snapshot packages #{first} and #{second} are both `{name} v{version}`")]
    DuplicatePackage {
        name: String,
        version: String,
        first: usize,
        second: usize,
    },

    #[error("snapshot package #{package} depends on #{dependency}, which does not list it as a dependent")]
    AsymmetricEdge { package: usize, dependency: usize },

    #[error("snapshot target index {index} is out of range for {len} packages")]
    DanglingTarget { index: usize, len: usize },

    #[error("snapshot lists {targets} targets but {paths} target paths")]
    TargetPathMismatch { targets: usize, paths: usize },
}

/// One package in a snapshot; edges are indices into [`GraphSnapshot::packages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPackage {
    pub name: String,
    #[serde(rename = "ver")]
    pub version: String,
    #[serde(rename = "dep", default)]
    pub dependencies: Vec<usize>,
    #[serde(rename = "req", default)]
    pub required_by: Vec<usize>,
}

/// A resolved package graph in portable, index-referenced form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub packages: Vec<SnapshotPackage>,
    /// Indices of target packages, parallel to `paths`.
    #[serde(rename = "target", default)]
    pub targets: Vec<usize>,
    #[serde(rename = "path", default)]
    pub paths: Vec<String>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, SnapshotError> {
        serde_json::from_slice(bytes).map_err(SnapshotError::Payload)
    }
}

/// A decoded container: the work-kind discriminator and the uncompressed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotContainer {
    pub kind: String,
    pub payload: Vec<u8>,
}

impl SnapshotContainer {
    pub fn new(kind: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Serialize to the on-disk layout, gzip-compressing the payload at `level` (0-9).
    pub fn encode(&self, level: u32) -> std::io::Result<Vec<u8>> {
        let kind_len = u32::try_from(self.kind.len()).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "kind tag too long")
        })?;
        let mut out = Vec::with_capacity(HEADER_LEN + self.kind.len() + self.payload.len() / 4);
        out.extend_from_slice(&SNAPSHOT_MAGIC.to_le_bytes());
        out.extend_from_slice(&kind_len.to_le_bytes());
        out.extend_from_slice(self.kind.as_bytes());

        let mut encoder = GzEncoder::new(out, Compression::new(level.min(9)));
        encoder.write_all(&self.payload)?;
        encoder.finish()
    }

    /// Parse the on-disk layout.
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        if bytes.len() < HEADER_LEN {
            return Err(SnapshotError::Truncated { len: bytes.len() });
        }
        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic { found: magic });
        }
        let kind_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let kind_end = HEADER_LEN
            .checked_add(kind_len)
            .filter(|&end| end <= bytes.len())
            .ok_or(SnapshotError::KindTooLong { len: kind_len })?;

        let kind_bytes = &bytes[HEADER_LEN..kind_end];
        if !kind_bytes.is_ascii() {
            return Err(SnapshotError::KindNotAscii);
        }
        let kind = String::from_utf8_lossy(kind_bytes).into_owned();

        let mut payload = Vec::new();
        GzDecoder::new(&bytes[kind_end..])
            .read_to_end(&mut payload)
            .map_err(SnapshotError::Corrupt)?;

        Ok(Self { kind, payload })
    }

    /// Unwrap the payload, failing unless the discriminator equals `expected`.
    pub fn into_payload(self, expected: &str) -> Result<Vec<u8>, SnapshotError> {
        if self.kind != expected {
            return Err(SnapshotError::KindMismatch {
                expected: expected.to_string(),
                found: self.kind,
            });
        }
        Ok(self.payload)
    }

    /// Read and decode a snapshot file.
    pub fn read(path: &Path) -> miette::Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| FauxError::Snapshot {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Ok(Self::decode(&bytes)?)
    }

    /// Encode and write a snapshot file, creating parent directories as needed.
    pub fn write(&self, path: &Path, level: u32) -> miette::Result<()> {
        let bytes = self.encode(level).map_err(|e| FauxError::Snapshot {
            message: format!("Failed to encode snapshot: {e}"),
        })?;
        fauxbuild_util::fs::ensure_parent(path).map_err(FauxError::Io)?;
        std::fs::write(path, bytes).map_err(|e| FauxError::Snapshot {
            message: format!("Failed to write {}: {e}", path.display()),
        })?;
        Ok(())
    }
}
