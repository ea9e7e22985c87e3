// Digest computation module
// Streams a file once through the MD5 and SHA-256 accumulators

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Md5, Digest as Md5Digest};
use sha2::{Sha256, Digest as Sha2Digest};
use tracing::debug;

use super::error::DigestError;

/// Default chunk size for streaming reads (64KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Trait for hash accumulators fed by the streaming loop
pub trait Hasher: Send {
    /// Update the hasher with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the raw digest
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Get the output size in bytes
    fn output_size(&self) -> usize;
}

// MD5 wrapper
pub struct Md5Wrapper(Md5);

impl Hasher for Md5Wrapper {
    fn update(&mut self, data: &[u8]) {
        Md5Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Md5Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        16 // 128 bits
    }
}

// SHA-256 wrapper
pub struct Sha256Wrapper(Sha256);

impl Hasher for Sha256Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha2Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha2Digest::finalize(self.0).to_vec()
    }

    fn output_size(&self) -> usize {
        32 // 256 bits
    }
}

/// The two digest algorithms every file is run through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Legacy 128-bit fingerprint
    Md5,
    /// Primary 256-bit integrity digest
    Sha256,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Md5, Algorithm::Sha256];

    /// Label used when rendering results
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha256 => "SHA256",
        }
    }

    pub fn output_bits(&self) -> usize {
        self.hasher().output_size() * 8
    }

    /// Length of the lowercase hex rendering
    pub fn hex_len(&self) -> usize {
        self.hasher().output_size() * 2
    }

    /// Fresh accumulator for this algorithm
    pub fn hasher(&self) -> Box<dyn Hasher> {
        match self {
            Algorithm::Md5 => Box::new(Md5Wrapper(Md5Digest::new())),
            Algorithm::Sha256 => Box::new(Sha256Wrapper(Sha2Digest::new())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Both digests of one input, produced together or not at all
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DigestPair {
    pub md5: String,    // hex-encoded
    pub sha256: String, // hex-encoded
    pub size: u64,
}

impl DigestPair {
    /// Digest string for `algorithm`
    pub fn get(&self, algorithm: Algorithm) -> &str {
        match algorithm {
            Algorithm::Md5 => &self.md5,
            Algorithm::Sha256 => &self.sha256,
        }
    }

    /// True only when both digests agree
    pub fn matches(&self, other: &DigestPair) -> bool {
        self.md5 == other.md5 && self.sha256 == other.sha256
    }
}

/// Outcome of hashing a single input
pub type DigestResult = Result<DigestPair, DigestError>;

/// Streams files through both accumulators in one pass
#[derive(Debug, Clone)]
pub struct DigestEngine {
    buffer_size: usize,
}

impl DigestEngine {
    /// Create a new DigestEngine with the default buffer size
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Create a new DigestEngine with a custom buffer size (at least one byte)
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Compute the MD5 and SHA-256 digests of the file at `path`
    ///
    /// The file is read once, front to back, in chunks of `buffer_size`
    /// bytes. The handle is closed when this returns, on every path.
    pub fn compute_digests(&self, path: &Path) -> DigestResult {
        let file = open_regular_file(path)?;
        let result = self.digest_reader(file, path);

        match &result {
            Ok(pair) => debug!(path = %path.display(), bytes = pair.size, md5 = %pair.md5, sha256 = %pair.sha256, "computed digests"),
            Err(e) => debug!(path = %path.display(), kind = e.kind(), "digest computation failed"),
        }

        result
    }

    /// Stream any reader through both accumulators
    ///
    /// `label` names the source in errors. Partial state is dropped on failure.
    pub fn digest_reader<R: Read>(&self, mut reader: R, label: &Path) -> DigestResult {
        let mut hashers: Vec<(Algorithm, Box<dyn Hasher>)> = Algorithm::ALL
            .iter()
            .map(|algorithm| (*algorithm, algorithm.hasher()))
            .collect();

        let mut buffer = vec![0u8; self.buffer_size];
        let mut size = 0u64;

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(DigestError::read(label, e)),
            };
            if bytes_read == 0 {
                break;
            }

            // Every accumulator sees the chunk before the next read
            for (_, hasher) in hashers.iter_mut() {
                hasher.update(&buffer[..bytes_read]);
            }
            size += bytes_read as u64;
        }

        Ok(finish(hashers, size))
    }

    /// Digest an in-memory buffer with a single update per accumulator
    pub fn digest_bytes(data: &[u8]) -> DigestPair {
        let mut hashers: Vec<(Algorithm, Box<dyn Hasher>)> = Algorithm::ALL
            .iter()
            .map(|algorithm| (*algorithm, algorithm.hasher()))
            .collect();

        for (_, hasher) in hashers.iter_mut() {
            hasher.update(data);
        }

        finish(hashers, data.len() as u64)
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn open_regular_file(path: &Path) -> Result<File, DigestError> {
    // Checked before opening: open(2) on a FIFO blocks until a writer shows up
    let metadata = std::fs::metadata(path).map_err(|e| DigestError::unreadable(path, e))?;
    ensure_regular(path, &metadata)?;

    let file = File::open(path).map_err(|e| DigestError::unreadable(path, e))?;

    // The entry may have been swapped between the check and the open
    let metadata = file
        .metadata()
        .map_err(|e| DigestError::unreadable(path, e))?;
    ensure_regular(path, &metadata)?;

    Ok(file)
}

fn ensure_regular(path: &Path, metadata: &std::fs::Metadata) -> Result<(), DigestError> {
    if metadata.is_file() {
        Ok(())
    } else {
        Err(DigestError::unreadable(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        ))
    }
}

fn finish(hashers: Vec<(Algorithm, Box<dyn Hasher>)>, size: u64) -> DigestPair {
    let mut md5 = String::new();
    let mut sha256 = String::new();

    for (algorithm, hasher) in hashers {
        let hash_hex = hex::encode(hasher.finalize());
        match algorithm {
            Algorithm::Md5 => md5 = hash_hex,
            Algorithm::Sha256 => sha256 = hash_hex,
        }
    }

    DigestPair { md5, sha256, size }
}
