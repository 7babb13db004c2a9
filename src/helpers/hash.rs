//! Archive checksums
//!
//! BitBake wants both `SRC_URI[md5sum]` and `SRC_URI[sha256sum]`, so the
//! archive is streamed once and fed to both hashers.

use crate::error::{RecipeError, Result};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Chunk size for reading files during hashing (1MB)
const CHUNK_SIZE: usize = 1024 * 1024;

/// Digests of one archive, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveChecksums {
    pub md5: String,
    pub sha256: String,
}

/// Compute MD5 and SHA-256 of a file without loading it whole.
pub fn compute_checksums(file: &Path) -> Result<ArchiveChecksums> {
    let mut f = std::fs::File::open(file).map_err(|e| RecipeError::io(file, e))?;
    checksums_from_reader(&mut f).map_err(|e| RecipeError::io(file, e))
}

/// Compute MD5 and SHA-256 over everything `reader` yields.
pub fn checksums_from_reader(reader: &mut impl Read) -> std::io::Result<ArchiveChecksums> {
    let mut md5 = Md5::new();
    let mut sha256 = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        md5.update(&buffer[..n]);
        sha256.update(&buffer[..n]);
    }

    Ok(ArchiveChecksums {
        md5: hex::encode(md5.finalize()),
        sha256: hex::encode(sha256.finalize()),
    })
}
