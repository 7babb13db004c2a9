//! Pipeline helpers
//!
//! Free functions with explicit inputs and outputs. The builder in
//! [`crate::recipe`] sequences them.
//!
//! - **download**: fetch the source archive over HTTP
//! - **extract**: unpack the `.tar.gz` safely
//! - **hash**: MD5 + SHA-256 of the archive in one pass

pub mod download;
pub mod extract;
pub mod hash;

pub use download::download;
pub use extract::extract_tar_gz;
pub use hash::{checksums_from_reader, compute_checksums, ArchiveChecksums};
