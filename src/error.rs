//! Error types for recipe generation
//!
//! Every failure in the pipeline is fatal. The variants exist so callers can
//! tell a bad manifest from a bad network from a bad archive.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating a recipe.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// A required `/package/<field>` node is absent from the manifest.
    #[error("package.xml has no <{field}> element under <package>")]
    ManifestFieldMissing { field: &'static str },

    /// The manifest is not well-formed XML.
    #[error("cannot parse {path}: {source}")]
    XmlParse {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    /// The archive could not be fetched.
    #[error("download of {url} failed: {reason}")]
    Network { url: String, reason: String },

    /// The archive could not be unpacked.
    #[error("cannot extract {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest declares a license outside the digest table (strict mode only).
    #[error("no license checksum known for '{license}'")]
    UnknownLicense { license: String },

    /// A pipeline step was called before the step it depends on.
    #[error("{step} called before {requires}")]
    StepOutOfOrder {
        step: &'static str,
        requires: &'static str,
    },

    /// Wrong number of values given to the generate command.
    #[error("expected {expected} arguments, got {got}")]
    InvalidArguments { expected: usize, got: usize },
}

impl RecipeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = RecipeError> = std::result::Result<T, E>;
