//! Signing request and the validated context derived from it.

use crate::domain::flags::SignFlags;
use std::path::{Path, PathBuf};

/// A request to sign a batch of files with one signaturelet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningRequest {
    /// Identifier of the signaturelet producing the signatures.
    pub signaturelet: String,
    /// Files to sign, in order.
    pub signed_files: Vec<PathBuf>,
    /// Explicit output paths, one per signed file.
    pub output_files: Option<Vec<PathBuf>>,
    /// PEM private key.
    pub key: PathBuf,
    /// PEM certificates; only the first one signs.
    pub certs: Vec<PathBuf>,
    pub flags: SignFlags,
}

impl SigningRequest {
    #[must_use]
    pub fn new(signaturelet: impl Into<String>, key: impl Into<PathBuf>) -> Self {
        Self {
            signaturelet: signaturelet.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_signed_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.signed_files = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_output_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.output_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_certs<I, P>(mut self, certs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.certs = certs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: SignFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// A request that passed validation.
///
/// `signed_files` is already truncated to the request limit and
/// `output_files`, when present, holds exactly one entry per signed file.
/// File contents are not held here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    pub(crate) signaturelet: String,
    pub(crate) signed_files: Vec<PathBuf>,
    pub(crate) output_files: Option<Vec<PathBuf>>,
    pub(crate) key: PathBuf,
    pub(crate) certs: Vec<PathBuf>,
    pub(crate) flags: SignFlags,
}

impl SigningContext {
    #[must_use]
    pub fn signaturelet(&self) -> &str {
        &self.signaturelet
    }

    #[must_use]
    pub fn signed_files(&self) -> &[PathBuf] {
        &self.signed_files
    }

    #[must_use]
    pub fn output_files(&self) -> Option<&[PathBuf]> {
        self.output_files.as_deref()
    }

    #[must_use]
    pub fn key(&self) -> &Path {
        &self.key
    }

    #[must_use]
    pub fn certs(&self) -> &[PathBuf] {
        &self.certs
    }

    #[must_use]
    pub fn flags(&self) -> SignFlags {
        self.flags
    }

    #[must_use]
    pub fn nr_signed_file(&self) -> usize {
        self.signed_files.len()
    }

    #[must_use]
    pub fn nr_cert(&self) -> usize {
        self.certs.len()
    }
}
