//! `SignWorkflow` orchestrates a batch signing request.
//!
//! A request moves through `Parsing → Loading → Signing → NamingOutputs →
//! Writing → Done`. Signatures are held in memory until the whole batch has
//! signed, so a signing failure never leaves anything on disk. A write
//! failure stops the remaining writes; outputs already written stay in place.

use crate::{
    adapters::crypto,
    domain::{
        constants::{MAX_NR_CERT, MAX_NR_REQUEST},
        request::{SigningContext, SigningRequest},
    },
    infra::files,
    services::{
        loader::{LoaderConfig, SignatureletLoader},
        registry::SignatureletRegistry,
    },
    SigningError, SigningResult,
};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stage of a signing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignPhase {
    Parsing,
    Loading,
    Signing,
    NamingOutputs,
    Writing,
    Done,
}

impl fmt::Display for SignPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsing => "parsing",
            Self::Loading => "loading",
            Self::Signing => "signing",
            Self::NamingOutputs => "naming outputs",
            Self::Writing => "writing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// One signature written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureOutput {
    pub input: PathBuf,
    pub output: PathBuf,
    pub size: usize,
}

/// Result of a fully successful request.
#[derive(Debug, Clone)]
pub struct SigningOutcome {
    pub signaturelet: String,
    pub outputs: Vec<SignatureOutput>,
    pub duration: Duration,
}

pub struct SignWorkflow {
    loader: SignatureletLoader,
}

impl SignWorkflow {
    #[must_use]
    pub fn new(loader: SignatureletLoader) -> Self {
        Self { loader }
    }

    /// Workflow over a fresh registry holding the built-in signaturelets.
    pub fn with_builtins(config: LoaderConfig) -> SigningResult<Self> {
        let registry = Arc::new(SignatureletRegistry::with_builtins()?);
        Ok(Self::new(SignatureletLoader::new(registry, config)))
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SignatureletRegistry> {
        self.loader.registry()
    }

    #[must_use]
    pub fn loader(&self) -> &SignatureletLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut SignatureletLoader {
        &mut self.loader
    }

    /// Validate, sign, name and write every file of `request`.
    pub fn sign(&mut self, request: &SigningRequest) -> SigningResult<SigningOutcome> {
        let started = Instant::now();

        enter(SignPhase::Parsing);
        let context = parse_request(request)?;
        let id = context.signaturelet();

        enter(SignPhase::Loading);
        self.loader.ensure_loaded(id)?;

        enter(SignPhase::Signing);
        let signatures = self.sign_files(&context)?;

        enter(SignPhase::NamingOutputs);
        let outputs = self.name_outputs(&context)?;

        enter(SignPhase::Writing);
        let mut written = Vec::with_capacity(outputs.len());
        let batch = context.signed_files().iter().zip(outputs).zip(&signatures);
        for ((input, output), signature) in batch {
            if let Err(e) = files::save_file(&output, signature) {
                log::error!(
                    "Failed to write signature {} ({} of {} written)",
                    output.display(),
                    written.len(),
                    signatures.len()
                );
                return Err(e);
            }
            log::debug!("Signature {} saved", output.display());
            written.push(SignatureOutput {
                input: input.clone(),
                output,
                size: signature.len(),
            });
        }

        enter(SignPhase::Done);
        Ok(SigningOutcome {
            signaturelet: id.to_string(),
            outputs: written,
            duration: started.elapsed(),
        })
    }

    fn sign_files(&self, context: &SigningContext) -> SigningResult<Vec<Vec<u8>>> {
        let registry = self.loader.registry();
        let mut signatures = Vec::with_capacity(context.nr_signed_file());

        for (idx, path) in context.signed_files().iter().enumerate() {
            log::debug!(
                "Signing file {} [{}/{}] ...",
                path.display(),
                idx + 1,
                context.nr_signed_file()
            );
            let data = files::load_file(path)?;
            let signature = registry
                .sign(
                    context.signaturelet(),
                    &data,
                    context.key(),
                    context.certs(),
                    context.flags(),
                )
                .map_err(|e| {
                    log::error!("Failed to sign file {}", path.display());
                    e
                })?;
            log::debug!("{} signed ({} bytes)", path.display(), signature.len());
            signatures.push(signature);
        }

        Ok(signatures)
    }

    fn name_outputs(&self, context: &SigningContext) -> SigningResult<Vec<PathBuf>> {
        if let Some(outputs) = context.output_files() {
            return Ok(outputs.to_vec());
        }

        let rule = self
            .loader
            .registry()
            .resolve_suffix(context.signaturelet(), context.flags())?;
        Ok(context
            .signed_files()
            .iter()
            .map(|input| rule.apply(input))
            .collect())
    }

    /// Wait for a request to complete; requests run synchronously.
    pub fn wait(&self, id: &str) -> SigningResult<()> {
        log::debug!("wait({id}): nothing pending");
        Ok(())
    }

    /// Cancel a request; requests cannot be interrupted once started.
    pub fn cancel(&self, id: &str) -> SigningResult<()> {
        log::debug!("cancel({id}): nothing pending");
        Ok(())
    }

    /// Release per-request state; none outlives `sign`.
    pub fn finish(&self, id: &str) -> SigningResult<()> {
        log::debug!("finish({id}): nothing pending");
        Ok(())
    }
}

fn enter(phase: SignPhase) {
    log::debug!("Signing request: {phase}");
}

/// Validate a request into a context without signing anything.
pub fn parse_request(request: &SigningRequest) -> SigningResult<SigningContext> {
    if request.signaturelet.is_empty() {
        return Err(SigningError::ValidationError(
            "No signaturelet specified".to_string(),
        ));
    }

    if request.flags.is_conflicting() {
        return Err(SigningError::ValidationError(
            "Content-attached and detached signature cannot be requested together".to_string(),
        ));
    }

    if request.signed_files.is_empty() {
        return Err(SigningError::ValidationError(
            "No file to be signed".to_string(),
        ));
    }

    let mut signed_files = request.signed_files.clone();
    if signed_files.len() > MAX_NR_REQUEST {
        log::warn!(
            "Too many files to be signed ({}), only the first {MAX_NR_REQUEST} are signed",
            signed_files.len()
        );
        signed_files.truncate(MAX_NR_REQUEST);
    }

    for path in &signed_files {
        if !files::is_readable(path) {
            return Err(SigningError::ValidationError(format!(
                "File to be signed {} does not exist or is not readable",
                path.display()
            )));
        }
    }

    if request.key.as_os_str().is_empty() {
        return Err(SigningError::ValidationError(
            "No signing key specified".to_string(),
        ));
    }
    crypto::load_private_key(&request.key)
        .map_err(|e| SigningError::ValidationError(e.to_string()))?;

    let output_files = match &request.output_files {
        Some(outputs) if outputs.len() < signed_files.len() => {
            return Err(SigningError::ValidationError(format!(
                "{} output files given for {} signed files",
                outputs.len(),
                signed_files.len()
            )));
        }
        Some(outputs) => Some(outputs[..signed_files.len()].to_vec()),
        None => None,
    };

    if request.certs.len() > MAX_NR_CERT {
        return Err(SigningError::ValidationError(format!(
            "Too many certificates ({}), at most {MAX_NR_CERT} are allowed",
            request.certs.len()
        )));
    }
    for cert in &request.certs {
        crypto::load_certificate(cert).map_err(|e| SigningError::ValidationError(e.to_string()))?;
    }

    log::debug!(
        "Request for {} parsed: {} file(s), {} certificate(s), flags {:#x}",
        request.signaturelet,
        signed_files.len(),
        request.certs.len(),
        request.flags
    );

    Ok(SigningContext {
        signaturelet: request.signaturelet.clone(),
        signed_files,
        output_files,
        key: request.key.clone(),
        certs: request.certs.clone(),
        flags: request.flags,
    })
}
