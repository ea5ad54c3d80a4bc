//! selsign command-line front end
//!
//! Signs files through the libsign signaturelet pipeline, inspects produced
//! signatures, and manages the default signing configuration.

use clap::{Parser, Subcommand, ValueEnum};
use libsign::{
    adapters::crypto,
    config::{ConfigManager, ExportFormat, SignletConfiguration},
    domain::sel::SelTagKind,
    CipherAlgorithm, DigestAlgorithm, SeLoader, SelSignature, SignFlags, SignWorkflow,
    SignatureletLoader, SignatureletRegistry, SigningError, SigningRequest,
};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("LIBSIGN_GIT_COMMIT"),
    ", built on ",
    env!("LIBSIGN_BUILD_MACHINE"),
    ")"
);

#[derive(Parser)]
#[command(name = "selsign")]
#[command(about = "Sign build artifacts with pluggable signaturelets")]
#[command(long_about = "
selsign - sign build artifacts with PKCS#7 and SELoader signatures

EXAMPLES:
    # SELoader signature with embedded digest (bzImage.p7a)
    selsign sign bzImage

    # Detached signature (bzImage.p7s)
    selsign sign --detached-signature bzImage

    # Explicit key, certificate and output
    selsign sign -k key.pem -c cert.pem -o grubx64.efi.sig grubx64.efi

    # SHA-384 digest in the SELoader container
    selsign sign --digest-alg sha384 bzImage

    # Dump the SELoader container inside a signature
    selsign inspect bzImage.p7a

ENVIRONMENT VARIABLES:
    LD_LIBRARY_PATH  Search path for signaturelet modules (<dir>/signaturelet/<id>.siglet)
    RUST_LOG         Logging level (debug, info, warn, error)
")]
#[command(version = VERSION)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign one or more files
    Sign {
        /// Files to sign
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// PEM private key (overrides config)
        #[arg(short, long, value_name = "KEY")]
        key: Option<PathBuf>,

        /// PEM signing certificate (overrides config)
        #[arg(short, long, value_name = "CERT")]
        cert: Option<PathBuf>,

        /// Extra PEM certificates passed to the signaturelet
        #[arg(long = "ca", value_name = "CA_CERT")]
        ca_certs: Vec<PathBuf>,

        /// Signaturelet identifier (overrides config)
        #[arg(short, long, value_name = "ID")]
        signaturelet: Option<String>,

        /// Produce a detached signature
        #[arg(short = 'D', long)]
        detached_signature: bool,

        /// Embed the signed content itself rather than its digest
        #[arg(short = 'a', long)]
        attached_content: bool,

        /// Digest algorithm of the SELoader container (sha1, sha224, sha256, sha384, sha512)
        #[arg(long, value_name = "ALG", default_value = "sha256")]
        digest_alg: String,

        /// Cipher algorithm of the signing key
        #[arg(long, value_name = "ALG", default_value = "rsa")]
        cipher_alg: String,

        /// Output file, one per input file and in the same order
        #[arg(short, long = "output", value_name = "OUTPUT")]
        outputs: Vec<PathBuf>,
    },

    /// Show the content of a PKCS#7 signature produced by selsign
    Inspect {
        /// DER PKCS#7 signature file
        #[arg(value_name = "SIG_FILE")]
        signature: PathBuf,

        /// Signed file, required for detached signatures
        #[arg(long, value_name = "FILE")]
        content: Option<PathBuf>,
    },

    /// List available signaturelets
    List,

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Export configuration
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import configuration
    Import {
        /// Configuration file to import
        file: PathBuf,
        /// Import format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
    },
}

#[derive(ValueEnum, Clone)]
enum ExportFormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

/// Parameters for the sign command
struct SignCommandArgs {
    files: Vec<PathBuf>,
    key: Option<PathBuf>,
    cert: Option<PathBuf>,
    ca_certs: Vec<PathBuf>,
    signaturelet: Option<String>,
    detached_signature: bool,
    attached_content: bool,
    digest_alg: String,
    cipher_alg: String,
    outputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_manager = ConfigManager::new();
    let config = config_manager.load_or_default()?;

    let level = if cli.quiet {
        "warn"
    } else if cli.verbose || config.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Sign {
            files,
            key,
            cert,
            ca_certs,
            signaturelet,
            detached_signature,
            attached_content,
            digest_alg,
            cipher_alg,
            outputs,
        } => {
            let args = SignCommandArgs {
                files,
                key,
                cert,
                ca_certs,
                signaturelet,
                detached_signature,
                attached_content,
                digest_alg,
                cipher_alg,
                outputs,
            };
            handle_sign_command(args, &config)?;
        }

        Commands::Inspect { signature, content } => {
            handle_inspect_command(signature, content)?;
        }

        Commands::List => {
            handle_list_command()?;
        }

        Commands::Config(config_cmd) => {
            handle_config_command(config_cmd, &config_manager)?;
        }
    }

    Ok(())
}

fn handle_sign_command(args: SignCommandArgs, config: &SignletConfiguration) -> Result<()> {
    let digest_alg: DigestAlgorithm = args.digest_alg.parse()?;
    let cipher_alg: CipherAlgorithm = args.cipher_alg.parse()?;
    log::debug!("Digest algorithm {digest_alg}, cipher algorithm {cipher_alg}");

    let mut flags = SignFlags::empty();
    flags.set(SignFlags::DETACHED_SIGNATURE, args.detached_signature);
    flags.set(SignFlags::CONTENT_ATTACHED, args.attached_content);

    let certs: Vec<PathBuf> = match args.cert {
        Some(cert) => std::iter::once(cert).chain(args.ca_certs).collect(),
        None => {
            let mut certs = config.default_certs();
            certs.extend(args.ca_certs);
            certs
        }
    };

    let mut request = SigningRequest::new(
        args.signaturelet
            .unwrap_or_else(|| config.signaturelet.clone()),
        args.key.unwrap_or_else(|| config.key.clone()),
    )
    .with_signed_files(args.files)
    .with_certs(certs)
    .with_flags(flags);
    if !args.outputs.is_empty() {
        request = request.with_output_files(args.outputs);
    }

    let registry = SignatureletRegistry::new();
    registry.register(Box::new(SeLoader::with_digest(digest_alg)))?;
    let loader = SignatureletLoader::new(Arc::new(registry), config.loader_config());
    let mut workflow = SignWorkflow::new(loader);
    let outcome = workflow.sign(&request)?;

    for output in &outcome.outputs {
        println!(
            "{} -> {} ({} bytes)",
            output.input.display(),
            output.output.display(),
            output.size
        );
    }
    log::info!(
        "{} file(s) signed by {} in {:.2}s",
        outcome.outputs.len(),
        outcome.signaturelet,
        outcome.duration.as_secs_f64()
    );
    workflow.finish(&outcome.signaturelet)?;

    Ok(())
}

fn handle_inspect_command(signature: PathBuf, content: Option<PathBuf>) -> Result<()> {
    let der = std::fs::read(&signature).into_diagnostic()?;
    let detached = content
        .as_ref()
        .map(std::fs::read)
        .transpose()
        .into_diagnostic()?;

    let signed = crypto::pkcs7_content(&der, detached.as_deref()).map_err(SigningError::from)?;
    println!("Signature: {} ({} bytes)", signature.display(), der.len());
    println!("Signed content: {} bytes", signed.len());

    if let Some(path) = &content {
        println!("Detached signature matches {}", path.display());
        return Ok(());
    }

    let container = SelSignature::parse(&signed)?;
    let header = container.header();
    println!("SELoader container:");
    println!("  Revision: {}", header.revision);
    println!("  Tags: {}", header.number_of_tag);
    println!("  Payload size: {}", header.payload_size);

    for tag in container.tags() {
        let data = container.data(tag);
        let label = match tag.tag {
            SelTagKind::HashAlgorithm => container
                .hash_algorithm()?
                .map(|alg| format!("{alg:?}"))
                .unwrap_or_default(),
            _ => hex::encode(&data[..data.len().min(64)]),
        };
        println!(
            "  {:?} (offset {}, size {}): {label}",
            tag.tag, tag.data_offset, tag.data_size
        );
    }

    Ok(())
}

fn handle_list_command() -> Result<()> {
    let registry = SignatureletRegistry::with_builtins()?;

    for descriptor in registry.descriptors() {
        println!("{}: {}", descriptor.id, descriptor.description);
        println!(
            "  Digest: {}, cipher: {:?}, detached: {}",
            descriptor.digest_alg, descriptor.cipher_alg, descriptor.detached
        );
        for pattern in &descriptor.suffix_patterns {
            println!(
                "  Flags {:#x}: set {}, unset {}",
                pattern.flag,
                pattern.suffix_if_flag_set.as_deref().unwrap_or("-"),
                pattern.suffix_if_flag_unset.as_deref().unwrap_or("-")
            );
        }
    }

    Ok(())
}

fn handle_config_command(config_cmd: ConfigCommands, config_manager: &ConfigManager) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => {
            let config = config_manager.load_or_default()?;
            println!("Current Configuration:");
            println!("  Key: {}", config.key.display());
            println!("  Certificate: {}", config.cert.display());
            for ca in &config.ca_certs {
                println!("  CA certificate: {}", ca.display());
            }
            println!("  Signaturelet: {}", config.signaturelet);
            println!(
                "  Signaturelet directory: {}",
                config.signaturelet_dir.display()
            );
            println!("  Search path variable: {}", config.search_path_var);
            println!("  Module extension: {}", config.module_extension);
            println!(
                "  Configuration file: {}",
                config_manager.config_path().display()
            );
        }

        ConfigCommands::Init => {
            config_manager.save(&SignletConfiguration::default())?;
            println!(
                "Configuration initialized: {}",
                config_manager.config_path().display()
            );
        }

        ConfigCommands::Set { key, value } => {
            config_manager.update_value(&key, &value)?;
            println!("Configuration updated: {key} = {value}");
        }

        ConfigCommands::Export { format, output } => {
            let content = config_manager.export_config(format.into())?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).into_diagnostic()?;
                println!("Configuration exported to: {}", output_path.display());
            } else {
                println!("{content}");
            }
        }

        ConfigCommands::Import { file, format } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            config_manager.import_config(&content, format.into())?;
            println!("Configuration imported from: {}", file.display());
        }
    }

    Ok(())
}
