//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── verbose                     # global, lowers log level, enables readback
//! └── command
//!     ├── store: StoreArgs        # content.json + storage.json
//!     ├── download: DownloadArgs  # download.json, hash/locator overrides
//!     └── test: TestArgs          # storage.json
//! ```
//!
//! Connection details live in JSON files under `./config/`; keys can be
//! supplied via arguments or environment variables instead.
//!
//! # Example
//!
//! ```bash
//! CAIRN_CHUNK_KEY=... CAIRN_ROUTING_KEY=... cairn store --verify
//! cairn download --locator 516d... --output ./restored
//! ```

mod files;
mod keys;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
pub use files::{ContentFile, DownloadFile, RoutingFile, StorageFile, load_json};
pub use keys::KeyArgs;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Default location of the content store configuration.
pub const DEFAULT_CONTENT_CONFIG: &str = "./config/content.json";

/// Default location of the object store configuration.
pub const DEFAULT_STORAGE_CONFIG: &str = "./config/storage.json";

/// Default location of the download configuration.
pub const DEFAULT_DOWNLOAD_CONFIG: &str = "./config/download.json";

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "cairn")]
#[command(about = "Mirror content-addressed files into encrypted object storage")]
#[command(version)]
pub struct Cli {
    /// Log at debug level and read every upload back after writing it.
    #[arg(short, long, global = true, env = "CAIRN_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Mirror a local file into the bucket and print its shareable hash.
    #[command(visible_alias = "s")]
    Store(StoreArgs),

    /// Rebuild a mirrored file from a shareable hash or locator.
    #[command(visible_alias = "d")]
    Download(DownloadArgs),

    /// Upload a small sample object to check the bucket accepts writes.
    #[command(visible_alias = "t")]
    Test(TestArgs),
}

/// Arguments of `cairn store`.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Content store configuration (endpoint, source path, chunk size).
    #[arg(long, default_value = DEFAULT_CONTENT_CONFIG)]
    pub content: PathBuf,

    /// Object store configuration (backend, bucket, upload path).
    #[arg(long, default_value = DEFAULT_STORAGE_CONFIG)]
    pub storage: PathBuf,

    /// Read every chunk back and check it decrypts after upload.
    #[arg(long)]
    pub verify: bool,

    /// Print the hex locator only; do not publish it to the content store.
    #[arg(long)]
    pub no_publish: bool,

    #[command(flatten)]
    pub keys: KeyArgs,
}

/// Arguments of `cairn download`.
#[derive(Debug, Clone, Args)]
pub struct DownloadArgs {
    /// Download configuration (endpoint, backend, default source).
    #[arg(long, default_value = DEFAULT_DOWNLOAD_CONFIG)]
    pub config: PathBuf,

    /// Shareable hash to resolve, overriding the configuration.
    #[arg(long, conflicts_with = "locator")]
    pub hash: Option<String>,

    /// Hex locator to resolve, overriding the configuration.
    #[arg(long)]
    pub locator: Option<String>,

    /// Directory to write the file into, overriding the configuration.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub keys: KeyArgs,
}

/// Arguments of `cairn test`.
#[derive(Debug, Clone, Args)]
pub struct TestArgs {
    /// Object store configuration (backend, bucket, upload path).
    #[arg(long, default_value = DEFAULT_STORAGE_CONFIG)]
    pub storage: PathBuf,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so clap's `env` lookups can see its
    /// values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs build information and the selected command at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            verbose = self.verbose,
            "Parsed command line"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Command {
    /// Command name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Store(_) => "store",
            Self::Download(_) => "download",
            Self::Test(_) => "test",
        }
    }
}
