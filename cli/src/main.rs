mod commands;

use clap::{Parser, Subcommand};
use lab_crypto::config::LabConfig;
use lab_crypto::errors::LabCryptoError;
use lab_crypto::preset::Language;
use num_bigint::BigInt;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lab-cli", version, about = "Classical and public-key cipher workbench")]
pub struct Cli {
    /// JSON file with `LabConfig` overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// RSA key generation and text encryption
    Rsa {
        #[command(subcommand)]
        action: RsaCommands,
    },
    /// Diffie-Hellman exchange and AES-256-CBC text wrap
    Dh {
        #[command(subcommand)]
        action: DhCommands,
    },
    /// Merkle-Hellman knapsack cipher
    Knapsack {
        #[command(subcommand)]
        action: KnapsackCommands,
    },
    /// Polyalphabetic Trithemius cipher and its cryptanalysis
    Trithemius {
        #[command(subcommand)]
        action: TrithemiusCommands,
    },
    /// Caesar shift over the extended Latin table
    Caesar {
        text: String,
        #[arg(short, long, allow_hyphen_values = true)]
        shift: i64,
        #[arg(short, long)]
        decrypt: bool,
    },
    /// Gamma (XOR) cipher; the same call encrypts and decrypts
    Gamma {
        text: String,
        /// Repeating gamma, or a pad prefixed with `OTP:`
        #[arg(short, long, conflicts_with = "one_time_pad")]
        gamma: Option<String>,
        /// Generate a fresh one-time pad as long as the text
        #[arg(long)]
        one_time_pad: bool,
        #[arg(short, long, default_value = "en")]
        language: Language,
        /// Also print the binary index of every symbol
        #[arg(long)]
        binary: bool,
    },
    /// Symbol frequency profile of a text
    Frequency { text: String },
}

#[derive(Subcommand)]
pub enum RsaCommands {
    /// Generate a key pair (JSON)
    Keygen {
        /// Modulus size in bits
        #[arg(short, long)]
        bits: Option<u64>,
    },
    Encrypt {
        text: String,
        #[arg(short)]
        e: BigInt,
        #[arg(short)]
        n: BigInt,
    },
    Decrypt {
        cipher: String,
        #[arg(short)]
        d: BigInt,
        #[arg(short)]
        n: BigInt,
    },
}

#[derive(Subcommand)]
pub enum DhCommands {
    /// Generate group parameters (JSON)
    Params {
        #[arg(short, long)]
        bits: Option<u64>,
    },
    /// Run an exchange between two parties and derive AES key material
    Exchange {
        #[arg(short)]
        p: Option<BigInt>,
        #[arg(short, requires = "p")]
        g: Option<BigInt>,
        #[arg(long)]
        private_bits: Option<u64>,
    },
    Encrypt {
        text: String,
        /// Hex key material
        #[arg(short, long)]
        key: String,
    },
    Decrypt {
        cipher: String,
        #[arg(short, long)]
        key: String,
    },
}

#[derive(Subcommand)]
pub enum KnapsackCommands {
    /// Generate a key pair (JSON)
    Keygen {
        #[arg(short, long)]
        size: Option<usize>,
    },
    Encrypt {
        text: String,
        /// Public key, comma separated
        #[arg(short, long)]
        public_key: String,
        #[arg(short, long, default_value = "en")]
        language: Language,
    },
    Decrypt {
        /// Cipher values, comma separated
        cipher: String,
        /// Private key, comma separated
        #[arg(long)]
        private_key: String,
        #[arg(short)]
        m: i64,
        #[arg(short)]
        n: i64,
        #[arg(short, long, default_value = "en")]
        language: Language,
    },
}

/// Key flags shared by `trithemius encrypt` and `trithemius decrypt`.
#[derive(clap::Args)]
pub struct PolyKeyArgs {
    #[arg(short, allow_hyphen_values = true)]
    pub a: Option<i64>,
    #[arg(short, allow_hyphen_values = true)]
    pub b: Option<i64>,
    /// Constant term; turns the key quadratic
    #[arg(short, allow_hyphen_values = true)]
    pub c: Option<i64>,
    #[arg(short, long, conflicts_with_all = ["a", "b", "c"])]
    pub keyword: Option<String>,
}

#[derive(Subcommand)]
pub enum TrithemiusCommands {
    Encrypt {
        text: String,
        #[command(flatten)]
        key: PolyKeyArgs,
        #[arg(short, long, default_value = "en")]
        language: Language,
    },
    Decrypt {
        cipher: String,
        #[command(flatten)]
        key: PolyKeyArgs,
        #[arg(short, long, default_value = "en")]
        language: Language,
    },
    /// Recover the key from a known plaintext/ciphertext pair (JSON)
    FindKey {
        #[arg(long)]
        plain: String,
        #[arg(long)]
        cipher: String,
        #[arg(short, long, default_value = "en")]
        language: Language,
    },
    /// Rank linear keys by the chi-squared score of their decryption (JSON)
    Attack {
        cipher: String,
        #[arg(short, long, default_value = "en")]
        language: Language,
        #[arg(short, long, default_value_t = 5)]
        top: usize,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default));
    builder.format_timestamp(None);
    let _ = builder.try_init();
}

fn load_config(path: Option<&PathBuf>) -> Result<LabConfig, LabCryptoError> {
    match path {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            LabConfig::from_json_file(path)
        }
        None => Ok(LabConfig::default()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Log to stderr (if you run with `RUST_LOG=debug`).
    init_logging(cli.verbose);

    let result =
        load_config(cli.config.as_ref()).and_then(|config| commands::run(cli.command, &config));
    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
