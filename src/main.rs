use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
mod secret;
use ecies_legacy::{Backend, EncryptedPayload, from_hex, strip_hex_prefix, to_hex};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    /// libsecp256k1 bindings
    Native,
    /// Pure Rust (k256)
    Pure,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Native => Backend::Native,
            BackendArg::Pure => Backend::Pure,
        }
    }
}

#[derive(Debug, clap::Args)]
struct PayloadArgs {
    /// Read the payload from a file instead of the command line
    #[arg(long, value_name = "PATH", conflicts_with = "payload")]
    input: Option<PathBuf>,

    /// Hex wire payload (optional 0x prefix) or JSON object
    payload: Option<String>,
}

impl PayloadArgs {
    fn load(&self) -> Result<EncryptedPayload> {
        let text = match (&self.payload, &self.input) {
            (Some(p), _) => p.clone(),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            (None, None) => bail!("no payload given (pass it as an argument or use --input)"),
        };

        let text = text.trim();
        if text.starts_with('{') {
            serde_json::from_str(text).context("invalid JSON payload")
        } else {
            Ok(from_hex(text)?)
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ecies-legacy")]
#[command(
    version,
    about = "secp256k1 ECIES compatible with the legacy eccrypto wire format."
)]
struct Cli {
    /// Curve backend
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "native",
        env = "ECIES_BACKEND"
    )]
    backend: BackendArg,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the public key of the private key in ECIES_PRIVATE_KEY
    Pubkey {
        /// Print the 33-byte compressed form
        #[arg(long, default_value_t = false)]
        compressed: bool,
    },

    /// Encrypts a message to a public key
    #[command(arg_required_else_help = true)]
    Encrypt {
        /// Recipient public key as hex (33 or 65 bytes)
        #[arg(long, value_name = "PUBKEY_HEX")]
        to: String,

        /// Print the JSON object form instead of hex
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Encrypt the contents of a file
        #[arg(long, value_name = "PATH", conflicts_with = "message")]
        input: Option<PathBuf>,

        message: Option<String>,
    },

    /// Decrypts a payload with the private key in ECIES_PRIVATE_KEY
    Decrypt {
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Shows the fields of a payload without decrypting it
    Inspect {
        #[command(flatten)]
        payload: PayloadArgs,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();
    let ecies = Backend::from(args.backend).engine()?;

    match args.command {
        Commands::Pubkey { compressed } => {
            let key = secret::read_private_key()?;
            let public = ecies.public_key(&key, compressed)?;
            println!("{}", hex::encode(public));
        }
        Commands::Encrypt {
            to,
            json,
            input,
            message,
        } => {
            let public = hex::decode(strip_hex_prefix(&to))
                .context("recipient public key is not valid hex")?;

            let plaintext = match (message, input) {
                (Some(m), _) => m.into_bytes(),
                (None, Some(path)) => {
                    fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?
                }
                (None, None) => bail!("no message given (pass it as an argument or use --input)"),
            };

            let payload = ecies.encrypt(&public, &plaintext)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}", to_hex(&payload)?);
            }
        }
        Commands::Decrypt { payload } => {
            let payload = payload.load()?;
            let key = secret::read_private_key()?;
            let plaintext = ecies.decrypt(&key, &payload)?;

            let mut stdout = io::stdout().lock();
            stdout.write_all(&plaintext)?;
            stdout.flush()?;
        }
        Commands::Inspect { payload } => {
            let payload = payload.load()?;
            let label_width = "ephemeral key".len();

            println!("{:<label_width$}  {}", "iv", hex::encode(payload.iv()));
            println!(
                "{:<label_width$}  {}",
                "ephemeral key",
                hex::encode(payload.ephemeral_public_key())
            );
            println!(
                "{:<label_width$}  {} bytes",
                "ciphertext",
                payload.ciphertext().len()
            );
            println!("{:<label_width$}  {}", "mac", hex::encode(payload.mac()));
            println!("{:<label_width$}  {} bytes", "wire length", payload.wire_len());
        }
    }

    Ok(())
}
