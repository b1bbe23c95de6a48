use anyhow::{Context, Result, bail};
use std::io::{self, IsTerminal};
use zeroize::Zeroizing;

use ecies_legacy::crypto::PRIVATE_KEY_LEN;
use ecies_legacy::strip_hex_prefix;

pub const PRIVATE_KEY_ENV: &str = "ECIES_PRIVATE_KEY";

/// Reads the recipient's private key as hex.
///
/// Sources, first match wins: `ECIES_PRIVATE_KEY`, one line of piped stdin,
/// an interactive hidden prompt.
pub fn read_private_key() -> Result<Zeroizing<Vec<u8>>> {
    //  Environment Variable
    //  ECIES_PRIVATE_KEY=0x1234... ecies-legacy decrypt <payload>
    if let Ok(key) = std::env::var(PRIVATE_KEY_ENV) {
        let key = Zeroizing::new(key);
        if !key.trim().is_empty() {
            return parse_private_key(&key);
        }
    }

    //  stdin (Pipeline)
    //  cat key.hex | ecies-legacy decrypt <payload>
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_line(&mut buf)?;

        if !buf.trim().is_empty() {
            return parse_private_key(&buf);
        }
    }

    //  Interactive (TTY)
    if io::stdin().is_terminal() {
        let key = Zeroizing::new(rpassword::prompt_password("Private key (hex): ")?);
        if !key.trim().is_empty() {
            return parse_private_key(&key);
        }
    }

    bail!("no private key provided (set {PRIVATE_KEY_ENV} or pipe it on stdin)")
}

/// Decodes hex (optional `0x`/`0X`, surrounding whitespace ignored) into 32 bytes.
pub fn parse_private_key(text: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = Zeroizing::new(
        hex::decode(strip_hex_prefix(text)).context("private key is not valid hex")?,
    );
    if key.len() != PRIVATE_KEY_LEN {
        bail!("private key must be {PRIVATE_KEY_LEN} bytes, got {}", key.len());
    }
    Ok(key)
}
