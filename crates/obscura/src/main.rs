// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Obscura - provisioning and verification tooling for the encrypted
//! configuration vault.
//!
//! This is the offline side of the vault: it turns plaintext name/value
//! pairs into `K|...=V|...` lines and verifies that an existing vault file
//! decrypts under the current `ENCRYPTION_KEY`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use obscura_core::ObscuraError;
use obscura_security::SecretRedactor;
use obscura_vault::store::{self, SecretStore, DEFAULT_VAULT_PATH};
use obscura_vault::{crypto, kdf};

/// Obscura - encrypted configuration vault tooling.
#[derive(Parser, Debug)]
#[command(name = "obscura", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the lookup token for a conceptual key name.
    Token {
        /// Plaintext key name, e.g. "mail.password".
        name: String,
    },
    /// Print a ready-to-paste vault line for a name/value pair.
    Seal {
        /// Plaintext key name.
        name: String,
        /// Plaintext value to encrypt.
        value: String,
    },
    /// Load a vault file and verify that every entry decrypts.
    Check {
        /// Vault file to verify.
        #[arg(long, default_value = DEFAULT_VAULT_PATH)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("obscura: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, ObscuraError> {
    match command {
        Commands::Token { name } => {
            let keys = derive_from_env()?;
            println!("{}", crypto::tokenize(keys.mac_key(), &name));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Seal { name, value } => {
            let keys = derive_from_env()?;
            let token = crypto::tokenize(keys.mac_key(), &name);
            let sealed = crypto::seal(keys.enc_key(), &value)?;
            println!("{token}={sealed}");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file } => check(&file),
    }
}

/// Derive the working keys from `ENCRYPTION_KEY`.
fn derive_from_env() -> Result<kdf::DerivedKeys, ObscuraError> {
    let master = store::master_secret_from_env()?;
    kdf::derive_keys(&master)
}

/// Decrypt every entry in `file` and report per-token status.
///
/// Tokens are already stored in the clear on disk and carry no plaintext;
/// values never reach the report.
fn check(file: &Path) -> Result<ExitCode, ObscuraError> {
    let store = SecretStore::load_from_path(file, Arc::new(SecretRedactor::new()))?;

    let mut failures = 0usize;
    for token in store.tokens() {
        match store.get(token) {
            Ok(_) => println!("ok      {token}"),
            Err(e) => {
                failures += 1;
                println!("FAILED  {token}  ({e})");
            }
        }
    }
    println!("{} entries, {failures} failed", store.len());

    if failures == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Initializes the tracing subscriber for CLI diagnostics.
///
/// Diagnostics go to stderr; stdout carries only vault lines and the check
/// report.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("obscura=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use secrecy::ExposeSecret;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sealed_line_roundtrips_through_a_store() {
        // What `obscura seal` prints must load and decrypt as a vault line.
        let master = [0x07u8; 32];
        let keys = kdf::derive_keys(&master).unwrap();
        let token = crypto::tokenize(keys.mac_key(), "mail.password");
        let sealed = crypto::seal(keys.enc_key(), "imap-pass-123").unwrap();
        let line = format!("{token}={sealed}\n");

        let store = SecretStore::from_reader(
            &master,
            line.as_bytes(),
            Arc::new(SecretRedactor::new()),
        )
        .unwrap();
        let value = store.get(&token).unwrap().unwrap();
        assert_eq!(value.expose_secret(), "imap-pass-123");
    }
}
