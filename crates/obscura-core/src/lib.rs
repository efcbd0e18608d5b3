// SPDX-FileCopyrightText: 2026 Obscura Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Obscura configuration vault.
//!
//! Provides the shared error type and the typed vault boundary (`Token`,
//! `SealedValue`) used by the vault, security, and CLI crates.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ObscuraError;
pub use types::{SealedValue, Token};
