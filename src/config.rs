//! Runtime configuration.
//!
//! Defaults are compiled in; each value can be overridden from the
//! environment when the server starts.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DOCS_DIR: &str = "pdfs";

pub const ADDR_VAR: &str = "PMCODEX_ADDR";
pub const DOCS_DIR_VAR: &str = "PMCODEX_DOCS_DIR";
pub const SECRET_VAR: &str = "PMCODEX_SECRET";

#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub addr: String,
    /// Directory holding `book<id>.pdf` files, served under `/pdfs`.
    pub docs_dir: PathBuf,
    /// Session signing key. `None` means a random key per process.
    pub secret: Option<Vec<u8>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            docs_dir: PathBuf::from(DEFAULT_DOCS_DIR),
            secret: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            addr: get(ADDR_VAR).unwrap_or(defaults.addr),
            docs_dir: get(DOCS_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.docs_dir),
            secret: get(SECRET_VAR).map(String::into_bytes),
        }
    }
}
