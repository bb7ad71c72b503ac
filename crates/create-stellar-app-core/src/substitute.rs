//! Placeholder token substitution over the generated files.
//!
//! Templates embed literal markers such as `__APP_NAME__`. After the copy, a
//! fixed set of files is rewritten with every marker replaced by the value
//! resolved from the [`ScaffoldRequest`]. Replacement is plain string
//! replacement of all occurrences, applied token by token in map order, so a
//! value that itself contains a token may be rewritten again by a later entry.
//!
//! Each file is modelled as a [`FileRole`] that maps to one concrete path per
//! [`LanguageMode`]. Files missing from the project are skipped.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, ScaffoldError};
use crate::request::{LanguageMode, ScaffoldRequest};

pub const APP_NAME_TOKEN: &str = "__APP_NAME__";
pub const HORIZON_URL_TOKEN: &str = "__HORIZON_URL__";
pub const SOROBAN_RPC_URL_TOKEN: &str = "__SOROBAN_RPC_URL__";
pub const NETWORK_TOKEN: &str = "__NETWORK__";
pub const WALLETS_TOKEN: &str = "__WALLETS__";

/// Environment sample shipped with every template.
pub const ENV_SAMPLE_FILE: &str = ".env.example";

/// A generated file that carries placeholder tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Manifest,
    Readme,
    WalletProvider,
    WalletKit,
    ContractHook,
    EnvSample,
}

impl FileRole {
    pub const ALL: [FileRole; 6] = [
        Self::Manifest,
        Self::Readme,
        Self::WalletProvider,
        Self::WalletKit,
        Self::ContractHook,
        Self::EnvSample,
    ];

    /// Path of this file relative to the project root.
    pub fn relative_path(self, language: LanguageMode) -> &'static str {
        let typed = language.is_typed();
        match self {
            Self::Manifest => "package.json",
            Self::Readme => "README.md",
            Self::WalletProvider if typed => "src/providers/WalletProvider.tsx",
            Self::WalletProvider => "src/providers/WalletProvider.jsx",
            Self::WalletKit if typed => "src/lib/stellar-wallets-kit.ts",
            Self::WalletKit => "src/lib/stellar-wallets-kit.js",
            Self::ContractHook if typed => "src/hooks/useContract.ts",
            Self::ContractHook => "src/hooks/useContract.js",
            Self::EnvSample => ENV_SAMPLE_FILE,
        }
    }
}

/// Relative paths of every generated file for `language`.
pub fn generated_files(language: LanguageMode) -> Vec<&'static str> {
    FileRole::ALL
        .iter()
        .map(|role| role.relative_path(language))
        .collect()
}

/// Ordered token → value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    entries: Vec<(String, String)>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every token from `request`, applying its defaults.
    pub fn from_request(request: &ScaffoldRequest) -> Self {
        // Serializing a Vec<String> cannot fail.
        let wallets = serde_json::to_string(&request.wallets()).unwrap_or_else(|_| "[]".into());

        let mut map = Self::new();
        map.insert(APP_NAME_TOKEN, &request.app_name);
        map.insert(HORIZON_URL_TOKEN, request.horizon_url());
        map.insert(SOROBAN_RPC_URL_TOKEN, request.soroban_rpc_url());
        map.insert(NETWORK_TOKEN, request.network().label());
        map.insert(WALLETS_TOKEN, &wallets);
        map
    }

    /// Set `token` to `value`, replacing an earlier value in place.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every occurrence of every token in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.iter()
            .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
    }
}

/// Rewrite each existing file in `files` (relative to `root`) with `map`
/// applied. Returns the number of files that changed.
///
/// Missing files are skipped. A file without any token is left untouched.
pub fn substitute(root: &Path, files: &[&str], map: &SubstitutionMap) -> Result<usize> {
    let mut changed = 0;
    for relative in files {
        let path = root.join(relative);
        if !path.is_file() {
            tracing::debug!("skipping {relative}: not present");
            continue;
        }

        let original = std::fs::read_to_string(&path)?;
        let rendered = map.apply(&original);
        if rendered == original {
            tracing::debug!("no tokens in {relative}");
            continue;
        }

        write_atomic(&path, rendered.as_bytes())?;
        tracing::debug!("substituted tokens in {relative}");
        changed += 1;
    }
    Ok(changed)
}

/// Replace `path` with `contents` through a temporary file in the same
/// directory, so a failed write never leaves a truncated file.
///
/// Existing permissions are carried over to the new file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| ScaffoldError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
