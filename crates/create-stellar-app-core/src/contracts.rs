//! The optional Soroban contracts add-on.
//!
//! When requested, the `contracts` template under the resolved root is copied
//! over the project (same-path files are replaced, not merged). Then the
//! generated configuration is taught about it: two `package.json` scripts and
//! a contract-ID placeholder in `.env.example`. Each of these steps is skipped
//! without error if its input is missing.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, ScaffoldError};
use crate::locator::MANIFEST_FILE;
use crate::materialize::copy_tree;
use crate::substitute::{write_atomic, ENV_SAMPLE_FILE};

/// Subdirectory of a template root holding the contracts overlay.
pub const CONTRACTS_TEMPLATE: &str = "contracts";

/// Script entries added to the generated manifest.
pub const CONTRACT_SCRIPTS: [(&str, &str); 2] = [
    (
        "build:contracts",
        "cd contracts && cargo build --target wasm32-unknown-unknown --release",
    ),
    ("test:contracts", "cd contracts && cargo test"),
];

/// Block appended to the environment sample.
pub const ENV_CONTRACT_BLOCK: &str = "# Soroban contract\nVITE_CONTRACT_ID=\n";

/// What [`apply_contracts_feature`] actually changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractsReport {
    /// Files copied from the overlay (0 when it does not exist).
    pub overlay_files: usize,
    pub scripts_added: bool,
    pub env_updated: bool,
}

/// Overlay the contracts template onto `target` and wire it into the
/// generated manifest and environment sample.
pub fn apply_contracts_feature(target: &Path, template_root: &Path) -> Result<ContractsReport> {
    let mut report = ContractsReport::default();

    let overlay = template_root.join(CONTRACTS_TEMPLATE);
    if overlay.is_dir() {
        report.overlay_files = copy_tree(&overlay, target)?;
        tracing::info!("applied contracts overlay ({} files)", report.overlay_files);
    } else {
        tracing::debug!("no contracts overlay at {}", overlay.display());
    }

    report.scripts_added = add_contract_scripts(&target.join(MANIFEST_FILE))?;
    report.env_updated = append_env_block(&target.join(ENV_SAMPLE_FILE))?;
    Ok(report)
}

/// Add or replace the contract scripts. Returns `false` if there is no manifest.
fn add_contract_scripts(manifest: &Path) -> Result<bool> {
    if !manifest.is_file() {
        tracing::debug!("no manifest at {}, skipping scripts", manifest.display());
        return Ok(false);
    }

    let contents = std::fs::read_to_string(manifest)?;
    let mut json: Value =
        serde_json::from_str(&contents).map_err(|source| ScaffoldError::ManifestParse {
            path: manifest.to_path_buf(),
            source,
        })?;

    let Some(root) = json.as_object_mut() else {
        return Err(ScaffoldError::ManifestNotObject(manifest.to_path_buf()));
    };

    let scripts = root
        .entry("scripts")
        .or_insert_with(|| Value::Object(Map::new()));
    if !scripts.is_object() {
        *scripts = Value::Object(Map::new());
    }
    if let Some(scripts) = scripts.as_object_mut() {
        for (name, command) in CONTRACT_SCRIPTS {
            scripts.insert(name.to_string(), Value::String(command.to_string()));
        }
    }

    let mut rendered = serde_json::to_string_pretty(&json).map_err(|source| {
        ScaffoldError::ManifestParse {
            path: manifest.to_path_buf(),
            source,
        }
    })?;
    rendered.push('\n');
    write_atomic(manifest, rendered.as_bytes())?;
    Ok(true)
}

/// Append the contract block. Returns `false` without creating the file if it
/// does not exist.
fn append_env_block(env_sample: &Path) -> Result<bool> {
    if !env_sample.is_file() {
        tracing::debug!("no {}, skipping contract env block", env_sample.display());
        return Ok(false);
    }

    let mut contents = std::fs::read_to_string(env_sample)?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push('\n');
    contents.push_str(ENV_CONTRACT_BLOCK);
    write_atomic(env_sample, contents.as_bytes())?;
    Ok(true)
}
