//! The validated input to the scaffold pipeline.
//!
//! A [`ScaffoldRequest`] carries everything the pipeline needs. Optional fields
//! fall back to the testnet defaults defined here, so a request built with
//! [`ScaffoldRequest::new`] is immediately usable.

use std::time::Duration;

use crate::error::{Result, ScaffoldError};
use crate::install::PackageManager;

/// Template used when the caller does not name one.
pub const DEFAULT_TEMPLATE: &str = "react-ts";

/// The only template shipped for JavaScript projects.
pub const JAVASCRIPT_TEMPLATE: &str = "react-js";

/// Public Horizon endpoint on testnet.
pub const DEFAULT_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";

/// Public Soroban RPC endpoint on testnet.
pub const DEFAULT_SOROBAN_RPC_URL: &str = "https://soroban-testnet.stellar.org";

/// Wallets wired into the generated wallet kit when none are requested.
pub const DEFAULT_WALLETS: [&str; 3] = ["freighter", "xbull", "albedo"];

/// Substring of a Horizon URL that marks the public (mainnet) network.
pub const PUBLIC_NETWORK_MARKER: &str = "public";

/// npm rejects package names longer than this.
const MAX_APP_NAME_LEN: usize = 214;

/// Language flavour of the generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageMode {
    TypeScript,
    JavaScript,
}

impl LanguageMode {
    pub fn is_typed(self) -> bool {
        matches!(self, Self::TypeScript)
    }
}

/// Stellar network the generated app talks to, derived from the Horizon URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Testnet,
    Public,
}

impl Network {
    /// Classify a Horizon URL. Anything without the public marker is testnet.
    pub fn from_horizon_url(url: &str) -> Self {
        if url.contains(PUBLIC_NETWORK_MARKER) {
            Self::Public
        } else {
            Self::Testnet
        }
    }

    /// Label written into the generated project (`TESTNET` or `PUBLIC`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Testnet => "TESTNET",
            Self::Public => "PUBLIC",
        }
    }
}

/// Everything needed to scaffold one project.
#[derive(Debug, Clone)]
pub struct ScaffoldRequest {
    /// Name of the new project; also the target directory name.
    pub app_name: String,
    pub language: LanguageMode,
    /// Template identifier; ignored for JavaScript projects.
    pub template: String,
    /// Overlay the Soroban contracts add-on.
    pub with_contracts: bool,
    pub horizon_url: Option<String>,
    pub soroban_rpc_url: Option<String>,
    /// Wallet identifiers in display order. Empty means the defaults.
    pub wallets: Vec<String>,
    pub skip_install: bool,
    /// `None` lets the installer detect the package manager.
    pub package_manager: Option<PackageManager>,
    pub install_timeout: Option<Duration>,
}

impl ScaffoldRequest {
    /// A request for `app_name` with every optional field at its default.
    pub fn new(app_name: impl Into<String>, language: LanguageMode) -> Self {
        Self {
            app_name: app_name.into(),
            language,
            template: DEFAULT_TEMPLATE.to_string(),
            with_contracts: false,
            horizon_url: None,
            soroban_rpc_url: None,
            wallets: Vec::new(),
            skip_install: false,
            package_manager: None,
            install_timeout: None,
        }
    }

    /// Check the application name before anything touches the filesystem.
    pub fn validate(&self) -> Result<()> {
        let name = self.app_name.as_str();
        let reason = if name.is_empty() {
            Some("name must not be empty")
        } else if name == "." || name == ".." {
            Some("name must not be a relative directory")
        } else if name.contains(['/', '\\']) {
            Some("name must not contain path separators")
        } else if name.chars().any(char::is_whitespace) {
            Some("name must not contain whitespace")
        } else if !name.chars().all(is_npm_name_char) {
            Some("name may only contain lowercase letters, digits, '-', '.', '_' and '~'")
        } else if name.starts_with('.') || name.starts_with('_') {
            Some("name must not start with '.' or '_'")
        } else if name.len() > MAX_APP_NAME_LEN {
            Some("name must be at most 214 characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ScaffoldError::InvalidAppName {
                name: name.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn horizon_url(&self) -> &str {
        self.horizon_url.as_deref().unwrap_or(DEFAULT_HORIZON_URL)
    }

    pub fn soroban_rpc_url(&self) -> &str {
        self.soroban_rpc_url
            .as_deref()
            .unwrap_or(DEFAULT_SOROBAN_RPC_URL)
    }

    pub fn network(&self) -> Network {
        Network::from_horizon_url(self.horizon_url())
    }

    /// Requested wallets, or [`DEFAULT_WALLETS`] when none were given.
    pub fn wallets(&self) -> Vec<String> {
        if self.wallets.is_empty() {
            DEFAULT_WALLETS.iter().map(|w| w.to_string()).collect()
        } else {
            self.wallets.clone()
        }
    }
}

/// Characters npm accepts in an unscoped package name.
fn is_npm_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_' | '~')
}
