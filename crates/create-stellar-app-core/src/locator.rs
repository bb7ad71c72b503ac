//! Template root discovery.
//!
//! Templates ship as plain directory trees next to the binary, but where exactly
//! depends on how the tool was deployed. [`TemplateLocator`] holds an ordered
//! list of candidate roots and picks the first one whose `{root}/{template}`
//! contains a `package.json`.
//!
//! If no candidate qualifies, the **last** candidate is used anyway. Some
//! packaging layouts make the manifest probe fail even though the templates are
//! reachable, so an unmatched search is not an error. The copy step will report
//! a missing template directory if the fallback is genuinely wrong.

use std::path::{Path, PathBuf};

use crate::contracts::CONTRACTS_TEMPLATE;
use crate::error::{Result, ScaffoldError};
use crate::request::{LanguageMode, DEFAULT_TEMPLATE, JAVASCRIPT_TEMPLATE};

/// File whose presence marks a directory as a usable template.
pub const MANIFEST_FILE: &str = "package.json";

/// Environment variable naming an extra template root searched first.
pub const TEMPLATES_DIR_ENV: &str = "CREATE_STELLAR_APP_TEMPLATES";

/// Templates directory of this workspace, recorded at compile time.
const WORKSPACE_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates");

/// The template chosen for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// Root directory holding the template (and the contracts overlay).
    pub root: PathBuf,
    /// Template subdirectory name under `root`.
    pub name: String,
}

impl ResolvedTemplate {
    /// Full path of the template directory.
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.name)
    }
}

/// Ordered search over candidate template roots.
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    candidates: Vec<PathBuf>,
}

impl TemplateLocator {
    /// Create a locator over an explicit candidate list, searched in order.
    ///
    /// # Panics
    ///
    /// Panics if `candidates` is empty: there would be no fallback root.
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        assert!(
            !candidates.is_empty(),
            "template locator needs at least one candidate root"
        );
        Self { candidates }
    }

    /// Build the standard search list relative to the directory holding the
    /// running binary.
    ///
    /// Order: `override_dir`, bundled (`{exe}/templates`), installed
    /// (`{exe}/../share/create-stellar-app/templates`), development checkout
    /// (`{exe}/../../templates`), and finally the workspace templates recorded
    /// at build time, which serves as the fallback.
    pub fn from_exe_dir(exe_dir: &Path, override_dir: Option<PathBuf>) -> Self {
        let mut candidates = Vec::with_capacity(5);
        candidates.extend(override_dir);
        candidates.push(exe_dir.join("templates"));
        candidates.push(
            exe_dir
                .join("..")
                .join("share")
                .join("create-stellar-app")
                .join("templates"),
        );
        candidates.push(exe_dir.join("..").join("..").join("templates"));
        candidates.push(PathBuf::from(WORKSPACE_TEMPLATES));
        Self::new(candidates)
    }

    /// Build the standard search list for the currently running executable.
    pub fn from_current_exe(override_dir: Option<PathBuf>) -> Result<Self> {
        let exe = std::env::current_exe()?;
        let exe_dir = exe.parent().unwrap_or(Path::new(".")).to_path_buf();
        Ok(Self::from_exe_dir(&exe_dir, override_dir))
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Resolve the template to scaffold from.
    ///
    /// JavaScript projects always use [`JAVASCRIPT_TEMPLATE`]; asking for any
    /// template other than the default in that mode fails before the
    /// filesystem is touched.
    pub fn resolve(&self, template: &str, language: LanguageMode) -> Result<ResolvedTemplate> {
        let name = match language {
            LanguageMode::TypeScript => template,
            LanguageMode::JavaScript if template == DEFAULT_TEMPLATE => JAVASCRIPT_TEMPLATE,
            LanguageMode::JavaScript => {
                return Err(ScaffoldError::UnsupportedTemplate {
                    template: template.to_string(),
                    default: DEFAULT_TEMPLATE.to_string(),
                });
            }
        };

        for root in &self.candidates {
            let probe = root.join(name).join(MANIFEST_FILE);
            tracing::debug!("probing {}", probe.display());
            if probe.is_file() {
                return Ok(ResolvedTemplate {
                    root: root.clone(),
                    name: name.to_string(),
                });
            }
        }

        let fallback = self.fallback();
        tracing::warn!(
            "template '{name}' not found in any candidate root, falling back to {}",
            fallback.display()
        );
        Ok(ResolvedTemplate {
            root: fallback.to_path_buf(),
            name: name.to_string(),
        })
    }

    /// List template names available under the first existing candidate root.
    ///
    /// The contracts overlay and directories without a manifest are skipped.
    pub fn list_templates(&self) -> Result<Vec<String>> {
        let Some(root) = self.candidates.iter().find(|c| c.is_dir()) else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name == CONTRACTS_TEMPLATE {
                continue;
            }
            if entry.path().join(MANIFEST_FILE).is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn fallback(&self) -> &Path {
        // `new` guarantees at least one candidate.
        self.candidates
            .last()
            .map(PathBuf::as_path)
            .unwrap_or(Path::new("templates"))
    }
}
