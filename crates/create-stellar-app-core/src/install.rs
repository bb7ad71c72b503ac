//! Dependency installation for a freshly scaffolded project.
//!
//! The pipeline only sees the [`InstallDelegate`] trait: hand it a directory
//! and options, get back an [`InstallResult`]. [`PackageManagerInstaller`] is
//! the real implementation, running `<pm> install` as a child process.
//!
//! Delegates never return errors. Every failure mode (missing binary, spawn
//! failure, non-zero exit, timeout) is reported as `success == false` with
//! [`InstallDiagnostics`] describing what happened; the orchestrator decides
//! whether that is fatal.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;

/// Environment variable set by `npx`, `pnpm dlx`, `yarn create` and `bunx`.
pub const USER_AGENT_ENV: &str = "npm_config_user_agent";

/// Lines of stderr kept in diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// Supported JavaScript package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "npm" => Some(Self::Npm),
            "yarn" => Some(Self::Yarn),
            "pnpm" => Some(Self::Pnpm),
            "bun" => Some(Self::Bun),
            _ => None,
        }
    }

    /// Parse an npm-style user agent such as `pnpm/9.1.0 npm/? node/v20.11.1`.
    pub fn from_user_agent(agent: &str) -> Option<Self> {
        let first = agent.split_whitespace().next()?;
        let name = first.split('/').next()?;
        Self::from_name(name)
    }

    /// The package manager that launched this process, or npm.
    pub fn detect() -> Self {
        std::env::var(USER_AGENT_ENV)
            .ok()
            .and_then(|agent| Self::from_user_agent(&agent))
            .unwrap_or(Self::Npm)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to an install run.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Project directory to install in.
    pub working_dir: PathBuf,
    pub skip: bool,
    /// `None` means detect.
    pub package_manager: Option<PackageManager>,
    pub timeout: Option<Duration>,
}

/// Extra detail about an install run, for error messages and logs.
#[derive(Debug, Clone, Default)]
pub struct InstallDiagnostics {
    /// Installation was skipped on request; nothing ran.
    pub skipped: bool,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Last lines of the child's stderr, or the spawn error.
    pub stderr: String,
    pub elapsed: Duration,
}

/// Outcome of an install run.
#[derive(Debug, Clone)]
pub struct InstallResult {
    pub success: bool,
    /// The package manager that was (or would have been) used.
    pub package_manager: PackageManager,
    pub diagnostics: InstallDiagnostics,
}

impl InstallResult {
    fn failed(package_manager: PackageManager, diagnostics: InstallDiagnostics) -> Self {
        Self {
            success: false,
            package_manager,
            diagnostics,
        }
    }
}

/// Installs dependencies into a scaffolded project.
#[async_trait]
pub trait InstallDelegate: Send + Sync {
    async fn install(&self, options: &InstallOptions) -> InstallResult;
}

/// Runs `<package manager> install` in the project directory.
#[derive(Debug, Clone, Default)]
pub struct PackageManagerInstaller {
    /// Directories searched for the package manager instead of `PATH`.
    search_path: Option<OsString>,
}

impl PackageManagerInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up package manager binaries in `paths` (`PATH` syntax) only.
    pub fn with_search_path(paths: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(paths.into()),
        }
    }

    fn locate(&self, pm: PackageManager, cwd: &Path) -> std::result::Result<PathBuf, which::Error> {
        match &self.search_path {
            Some(paths) => which::which_in(pm.as_str(), Some(paths), cwd),
            None => which::which(pm.as_str()),
        }
    }
}

#[async_trait]
impl InstallDelegate for PackageManagerInstaller {
    async fn install(&self, options: &InstallOptions) -> InstallResult {
        let pm = options.package_manager.unwrap_or_else(PackageManager::detect);

        if options.skip {
            tracing::info!("skipping dependency install");
            return InstallResult {
                success: true,
                package_manager: pm,
                diagnostics: InstallDiagnostics {
                    skipped: true,
                    ..Default::default()
                },
            };
        }

        let binary = match self.locate(pm, &options.working_dir) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{pm} not found on PATH");
                return InstallResult::failed(
                    pm,
                    InstallDiagnostics {
                        stderr: format!("{pm} not found: {e}"),
                        ..Default::default()
                    },
                );
            }
        };

        tracing::info!("running `{pm} install` in {}", options.working_dir.display());
        let started = Instant::now();
        let mut cmd = Command::new(binary);
        cmd.arg("install")
            .current_dir(&options.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let child = cmd.output();

        let output = match options.timeout {
            Some(limit) => match tokio::time::timeout(limit, child).await {
                Ok(output) => output,
                Err(_) => {
                    tracing::warn!("`{pm} install` timed out after {limit:?}");
                    return InstallResult::failed(
                        pm,
                        InstallDiagnostics {
                            timed_out: true,
                            elapsed: started.elapsed(),
                            ..Default::default()
                        },
                    );
                }
            },
            None => child.await,
        };

        let elapsed = started.elapsed();
        match output {
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::debug!("`{pm} install` exited with {}", output.status);
                InstallResult {
                    success: output.status.success(),
                    package_manager: pm,
                    diagnostics: InstallDiagnostics {
                        exit_code: output.status.code(),
                        stderr: tail_lines(&stderr, STDERR_TAIL_LINES),
                        elapsed,
                        ..Default::default()
                    },
                }
            }
            Err(e) => InstallResult::failed(
                pm,
                InstallDiagnostics {
                    stderr: format!("failed to run {pm}: {e}"),
                    elapsed,
                    ..Default::default()
                },
            ),
        }
    }
}

/// Keep the last `n` lines of `text`.
fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
