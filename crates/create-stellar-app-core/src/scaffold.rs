//! The scaffold orchestrator.
//!
//! [`Scaffolder::scaffold`] runs the pipeline in a fixed order:
//!
//! ```text
//! validate → resolve template → check target → copy → contracts → substitute → install
//! ```
//!
//! Validation, resolution and the target check never write to disk. Failures
//! after the copy has started leave the partial project in place; nothing is
//! rolled back. Two concurrent runs with the same name are only separated by
//! the existence check, which is not atomic across processes.

use std::path::PathBuf;

use crate::contracts::{apply_contracts_feature, ContractsReport};
use crate::error::{Result, ScaffoldError};
use crate::install::{InstallDelegate, InstallOptions, InstallResult, PackageManager};
use crate::locator::{ResolvedTemplate, TemplateLocator};
use crate::materialize::{materialize, path_taken};
use crate::request::ScaffoldRequest;
use crate::substitute::{generated_files, substitute, SubstitutionMap};

/// Progress notifications emitted while scaffolding.
#[derive(Debug, Clone)]
pub enum ScaffoldEvent {
    TemplateResolved(ResolvedTemplate),
    /// The template tree is on disk. Emitted exactly once per successful copy.
    Materialized { app_name: String, target: PathBuf },
    ContractsApplied(ContractsReport),
    TokensSubstituted { files: usize },
    InstallStarted {
        package_manager: Option<PackageManager>,
        skip: bool,
    },
    InstallFinished(InstallResult),
}

/// Callback receiving [`ScaffoldEvent`]s.
pub type EventObserver = Box<dyn Fn(&ScaffoldEvent) + Send + Sync>;

/// What a successful scaffold produced.
#[derive(Debug, Clone)]
pub struct ScaffoldOutcome {
    pub target: PathBuf,
    pub template: ResolvedTemplate,
    /// `None` unless the contracts feature was requested.
    pub contracts: Option<ContractsReport>,
    pub install: InstallResult,
}

/// Runs scaffold requests against a template locator and install delegate.
pub struct Scaffolder {
    locator: TemplateLocator,
    installer: Box<dyn InstallDelegate>,
    working_dir: PathBuf,
    observer: Option<EventObserver>,
}

impl Scaffolder {
    /// Projects are created as `{working_dir}/{app_name}`.
    pub fn new(
        locator: TemplateLocator,
        installer: Box<dyn InstallDelegate>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            locator,
            installer,
            working_dir: working_dir.into(),
            observer: None,
        }
    }

    pub fn with_observer(
        mut self,
        observer: impl Fn(&ScaffoldEvent) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Scaffold one project.
    pub async fn scaffold(&self, request: &ScaffoldRequest) -> Result<ScaffoldOutcome> {
        request.validate()?;

        let template = self.locator.resolve(&request.template, request.language)?;
        tracing::info!("using template {}", template.path().display());
        self.emit(ScaffoldEvent::TemplateResolved(template.clone()));

        let target = self.working_dir.join(&request.app_name);
        if path_taken(&target) {
            return Err(ScaffoldError::DirectoryExists(target));
        }

        materialize(&template, &target)?;
        self.emit(ScaffoldEvent::Materialized {
            app_name: request.app_name.clone(),
            target: target.clone(),
        });

        let contracts = if request.with_contracts {
            let report = apply_contracts_feature(&target, &template.root)?;
            self.emit(ScaffoldEvent::ContractsApplied(report.clone()));
            Some(report)
        } else {
            None
        };

        let map = SubstitutionMap::from_request(request);
        let files = substitute(&target, &generated_files(request.language), &map)?;
        tracing::info!("substituted tokens in {files} files");
        self.emit(ScaffoldEvent::TokensSubstituted { files });

        let options = InstallOptions {
            working_dir: target.clone(),
            skip: request.skip_install,
            package_manager: request.package_manager,
            timeout: request.install_timeout,
        };
        self.emit(ScaffoldEvent::InstallStarted {
            package_manager: options.package_manager,
            skip: options.skip,
        });
        let install = self.installer.install(&options).await;
        self.emit(ScaffoldEvent::InstallFinished(install.clone()));

        if !install.success {
            if request.skip_install {
                tracing::debug!("install reported failure while skipped, ignoring");
            } else {
                tracing::warn!(
                    "`{} install` failed: {}",
                    install.package_manager,
                    install.diagnostics.stderr
                );
                return Err(ScaffoldError::InstallFailed {
                    package_manager: install.package_manager,
                    directory: target,
                });
            }
        }

        Ok(ScaffoldOutcome {
            target,
            template,
            contracts,
            install,
        })
    }

    fn emit(&self, event: ScaffoldEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::Value;

    use crate::install::InstallDiagnostics;
    use crate::request::LanguageMode;

    /// Install delegate that records its options and returns a fixed result.
    struct StubInstaller {
        success: bool,
        package_manager: PackageManager,
        calls: Arc<Mutex<Vec<InstallOptions>>>,
    }

    #[async_trait]
    impl InstallDelegate for StubInstaller {
        async fn install(&self, options: &InstallOptions) -> InstallResult {
            self.calls.lock().unwrap().push(options.clone());
            InstallResult {
                success: self.success,
                package_manager: self.package_manager,
                diagnostics: InstallDiagnostics::default(),
            }
        }
    }

    struct Fixture {
        templates: tempfile::TempDir,
        work: tempfile::TempDir,
        calls: Arc<Mutex<Vec<InstallOptions>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let templates = tempfile::tempdir().unwrap();
            write_template(templates.path(), "react-ts", "tsx", "ts");
            write_template(templates.path(), "react-js", "jsx", "js");
            Self {
                templates,
                work: tempfile::tempdir().unwrap(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn scaffolder(&self, success: bool) -> Scaffolder {
            let installer = StubInstaller {
                success,
                package_manager: PackageManager::Pnpm,
                calls: Arc::clone(&self.calls),
            };
            Scaffolder::new(
                TemplateLocator::new(vec![self.templates.path().to_path_buf()]),
                Box::new(installer),
                self.work.path(),
            )
        }

        fn target(&self, name: &str) -> PathBuf {
            self.work.path().join(name)
        }
    }

    fn write(path: PathBuf, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn write_template(root: &Path, name: &str, jsx: &str, js: &str) {
        let dir = root.join(name);
        write(
            dir.join("package.json"),
            r#"{"name":"__APP_NAME__","private":true,"scripts":{"dev":"vite"}}"#,
        );
        write(dir.join("README.md"), "# __APP_NAME__\n\nNetwork: __NETWORK__\n");
        write(
            dir.join(".env.example"),
            "VITE_HORIZON_URL=__HORIZON_URL__\nVITE_SOROBAN_RPC_URL=__SOROBAN_RPC_URL__\n",
        );
        write(
            dir.join(format!("src/providers/WalletProvider.{jsx}")),
            "const NETWORK = '__NETWORK__';\n",
        );
        write(
            dir.join(format!("src/lib/stellar-wallets-kit.{js}")),
            "export const WALLETS = __WALLETS__;\n",
        );
        write(dir.join(".git/HEAD"), "ref: refs/heads/main\n");
        write(dir.join("node_modules/vite/index.js"), "");
    }

    fn read(path: PathBuf) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[tokio::test]
    async fn test_typescript_defaults() {
        let fx = Fixture::new();
        let req = ScaffoldRequest::new("demo", LanguageMode::TypeScript);
        let outcome = fx.scaffolder(true).scaffold(&req).await.unwrap();

        let target = fx.target("demo");
        assert_eq!(outcome.target, target);
        assert_eq!(outcome.template.name, "react-ts");
        assert!(outcome.contracts.is_none());

        let manifest: Value = serde_json::from_str(&read(target.join("package.json"))).unwrap();
        assert_eq!(manifest["name"], "demo");
        assert_eq!(
            read(target.join(".env.example")),
            "VITE_HORIZON_URL=https://horizon-testnet.stellar.org\n\
             VITE_SOROBAN_RPC_URL=https://soroban-testnet.stellar.org\n"
        );
        assert_eq!(
            read(target.join("src/providers/WalletProvider.tsx")),
            "const NETWORK = 'TESTNET';\n"
        );
        assert_eq!(
            read(target.join("src/lib/stellar-wallets-kit.ts")),
            "export const WALLETS = [\"freighter\",\"xbull\",\"albedo\"];\n"
        );
        assert!(!target.join(".git").exists());
        assert!(!target.join("node_modules").exists());

        let calls = fx.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].working_dir, target);
        assert!(!calls[0].skip);
    }

    #[tokio::test]
    async fn test_public_horizon_sets_public_network() {
        let fx = Fixture::new();
        let mut req = ScaffoldRequest::new("demo2", LanguageMode::TypeScript);
        req.horizon_url = Some("https://horizon.stellar.org/public".into());
        fx.scaffolder(true).scaffold(&req).await.unwrap();

        let target = fx.target("demo2");
        assert_eq!(
            read(target.join("src/providers/WalletProvider.tsx")),
            "const NETWORK = 'PUBLIC';\n"
        );
        assert!(read(target.join("README.md")).contains("Network: PUBLIC"));
    }

    #[tokio::test]
    async fn test_contracts_without_overlay_still_adds_scripts() {
        let fx = Fixture::new();
        let mut req = ScaffoldRequest::new("demo3", LanguageMode::TypeScript);
        req.with_contracts = true;
        let outcome = fx.scaffolder(true).scaffold(&req).await.unwrap();

        let report = outcome.contracts.unwrap();
        assert_eq!(report.overlay_files, 0);
        assert!(report.scripts_added);

        let target = fx.target("demo3");
        assert!(!target.join("contracts").exists());
        let manifest: Value = serde_json::from_str(&read(target.join("package.json"))).unwrap();
        assert_eq!(manifest["name"], "demo3");
        assert_eq!(manifest["scripts"]["dev"], "vite");
        assert!(manifest["scripts"]["build:contracts"].is_string());
        assert!(manifest["scripts"]["test:contracts"].is_string());
        assert!(read(target.join(".env.example")).ends_with("VITE_CONTRACT_ID=\n"));
    }

    #[tokio::test]
    async fn test_contracts_overlay_applied() {
        let fx = Fixture::new();
        write(
            fx.templates.path().join("contracts/contracts/hello/src/lib.rs"),
            "#![no_std]\n",
        );
        let mut req = ScaffoldRequest::new("withc", LanguageMode::TypeScript);
        req.with_contracts = true;
        fx.scaffolder(true).scaffold(&req).await.unwrap();

        assert!(fx.target("withc").join("contracts/hello/src/lib.rs").is_file());
    }

    #[tokio::test]
    async fn test_skip_install_suppresses_failure() {
        let fx = Fixture::new();
        let mut req = ScaffoldRequest::new("demo4", LanguageMode::TypeScript);
        req.skip_install = true;
        let outcome = fx.scaffolder(false).scaffold(&req).await.unwrap();

        assert!(!outcome.install.success);
        assert!(fx.calls.lock().unwrap()[0].skip);
    }

    #[tokio::test]
    async fn test_install_failure_names_package_manager_and_dir() {
        let fx = Fixture::new();
        let req = ScaffoldRequest::new("broken", LanguageMode::TypeScript);
        let err = fx.scaffolder(false).scaffold(&req).await.unwrap_err();

        match err {
            ScaffoldError::InstallFailed {
                package_manager,
                directory,
            } => {
                assert_eq!(package_manager, PackageManager::Pnpm);
                assert_eq!(directory, fx.target("broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // No rollback: the project stays on disk.
        assert!(fx.target("broken").join("package.json").is_file());
    }

    #[tokio::test]
    async fn test_javascript_uses_js_template() {
        let fx = Fixture::new();
        let req = ScaffoldRequest::new("plain", LanguageMode::JavaScript);
        let outcome = fx.scaffolder(true).scaffold(&req).await.unwrap();

        assert_eq!(outcome.template.name, "react-js");
        assert_eq!(
            read(fx.target("plain").join("src/providers/WalletProvider.jsx")),
            "const NETWORK = 'TESTNET';\n"
        );
    }

    #[tokio::test]
    async fn test_unsupported_template_creates_nothing() {
        let fx = Fixture::new();
        for template in ["nextjs-ts", "custom"] {
            let mut req = ScaffoldRequest::new("nope", LanguageMode::JavaScript);
            req.template = template.to_string();
            let err = fx.scaffolder(true).scaffold(&req).await.unwrap_err();
            assert!(matches!(err, ScaffoldError::UnsupportedTemplate { .. }));
            assert!(!fx.target("nope").exists());
        }
        assert!(fx.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existing_directory_left_unchanged() {
        let fx = Fixture::new();
        let target = fx.target("taken");
        write(target.join("package.json"), "{\"name\":\"__APP_NAME__\"}");
        write(target.join("data.bin"), "\u{0}\u{1}binary");

        let req = ScaffoldRequest::new("taken", LanguageMode::TypeScript);
        let err = fx.scaffolder(true).scaffold(&req).await.unwrap_err();

        assert!(matches!(err, ScaffoldError::DirectoryExists(p) if p == target));
        assert_eq!(read(target.join("package.json")), "{\"name\":\"__APP_NAME__\"}");
        assert_eq!(std::fs::read(target.join("data.bin")).unwrap(), b"\x00\x01binary");
        assert_eq!(std::fs::read_dir(&target).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_name_rejected_before_disk() {
        let fx = Fixture::new();
        for name in ["../escape", "my\"app", "MyApp"] {
            let req = ScaffoldRequest::new(name, LanguageMode::TypeScript);
            let err = fx.scaffolder(true).scaffold(&req).await.unwrap_err();
            assert!(matches!(err, ScaffoldError::InvalidAppName { .. }), "{name:?}");
        }
        assert_eq!(std::fs::read_dir(fx.work.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_counts_as_existing() {
        let fx = Fixture::new();
        let target = fx.target("linked");
        std::os::unix::fs::symlink(fx.work.path().join("missing"), &target).unwrap();

        let req = ScaffoldRequest::new("linked", LanguageMode::TypeScript);
        let err = fx.scaffolder(true).scaffold(&req).await.unwrap_err();

        assert!(matches!(err, ScaffoldError::DirectoryExists(p) if p == target));
        assert!(!fx.work.path().join("missing").exists());
        assert!(fx.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_materialized_event_emitted_once() {
        let fx = Fixture::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let scaffolder = fx.scaffolder(true).with_observer(move |event| {
            if let ScaffoldEvent::Materialized { app_name, .. } = event {
                sink.lock().unwrap().push(app_name.clone());
            }
        });

        let req = ScaffoldRequest::new("events", LanguageMode::TypeScript);
        scaffolder.scaffold(&req).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["events".to_string()]);
    }
}
