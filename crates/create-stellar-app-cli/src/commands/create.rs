use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use console::Term;
use dialoguer::{Input, Select};
use indicatif::ProgressBar;

use create_stellar_app_core::install::{PackageManager, PackageManagerInstaller};
use create_stellar_app_core::locator::TemplateLocator;
use create_stellar_app_core::request::{LanguageMode, ScaffoldRequest};
use create_stellar_app_core::scaffold::{ScaffoldEvent, Scaffolder};

use crate::output;

/// Language chosen on the command line.
#[derive(Debug, Clone, Copy)]
pub enum Language {
    TypeScript,
    JavaScript,
}

/// Everything the `create` flow takes from the command line.
pub struct CreateArgs {
    pub name: Option<String>,
    pub language: Option<Language>,
    pub template: String,
    pub with_contracts: bool,
    pub horizon_url: Option<String>,
    pub soroban_rpc_url: Option<String>,
    pub wallets: Vec<String>,
    pub skip_install: bool,
    pub package_manager: Option<PackageManager>,
    pub install_timeout: Option<u64>,
    pub templates_dir: Option<PathBuf>,
}

/// Scaffold a new project into the current directory.
///
/// Prompts for the project name and language when they were not given and a
/// terminal is attached, then runs the scaffold pipeline and prints next steps.
pub async fn run(args: CreateArgs) -> Result<()> {
    let interactive = Term::stdout().is_term();

    let name = match args.name {
        Some(name) => name,
        None if interactive => Input::<String>::new()
            .with_prompt("Project name")
            .default("my-stellar-app".into())
            .interact_text()?,
        None => anyhow::bail!("missing project name (usage: create-stellar-app <name>)"),
    };

    let language = match args.language {
        Some(Language::TypeScript) => LanguageMode::TypeScript,
        Some(Language::JavaScript) => LanguageMode::JavaScript,
        None if interactive => {
            let selection = Select::new()
                .with_prompt("Select language")
                .items(&["TypeScript", "JavaScript"])
                .default(0)
                .interact()?;
            if selection == 0 {
                LanguageMode::TypeScript
            } else {
                LanguageMode::JavaScript
            }
        }
        None => LanguageMode::TypeScript,
    };

    output::print_header(&format!("create-stellar-app: {name}"));

    let mut request = ScaffoldRequest::new(name.clone(), language);
    request.template = args.template;
    request.with_contracts = args.with_contracts;
    request.horizon_url = args.horizon_url;
    request.soroban_rpc_url = args.soroban_rpc_url;
    request.wallets = clean_wallets(args.wallets);
    request.skip_install = args.skip_install;
    request.package_manager = args.package_manager;
    request.install_timeout = args.install_timeout.map(Duration::from_secs);

    tracing::debug!("scaffold request: {request:?}");

    output::print_key_value("Template", &request.template);
    output::print_key_value("Network", request.network().label());
    output::print_key_value("Horizon", request.horizon_url());
    output::print_key_value("Soroban RPC", request.soroban_rpc_url());

    let locator = TemplateLocator::from_current_exe(args.templates_dir)?;
    tracing::debug!("template roots: {:?}", locator.candidates());
    let working_dir = std::env::current_dir()?;
    let spinner: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
    let progress = Arc::clone(&spinner);

    let scaffolder = Scaffolder::new(locator, Box::new(PackageManagerInstaller::new()), working_dir)
        .with_observer(move |event| match event {
            ScaffoldEvent::Materialized { app_name, .. } => {
                output::print_success(&format!("Created {app_name}"));
            }
            ScaffoldEvent::InstallStarted { skip: false, .. } => {
                if let Ok(mut slot) = progress.lock() {
                    *slot = Some(output::spinner("Installing dependencies..."));
                }
            }
            ScaffoldEvent::InstallFinished(_) => {
                if let Ok(mut slot) = progress.lock() {
                    if let Some(bar) = slot.take() {
                        bar.finish_and_clear();
                    }
                }
            }
            _ => {}
        });

    let outcome = scaffolder.scaffold(&request).await?;

    if let Some(report) = &outcome.contracts {
        if report.overlay_files == 0 {
            output::print_warning("No contracts template found; only scripts were added");
        }
    }

    let pm = outcome.install.package_manager;
    println!();
    println!("  Next steps:");
    println!("    cd {name}");
    if outcome.install.diagnostics.skipped {
        println!("    {pm} install");
    }
    println!("    {pm} run dev");
    if request.with_contracts {
        println!("    {pm} run build:contracts");
    }
    println!();

    Ok(())
}

/// Trim wallet ids and drop empty entries, so `--wallets ""` means defaults.
fn clean_wallets(wallets: Vec<String>) -> Vec<String> {
    wallets
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .collect()
}
