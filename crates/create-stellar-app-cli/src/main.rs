//! create-stellar-app CLI: bootstrap a Stellar/Soroban dApp from a template.
//!
//! Copies the chosen template into `./<name>`, optionally adds the Soroban
//! contracts tooling, fills in network and wallet settings, and installs
//! dependencies. The pipeline itself lives in
//! [`create_stellar_app_core::scaffold::Scaffolder`].

mod commands;
mod output;

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

use create_stellar_app_core::install::PackageManager;
use create_stellar_app_core::locator::TEMPLATES_DIR_ENV;
use create_stellar_app_core::request::DEFAULT_TEMPLATE;

#[derive(Parser)]
#[command(
    name = "create-stellar-app",
    about = "Bootstrap a Stellar dApp: React template, wallet kit, optional Soroban contracts",
    version,
    group(ArgGroup::new("language").args(["typescript", "javascript"]))
)]
struct Cli {
    /// Project name (creates a directory with this name)
    name: Option<String>,

    /// Generate a TypeScript project
    #[arg(long)]
    typescript: bool,

    /// Generate a JavaScript project (only the default template is available)
    #[arg(long)]
    javascript: bool,

    /// Template to scaffold from
    #[arg(long, default_value = DEFAULT_TEMPLATE)]
    template: String,

    /// Add Soroban smart contract tooling
    #[arg(long)]
    with_contracts: bool,

    /// Horizon server URL (default: testnet)
    #[arg(long, env = "STELLAR_HORIZON_URL")]
    horizon_url: Option<String>,

    /// Soroban RPC URL (default: testnet)
    #[arg(long, env = "STELLAR_SOROBAN_RPC_URL")]
    soroban_rpc_url: Option<String>,

    /// Wallets to enable, comma separated (default: freighter,xbull,albedo)
    #[arg(long, value_delimiter = ',')]
    wallets: Vec<String>,

    /// Do not install dependencies
    #[arg(long)]
    skip_install: bool,

    /// Package manager used to install dependencies (default: detected)
    #[arg(long, value_enum)]
    package_manager: Option<PackageManagerChoice>,

    /// Abort dependency installation after this many seconds
    #[arg(long, value_name = "SECS")]
    install_timeout: Option<u64>,

    /// Directory searched first for templates
    #[arg(long, env = TEMPLATES_DIR_ENV)]
    templates_dir: Option<PathBuf>,

    /// List available templates and exit
    #[arg(long)]
    list_templates: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PackageManagerChoice {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl From<PackageManagerChoice> for PackageManager {
    fn from(choice: PackageManagerChoice) -> Self {
        match choice {
            PackageManagerChoice::Npm => Self::Npm,
            PackageManagerChoice::Yarn => Self::Yarn,
            PackageManagerChoice::Pnpm => Self::Pnpm,
            PackageManagerChoice::Bun => Self::Bun,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.list_templates {
        return commands::templates::run(cli.templates_dir);
    }

    let language = match (cli.typescript, cli.javascript) {
        (true, _) => Some(commands::create::Language::TypeScript),
        (_, true) => Some(commands::create::Language::JavaScript),
        _ => None,
    };

    commands::create::run(commands::create::CreateArgs {
        name: cli.name,
        language,
        template: cli.template,
        with_contracts: cli.with_contracts,
        horizon_url: cli.horizon_url,
        soroban_rpc_url: cli.soroban_rpc_url,
        wallets: cli.wallets,
        skip_install: cli.skip_install,
        package_manager: cli.package_manager.map(PackageManager::from),
        install_timeout: cli.install_timeout,
        templates_dir: cli.templates_dir,
    })
    .await
}
