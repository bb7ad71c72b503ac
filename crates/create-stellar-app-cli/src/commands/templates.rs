use std::path::PathBuf;

use anyhow::Result;

use create_stellar_app_core::locator::TemplateLocator;

use crate::output;

/// List the templates found in the first existing template root.
pub fn run(templates_dir: Option<PathBuf>) -> Result<()> {
    output::print_header("create-stellar-app templates");

    let locator = TemplateLocator::from_current_exe(templates_dir)?;
    tracing::debug!("template roots: {:?}", locator.candidates());
    let names = locator.list_templates()?;
    if names.is_empty() {
        output::print_warning("No templates found. Searched:");
        for candidate in locator.candidates() {
            output::print_key_value("root", &candidate.display().to_string());
        }
        return Ok(());
    }

    for name in names {
        println!("  {name}");
    }
    Ok(())
}
