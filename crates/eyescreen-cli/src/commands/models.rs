//! Models command - inspect model artifacts.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use eyescreen_adapters::models::{ModelCatalog, ModelStatus};

use crate::config::AppConfig;

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR", global = true)]
    pub models_dir: Option<PathBuf>,
}

/// Models subcommands
#[derive(Subcommand)]
pub enum ModelsCommand {
    /// List expected models with install status and SHA-256
    List,
    /// Print model directory path
    Path,
}

/// Run the models command.
#[allow(clippy::unnecessary_wraps)]
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<()> {
    let dir = args
        .models_dir
        .clone()
        .or_else(|| config.models.dir.clone());
    let catalog = dir
        .map_or_else(ModelCatalog::default, ModelCatalog::new)
        .with_overrides(config.models.detection.clone(), config.models.condition.clone());

    match args.command {
        ModelsCommand::List => print!("{}", render_list(&catalog)),
        ModelsCommand::Path => println!("{}", catalog.dir().display()),
    }
    Ok(())
}

fn render_list(catalog: &ModelCatalog) -> String {
    let models = catalog.list();
    let mut out = format!("Models directory: {}\n\n", catalog.dir().display());

    for model in &models {
        out.push_str(&render_status(model));
    }

    let installed_count = models.iter().filter(|m| m.installed()).count();
    out.push_str(&format!(
        "\n{}/{} models installed\n",
        installed_count,
        models.len()
    ));
    if !catalog.all_installed() {
        out.push_str(&format!(
            "Copy the missing weights into {} or pass --models-dir\n",
            catalog.dir().display()
        ));
    }
    out
}

fn render_status(model: &ModelStatus) -> String {
    let status = if model.installed() { "✓" } else { "✗" };
    let mut line = format!("  {status} {} ({})\n", model.name, model.path.display());
    if let (Some(size), Some(digest)) = (model.size, &model.sha256) {
        line.push_str(&format!("      {size} bytes  sha256:{digest}\n"));
    }
    line
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_list_mixed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eye_condition.safetensors"), b"").unwrap();

        let text = render_list(&ModelCatalog::new(dir.path().to_path_buf()));

        assert!(text.contains("✗ detection"));
        assert!(text.contains("✓ condition"));
        // SHA-256 of the empty file
        assert!(text.contains(
            "0 bytes  sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        ));
        assert!(text.contains("1/2 models installed"));
        assert!(text.contains("Copy the missing weights into"));
    }

    #[test]
    fn test_render_list_complete_has_no_hint() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eye_detect.safetensors"), b"d").unwrap();
        std::fs::write(dir.path().join("eye_condition.safetensors"), b"c").unwrap();

        let text = render_list(&ModelCatalog::new(dir.path().to_path_buf()));

        assert!(text.contains("2/2 models installed"));
        assert!(!text.contains("Copy the missing weights"));
    }
}
