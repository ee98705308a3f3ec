use anyhow::{Context, Result};
use helpdesk_core::config::DeskConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Uses the explicit path if given, otherwise the per-user default.
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => DeskConfig::default_path().context("Failed to resolve config path"),
    }
}

pub fn load(path: &Path) -> Result<DeskConfig> {
    DeskConfig::load_or_default(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

pub fn show(path: &Path) -> Result<()> {
    let config = load(path)?;
    let rendered = config
        .to_toml_string()
        .context("Failed to render config as TOML")?;

    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, showing defaults)", path.display());
    }
    print!("{}", rendered);
    Ok(())
}

pub fn path(path: &Path) {
    println!("{}", path.display());
}

pub fn init(path: &Path) -> Result<()> {
    if path.exists() {
        println!("⚠️  Config already exists: {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let rendered = DeskConfig::default().to_toml_string()?;
    fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Wrote default config to {}", path.display());
    Ok(())
}
