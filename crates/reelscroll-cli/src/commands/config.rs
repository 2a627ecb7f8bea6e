use std::path::Path;

use anyhow::{bail, Result};
use tracing::info;

use reelscroll_core::AppConfig;

/// Print the effective configuration as TOML
pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub fn path(config_path: &Path) -> Result<()> {
    println!("{}", config_path.display());
    Ok(())
}

/// Write the default configuration to `config_path`
pub fn init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    AppConfig::default().save_to(config_path)?;
    info!("Wrote default configuration to {}", config_path.display());
    println!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("reelscroll-cli-init-{}", std::process::id()));
        let path = dir.join("config.toml");

        init(&path, false).unwrap();
        assert!(path.exists());
        assert!(init(&path, false).is_err());
        assert!(init(&path, true).is_ok());

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.ui.animation_fps, 60);
        std::fs::remove_dir_all(&dir).ok();
    }
}
