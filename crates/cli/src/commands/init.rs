//! solve-provision init command

use anyhow::{bail, Context};
use clap::Args;
use shared::NetworkManifest;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Manifest to create (.yaml, .yml or .json)
    #[arg(default_value = "network.yaml")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub fn run(&self) -> anyhow::Result<()> {
        if self.path.exists() && !self.force {
            bail!("{} already exists (use --force to overwrite)", self.path.display());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = render(&NetworkManifest::example(), &self.path)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        println!("✓ Example manifest written to {}", self.path.display());
        Ok(())
    }
}

fn render(manifest: &NetworkManifest, path: &Path) -> anyhow::Result<String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::to_string_pretty(manifest)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::to_string(manifest)?),
        _ => bail!("{}: manifest must end in .json, .yaml or .yml", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_manifest() {
        let dir = TempDir::new().unwrap();

        for name in ["network.yaml", "network.json"] {
            let path = dir.path().join(name);
            InitCommand { path: path.clone(), force: false }.run().unwrap();

            let loaded = NetworkManifest::from_file(&path).unwrap();
            assert_eq!(loaded, NetworkManifest::example());
        }
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("network.yaml");
        std::fs::write(&path, "network: mainnet\n").unwrap();

        assert!(InitCommand { path: path.clone(), force: false }.run().is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "network: mainnet\n");

        InitCommand { path: path.clone(), force: true }.run().unwrap();
        assert_eq!(NetworkManifest::from_file(&path).unwrap().network, "devnet");
    }

    #[test]
    fn test_init_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("network.toml");

        assert!(InitCommand { path: path.clone(), force: false }.run().is_err());
        assert!(!path.exists());
    }
}
