use crate::models::extent::BlockSize;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Block unit in bytes for every block number fragmap shows.
    pub block_size: u64,
    /// Rows returned by the "most fragmented" / "largest" lists.
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// fdatasync each file before mapping so delayed allocations are placed.
    pub sync_before_map: bool,
    /// Stay on the device of the scan root.
    pub one_file_system: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Blocks per map cell at startup.
    pub initial_scale: u64,
    /// Color theme: default, dracula, gruvbox, nord
    pub theme: String,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { block_size: BlockSize::DEFAULT.bytes(), top_k: 20 }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { sync_before_map: false, one_file_system: true }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { initial_scale: 1024, theme: "default".into() }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match try_load() {
            Ok(c)  => c,
            Err(e) => {
                tracing::debug!(error = %e, "using default config");
                // Write defaults on first run (best-effort)
                let _ = try_write_defaults();
                Config::default()
            }
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fragmap").join("fragmap.toml"))
    }

    /// Configured block unit; a zero in the file falls back to 4096.
    pub fn block_size(&self) -> BlockSize {
        BlockSize::new(self.general.block_size).unwrap_or_default()
    }
}

fn try_load() -> Result<Config> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    let text = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&text)?;
    Ok(cfg)
}

fn try_write_defaults() -> Result<()> {
    let path = Config::config_path().ok_or_else(|| anyhow::anyhow!("no config dir"))?;
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(&Config::default())?;
    fs::write(path, format!("# fragmap configuration\n# Generated on first run, edit freely\n\n{}", text))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg: Config = toml::from_str("[general]\nblock_size = 512\n").unwrap();
        assert_eq!(cfg.block_size().bytes(), 512);
        assert_eq!(cfg.general.top_k, 20);
        assert!(cfg.scan.one_file_system);
        assert_eq!(cfg.view.initial_scale, 1024);
    }

    #[test]
    fn zero_block_size_falls_back() {
        let cfg: Config = toml::from_str("[general]\nblock_size = 0\n").unwrap();
        assert_eq!(cfg.block_size(), BlockSize::DEFAULT);
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.general.block_size, 4096);
        assert_eq!(back.view.theme, "default");
    }
}
