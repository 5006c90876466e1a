use anyhow::{Context, Result};
use paybill_ingest::ExtractConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_paybill_home;

pub const FILTERED_FILE: &str = "Filtered_Data.csv";
pub const AGGREGATED_FILE: &str = "Aggregated_Data.csv";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Where CSV exports land unless `--out` is given
    pub output_dir: PathBuf,
    /// Rows shown in the terminal preview
    pub preview_rows: usize,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            preview_rows: 20,
        }
    }
}

impl ExportSection {
    pub fn output_path(&self, out: Option<PathBuf>, default_name: &str) -> PathBuf {
        out.unwrap_or_else(|| self.output_dir.join(default_name))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_paybill_home()?.join("config.toml"))
}

/// Load `path`, or the defaults when it does not exist.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config_from(p),
        None => load_config_from(&config_path()?),
    }
}

pub fn save_config(cfg: &Config, path: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.extract.paybill_code, "62412");
        assert_eq!(cfg.export.preview_rows, 20);
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.extract.excluded_keywords.push("ledger fee".into());
        cfg.extract.layout.max_row_gap = 80.0;
        cfg.export.output_dir = PathBuf::from("reports");
        save_config(&cfg, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[extract]\npaybill_code = \"11111\"\n\n[extract.layout]\ncell_gap = 9.0\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.extract.paybill_code, "11111");
        assert_eq!(cfg.extract.excluded_keywords.len(), 3);
        assert_eq!(cfg.extract.layout.cell_gap, 9.0);
        assert_eq!(cfg.extract.layout.min_header_columns, 3);
        assert_eq!(cfg.extract.layout.wrap_columns, vec!["Narration".to_string()]);
        assert_eq!(cfg.export.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[export]\npreview_rows = 5\n").unwrap();

        init_config(Some(&path)).unwrap();
        assert_eq!(load_config_from(&path).unwrap().export.preview_rows, 5);
    }

    #[test]
    fn test_output_path() {
        let export = ExportSection::default();
        assert_eq!(
            export.output_path(None, FILTERED_FILE),
            PathBuf::from("./Filtered_Data.csv")
        );
        assert_eq!(
            export.output_path(Some(PathBuf::from("x.csv")), FILTERED_FILE),
            PathBuf::from("x.csv")
        );
    }
}
