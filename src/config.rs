// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::process::{calendar::Season, normalize::NormalizeOptions};
use crate::synthetic::SyntheticConfig;

pub const CONFIG_ENV: &str = "TRIPDASH_CONFIG";

/// Run configuration, usually from `tripdash.yaml`. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Trip-level or pre-aggregated export. Relative names are looked up in
    /// `search_dirs`; when nothing is found, synthetic trips are used.
    pub trips_path: String,
    /// Daily weather export. When unset, the trips file's own temperature
    /// column is used if it has one.
    pub weather_path: Option<String>,
    pub output_dir: PathBuf,
    /// Where relative input names are searched, in order. Empty means the
    /// working directory then `~/Downloads`.
    pub search_dirs: Vec<PathBuf>,
    pub normalize: NormalizeOptions,
    pub top_stations: usize,
    /// Season filter for station rankings and totals. Empty keeps all.
    pub seasons: Vec<Season>,
    pub synthetic: SyntheticConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            trips_path: "citibike_trip_sample.csv".to_string(),
            weather_path: None,
            output_dir: PathBuf::from("out"),
            search_dirs: Vec::new(),
            normalize: NormalizeOptions::default(),
            top_stations: 20,
            seasons: Vec::new(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config: {:?}", path.as_ref()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path.as_ref()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let cfg: DashboardConfig = serde_yaml::from_str(content)?;
        Ok(cfg)
    }

    /// Config from an explicit path, else `$TRIPDASH_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        match explicit
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_ENV).ok())
        {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn effective_search_dirs(&self) -> Vec<PathBuf> {
        if !self.search_dirs.is_empty() {
            return self.search_dirs.clone();
        }
        let mut dirs = vec![PathBuf::from(".")];
        if let Some(home) = dirs::home_dir() {
            dirs.push(home.join("Downloads"));
        }
        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::normalize::NegativeDurationPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_yaml_gives_defaults() -> Result<()> {
        let cfg = DashboardConfig::from_yaml("{}")?;
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.top_stations, 20);
        assert_eq!(cfg.normalize.negative_duration, NegativeDurationPolicy::PassThrough);
        Ok(())
    }

    #[test]
    fn partial_yaml_overrides() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(
            tmp,
            r#"
trips_path: trips_2022.csv
weather_path: weather_2022.csv
output_dir: /tmp/dash
seasons: [Summer, Fall]
normalize:
  negative_duration: clamp
  drop_undated_rows: true
synthetic:
  rows: 10
  start: "2022-06-01T00:00:00"
"#
        )?;
        let cfg = DashboardConfig::load(tmp.path())?;
        assert_eq!(cfg.trips_path, "trips_2022.csv");
        assert_eq!(cfg.weather_path.as_deref(), Some("weather_2022.csv"));
        assert_eq!(cfg.seasons, vec![Season::Summer, Season::Fall]);
        assert_eq!(cfg.normalize.negative_duration, NegativeDurationPolicy::Clamp);
        assert!(cfg.normalize.drop_undated_rows);
        assert_eq!(cfg.synthetic.rows, 10);
        assert_eq!(cfg.synthetic.seed, 42);
        assert_eq!(cfg.synthetic.start.to_string(), "2022-06-01 00:00:00");
        Ok(())
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = DashboardConfig::from_yaml("normalize:\n  negative_duration: ignore\n");
        assert!(err.is_err());
    }

    #[test]
    fn explicit_search_dirs_win() {
        let cfg = DashboardConfig {
            search_dirs: vec![PathBuf::from("/data")],
            ..Default::default()
        };
        assert_eq!(cfg.effective_search_dirs(), vec![PathBuf::from("/data")]);
        assert_eq!(
            DashboardConfig::default().effective_search_dirs()[0],
            PathBuf::from(".")
        );
    }
}
