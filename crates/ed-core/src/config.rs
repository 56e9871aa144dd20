//! Dashboard configuration

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::descriptor::ChartKind;
use crate::embed::EmbedOptions;
use crate::mount::MountId;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Language of titles and widget labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Hu,
    En,
}

impl Default for Locale {
    fn default() -> Self {
        Locale::Hu
    }
}

/// Mount point of every chart on the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountPoints {
    pub line: MountId,
    pub scatter: MountId,
    pub heatmap: MountId,
    pub bars: MountId,
}

impl Default for MountPoints {
    fn default() -> Self {
        Self {
            line: MountId::new("chartRenewablesLine"),
            scatter: MountId::new("chartScatter"),
            heatmap: MountId::new("chartHeatmap"),
            bars: MountId::new("chartDeltaBars"),
        }
    }
}

impl MountPoints {
    pub fn get(&self, kind: ChartKind) -> &MountId {
        match kind {
            ChartKind::TimeSeriesLine => &self.line,
            ChartKind::YearScatter => &self.scatter,
            ChartKind::PriceHeatmap => &self.heatmap,
            ChartKind::DeltaBars => &self.bars,
        }
    }

    /// Mount points in dashboard order
    pub fn in_order(&self) -> Vec<MountId> {
        ChartKind::ALL.into_iter().map(|kind| self.get(kind).clone()).collect()
    }

    /// Kind whose chart mounts at `id`
    pub fn kind_of(&self, id: &MountId) -> Option<ChartKind> {
        ChartKind::ALL.into_iter().find(|kind| self.get(*kind) == id)
    }
}

/// Everything the dashboard needs to build and render its charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Location of the CSV every chart reads, relative to the host page
    pub data_url: String,

    /// Options of the country selector
    pub countries: Vec<String>,

    pub default_country: String,

    pub default_year: i64,

    /// First and last year of the scatter chart's slider
    pub year_range: (i64, i64),

    /// Years the delta chart compares; independent of `year_range`
    pub delta_years: (i64, i64),

    pub locale: Locale,

    pub embed_options: EmbedOptions,

    pub mounts: MountPoints,

    /// Directory rendered output is written to
    pub output_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_url: "data.csv".to_string(),
            countries: ["Romania", "Hungary", "Germany", "France", "Sweden"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            default_country: "Romania".to_string(),
            default_year: 2024,
            year_range: (2010, 2024),
            delta_years: (2010, 2024),
            locale: Locale::default(),
            embed_options: EmbedOptions::default(),
            mounts: MountPoints::default(),
            output_dir: PathBuf::from("dist"),
        }
    }
}

impl DashboardConfig {
    /// Load a JSON config file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!("Loaded dashboard config from {}", path.display());
        Ok(config)
    }

    /// Check the values are consistent with each other
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countries.is_empty() {
            return Err(ConfigError::Invalid("country list is empty".into()));
        }
        if !self.countries.contains(&self.default_country) {
            return Err(ConfigError::Invalid(format!(
                "default country {} is not among the selectable countries",
                self.default_country
            )));
        }

        let (first, last) = self.year_range;
        if first >= last {
            return Err(ConfigError::Invalid(format!(
                "year range {}..{} is empty",
                first, last
            )));
        }
        if self.default_year < first || self.default_year > last {
            return Err(ConfigError::Invalid(format!(
                "default year {} is outside {}..{}",
                self.default_year, first, last
            )));
        }

        let (from, to) = self.delta_years;
        if from == to {
            return Err(ConfigError::Invalid(format!(
                "delta chart compares {} with itself",
                from
            )));
        }

        let mut seen = HashSet::new();
        for kind in ChartKind::ALL {
            let mount = self.mounts.get(kind);
            if !seen.insert(mount.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "mount point {} is used by more than one chart",
                    mount
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.countries.len(), 5);
        assert_eq!(config.mounts.kind_of(&MountId::new("chartScatter")), Some(ChartKind::YearScatter));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "data_url": "energy.csv", "locale": "en" }"#).unwrap();
        assert_eq!(config.data_url, "energy.csv");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.default_country, "Romania");
    }

    #[test]
    fn test_mounts_accept_selector_form() {
        let config: DashboardConfig =
            serde_json::from_str(r##"{ "mounts": { "line": "#chartRenewablesLine" } }"##).unwrap();
        assert_eq!(config.mounts.line, MountId::new("chartRenewablesLine"));
        assert_eq!(config.mounts.line.selector(), "#chartRenewablesLine");
        assert_eq!(config.mounts.in_order(), MountPoints::default().in_order());
    }

    #[test]
    fn test_narrow_slider_keeps_delta_years() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{ "year_range": [2015, 2024], "default_year": 2020 }"#).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.delta_years, (2010, 2024));

        let same_year = DashboardConfig {
            delta_years: (2024, 2024),
            ..Default::default()
        };
        assert!(same_year.validate().is_err());
    }

    #[test]
    fn test_duplicate_mounts_rejected() {
        let mut config = DashboardConfig::default();
        config.mounts.bars = config.mounts.heatmap.clone();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_default_country_must_be_selectable() {
        let config = DashboardConfig {
            default_country: "Austria".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
