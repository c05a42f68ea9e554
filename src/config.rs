use std::env;
use std::path::PathBuf;

use crate::aggregate::DEFAULT_TOP_TOURNAMENTS;
use crate::dataset::DEFAULT_DATASET_PATH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Run-wide display options. Built once at startup and handed to the
/// reporter; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub dataset_path: PathBuf,
    pub preview_rows: usize,
    pub top_tournaments: usize,
    pub display_width: usize,
    pub max_columns: usize,
    pub charts: bool,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            preview_rows: 5,
            top_tournaments: DEFAULT_TOP_TOURNAMENTS,
            display_width: 120,
            max_columns: 50,
            charts: true,
            format: ReportFormat::Text,
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str| {
            lookup(key)
                .as_deref()
                .map(str::trim)
                .and_then(|val| val.parse::<usize>().ok())
        };

        let dataset_path = lookup("WTA_DATASET_PATH")
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.dataset_path);
        let charts = lookup("WTA_CHARTS")
            .map(|val| parse_switch(&val))
            .unwrap_or(defaults.charts);
        let format = match lookup("WTA_REPORT_FORMAT") {
            Some(val) if val.trim().eq_ignore_ascii_case("json") => ReportFormat::Json,
            _ => defaults.format,
        };
        let charts = charts && format == ReportFormat::Text;

        Self {
            dataset_path,
            preview_rows: number("WTA_PREVIEW_ROWS")
                .unwrap_or(defaults.preview_rows)
                .min(50),
            top_tournaments: number("WTA_TOP_TOURNAMENTS")
                .unwrap_or(defaults.top_tournaments)
                .clamp(1, 100),
            display_width: number("WTA_DISPLAY_WIDTH")
                .unwrap_or(defaults.display_width)
                .max(40),
            max_columns: number("WTA_MAX_COLUMNS")
                .unwrap_or(defaults.max_columns)
                .max(1),
            charts,
            format,
        }
    }

    /// Applies command-line overrides: the first non-flag argument is the
    /// dataset path, `--no-charts` and `--json` toggle output. `--json`
    /// also turns the chart viewer off.
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        let mut path_set = false;
        for arg in args {
            match arg.as_str() {
                "--no-charts" => self.charts = false,
                "--json" => {
                    self.format = ReportFormat::Json;
                    self.charts = false;
                }
                other if !other.starts_with("--") && !path_set => {
                    let trimmed = other.trim();
                    if !trimmed.is_empty() {
                        self.dataset_path = PathBuf::from(trimmed);
                        path_set = true;
                    }
                }
                _ => {}
            }
        }
        self
    }
}

fn parse_switch(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = ReportConfig::from_lookup(|_| None);
        assert_eq!(cfg, ReportConfig::default());
        assert_eq!(cfg.top_tournaments, 10);
        assert_eq!(cfg.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
    }

    #[test]
    fn env_values_are_parsed_and_clamped() {
        let cfg = ReportConfig::from_lookup(lookup_from(&[
            ("WTA_DATASET_PATH", " data/points.xlsx "),
            ("WTA_PREVIEW_ROWS", "500"),
            ("WTA_TOP_TOURNAMENTS", "0"),
            ("WTA_DISPLAY_WIDTH", "10"),
            ("WTA_MAX_COLUMNS", "abc"),
            ("WTA_CHARTS", "off"),
            ("WTA_REPORT_FORMAT", "JSON"),
        ]));
        assert_eq!(cfg.dataset_path, PathBuf::from("data/points.xlsx"));
        assert_eq!(cfg.preview_rows, 50);
        assert_eq!(cfg.top_tournaments, 1);
        assert_eq!(cfg.display_width, 40);
        assert_eq!(cfg.max_columns, 50);
        assert!(!cfg.charts);
        assert_eq!(cfg.format, ReportFormat::Json);
    }

    #[test]
    fn args_override_path_and_switches() {
        let cfg = ReportConfig::default().with_args(
            ["--no-charts", "season.xlsx", "other.xlsx", "--json"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(cfg.dataset_path, PathBuf::from("season.xlsx"));
        assert!(!cfg.charts);
        assert_eq!(cfg.format, ReportFormat::Json);
    }

    #[test]
    fn json_output_turns_charts_off() {
        let cfg = ReportConfig::default()
            .with_args(["season.xlsx", "--json"].into_iter().map(String::from));
        assert_eq!(cfg.format, ReportFormat::Json);
        assert!(!cfg.charts);

        let cfg = ReportConfig::from_lookup(lookup_from(&[("WTA_REPORT_FORMAT", "json")]));
        assert_eq!(cfg.format, ReportFormat::Json);
        assert!(!cfg.charts);

        let cfg = ReportConfig::from_lookup(lookup_from(&[("WTA_REPORT_FORMAT", "text")]));
        assert!(cfg.charts);
    }
}
