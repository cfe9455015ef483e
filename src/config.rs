//! Run configuration: where the input lives, where outputs go, and the
//! window/segmentation constants the report is built around.

use std::path::PathBuf;

pub const OVERALL_KPI_FILE: &str = "kpi_overall_30_days.csv";
pub const COUNTRY_KPI_FILE: &str = "kpi_by_country_30_days.csv";
pub const TIER_KPI_FILE: &str = "kpi_by_tier_30_days.csv";
pub const AT_RISK_FILE: &str = "at_risk_customers.csv";
pub const SUMMARY_FILE: &str = "report_summary.json";
pub const CHARTS_DIR: &str = "charts";
pub const INACTIVITY_CHART_FILE: &str = "at_risk_days_since_purchase.png";
pub const ABANDON_CHART_FILE: &str = "abandon_rate_by_tier.png";

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Customer snapshot CSV.
    pub input_path: PathBuf,
    /// Root directory for every exported file; `charts/` lives beneath it.
    pub output_dir: PathBuf,
    /// Length of the trailing window, in days, ending at the latest purchase.
    pub window_days: i64,
    /// A customer inactive for at least this many days is at risk.
    pub inactivity_days: i64,
    /// A customer abandoning at least this share of carts is at risk.
    pub abandon_rate_threshold: f64,
    pub histogram_bins: usize,
    /// Rows shown in console table previews.
    pub preview_rows: usize,
    pub render_charts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            input_path: PathBuf::from("data/Customer_Transactions.csv"),
            output_dir: PathBuf::from("output"),
            window_days: 30,
            inactivity_days: 30,
            abandon_rate_threshold: 0.9,
            histogram_bins: 15,
            preview_rows: 5,
            render_charts: true,
        }
    }
}

impl ReportConfig {
    /// Same defaults, rooted at different input/output locations.
    pub fn with_paths(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        ReportConfig {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            ..ReportConfig::default()
        }
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join(CHARTS_DIR)
    }

    pub fn output_file(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn chart_file(&self, name: &str) -> PathBuf {
        self.charts_dir().join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_report_conventions() {
        let cfg = ReportConfig::default();
        assert_eq!(cfg.input_path, PathBuf::from("data/Customer_Transactions.csv"));
        assert_eq!(cfg.window_days, 30);
        assert_eq!(cfg.inactivity_days, 30);
        assert_eq!(cfg.abandon_rate_threshold, 0.9);
        assert_eq!(cfg.histogram_bins, 15);
        assert_eq!(
            cfg.chart_file(ABANDON_CHART_FILE),
            PathBuf::from("output/charts/abandon_rate_by_tier.png")
        );
    }

    #[test]
    fn with_paths_keeps_constants() {
        let cfg = ReportConfig::with_paths("in.csv", "/tmp/out");
        assert_eq!(cfg.output_file(AT_RISK_FILE), PathBuf::from("/tmp/out/at_risk_customers.csv"));
        assert_eq!(cfg.histogram_bins, 15);
        assert!(cfg.render_charts);
    }
}
