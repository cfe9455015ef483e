// The report run, start to finish: load, window, segment, aggregate,
// export, chart, summarize. Progress goes to stdout as the operator log.
use crate::charts;
use crate::config::{
    ReportConfig, ABANDON_CHART_FILE, AT_RISK_FILE, COUNTRY_KPI_FILE, INACTIVITY_CHART_FILE,
    OVERALL_KPI_FILE, SUMMARY_FILE, TIER_KPI_FILE,
};
use crate::error::{ReportError, Result};
use crate::loader;
use crate::output;
use crate::reports;
use crate::segment::{self, AtRiskRule};
use crate::types::SummaryStats;
use crate::util::{format_int, format_pct};
use crate::window::{self, ReportWindow};
use log::debug;

const RULE: &str = "============================================================";

pub fn run(config: &ReportConfig) -> Result<SummaryStats> {
    println!("\n[1/6] Loading data...");
    let (records, load_report) = loader::load_transactions(&config.input_path)?;
    println!("✓ Loaded {} records", format_int(load_report.total_rows));
    debug!("{} distinct countries in input", load_report.countries);

    println!("\n[2/6] Defining {}-day reporting window...", config.window_days);
    let report_window = ReportWindow::from_records(&records, config.window_days).ok_or_else(|| {
        ReportError::EmptyDataset {
            path: config.input_path.clone(),
        }
    })?;
    let windowed = window::select_window(&records, &report_window);
    println!(
        "✓ Window: {} to {}",
        report_window.start.date(),
        report_window.reference.date()
    );
    println!("✓ {} customers in window", format_int(windowed.len()));

    println!("\n[3/6] Identifying at-risk customers...");
    let at_risk = segment::select_at_risk(&windowed, &AtRiskRule::from(config));
    println!("✓ {} at-risk customers identified", format_int(at_risk.len()));

    println!("\n[4/6] Computing KPIs...");
    let overall = reports::kpi_overall(&windowed);
    let by_country = reports::kpi_by_country(&windowed);
    let by_tier = reports::kpi_by_tier(&windowed);
    println!("✓ Overall, country, and tier KPIs computed\n");
    println!("KPIs by country (top {}):\n", config.preview_rows);
    output::preview_table_rows(&by_country, config.preview_rows);
    println!("KPIs by customer tier:\n");
    output::preview_table_rows(&by_tier, config.preview_rows);

    println!("[5/6] Exporting reports...");
    output::ensure_dir(&config.output_dir)?;
    output::ensure_dir(&config.charts_dir())?;

    output::write_csv(&config.output_file(OVERALL_KPI_FILE), std::slice::from_ref(&overall))?;
    println!("✓ Exported: {}", OVERALL_KPI_FILE);
    output::write_csv(&config.output_file(COUNTRY_KPI_FILE), &by_country)?;
    println!("✓ Exported: {}", COUNTRY_KPI_FILE);
    output::write_csv(&config.output_file(TIER_KPI_FILE), &by_tier)?;
    println!("✓ Exported: {}", TIER_KPI_FILE);
    output::write_csv(&config.output_file(AT_RISK_FILE), &segment::export_rows(&at_risk))?;
    println!(
        "✓ Exported: {} ({} customers)",
        AT_RISK_FILE,
        format_int(at_risk.len())
    );

    let summary = reports::generate_summary(&report_window, records.len(), &overall, at_risk.len());
    output::write_json(&config.output_file(SUMMARY_FILE), &summary)?;
    println!("✓ Exported: {}", SUMMARY_FILE);

    println!("\n[6/6] Generating executive charts...");
    if config.render_charts {
        let days: Vec<i64> = at_risk.iter().map(|w| w.days_since_purchase).collect();
        charts::render_inactivity_histogram(
            &days,
            config.histogram_bins,
            &config.chart_file(INACTIVITY_CHART_FILE),
        )?;
        println!("✓ Chart saved: {}", INACTIVITY_CHART_FILE);
        charts::render_abandon_rate_by_tier(&by_tier, &config.chart_file(ABANDON_CHART_FILE))?;
        println!("✓ Chart saved: {}", ABANDON_CHART_FILE);
    } else {
        println!("- Chart rendering disabled");
    }

    print_summary(config, &summary);
    Ok(summary)
}

fn print_summary(config: &ReportConfig, summary: &SummaryStats) {
    println!("\n{}", RULE);
    println!("REPORT GENERATION COMPLETE");
    println!("{}", RULE);
    println!(
        "\nSummary: In the last {} days, {} of customers churned,",
        summary.window_days,
        format_pct(summary.churn_rate, 1)
    );
    println!(
        "   with an average cart abandon rate of {}.",
        format_pct(summary.avg_cart_abandon_rate, 1)
    );
    println!(
        "\n{} at-risk customers require immediate attention.",
        format_int(summary.at_risk_customers)
    );
    println!("\nAll reports saved to: {}", config.output_dir.display());
    println!("{}", RULE);
}

pub fn banner() {
    println!("{}", RULE);
    println!("CUSTOMER HEALTH REPORT GENERATOR");
    println!("{}", RULE);
}
