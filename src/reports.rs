use crate::types::{
    CountryKpiRow, CustomerTier, OverallKpiRow, SummaryStats, TierKpiRow, WindowedRecord,
};
use crate::util::{average, ratio};
use crate::window::ReportWindow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Mean over the records that have a value; blanks are skipped.
fn mean_of(window: &[WindowedRecord], f: impl Fn(&WindowedRecord) -> Option<f64>) -> f64 {
    average(&window.iter().filter_map(f).collect::<Vec<f64>>())
}

/// Churn flags seen in a group, split into churned and known.
#[derive(Default)]
struct ChurnTally {
    churned: usize,
    known: usize,
}

impl ChurnTally {
    fn add(&mut self, flag: Option<bool>) {
        if let Some(churned) = flag {
            self.known += 1;
            self.churned += usize::from(churned);
        }
    }

    /// Share of churned among customers with a flag.
    fn rate(&self) -> f64 {
        ratio(self.churned, self.known)
    }
}

pub fn kpi_overall(window: &[WindowedRecord]) -> OverallKpiRow {
    let total = window.len();
    let mut tally = ChurnTally::default();
    for w in window {
        tally.add(w.record.churned);
    }

    // A customer with a blank churn flag is counted in neither bucket, but
    // the rate is still over the whole window.
    OverallKpiRow {
        total_customers: total,
        active_customers: tally.known - tally.churned,
        churned_customers: tally.churned,
        churn_rate: ratio(tally.churned, total),
        avg_purchase_value: mean_of(window, |w| w.record.avg_purchase_value),
        avg_website_visits_per_month: mean_of(window, |w| w.record.website_visits_per_month),
        avg_cart_abandon_rate: mean_of(window, |w| w.record.cart_abandon_rate),
        avg_days_since_purchase: mean_of(window, |w| Some(w.days_since_purchase as f64)),
        revenue_proxy: window
            .iter()
            .filter_map(|w| Some(w.record.avg_purchase_value? * w.record.num_purchases? as f64))
            .sum(),
    }
}

pub fn kpi_by_country(window: &[WindowedRecord]) -> Vec<CountryKpiRow> {
    #[derive(Default)]
    struct Acc {
        customers: usize,
        churn: ChurnTally,
        abandon_rates: Vec<f64>,
        days: Vec<f64>,
    }
    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for w in window {
        let e = map.entry(w.record.country.as_str()).or_default();
        e.customers += 1;
        e.churn.add(w.record.churned);
        e.abandon_rates.extend(w.record.cart_abandon_rate);
        e.days.push(w.days_since_purchase as f64);
    }

    let mut rows: Vec<CountryKpiRow> = map
        .into_iter()
        .map(|(country, acc)| CountryKpiRow {
            country: country.to_string(),
            total_customers: acc.customers,
            churn_rate: acc.churn.rate(),
            avg_cart_abandon_rate: average(&acc.abandon_rates),
            avg_days_since_purchase: average(&acc.days),
        })
        .collect();

    // Map order is alphabetical and the sort is stable, so full ties stay
    // sorted by country name.
    rows.sort_by(|a, b| {
        b.avg_cart_abandon_rate
            .partial_cmp(&a.avg_cart_abandon_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.avg_days_since_purchase
                    .partial_cmp(&a.avg_days_since_purchase)
                    .unwrap_or(Ordering::Equal)
            })
    });
    rows
}

/// One row per tier present in the window, Low → Medium → High.
pub fn kpi_by_tier(window: &[WindowedRecord]) -> Vec<TierKpiRow> {
    #[derive(Default)]
    struct Acc {
        customers: usize,
        churn: ChurnTally,
        abandon_rates: Vec<f64>,
        purchase_values: Vec<f64>,
    }
    let mut map: BTreeMap<CustomerTier, Acc> = BTreeMap::new();
    for w in window {
        let e = map.entry(w.tier).or_default();
        e.customers += 1;
        e.churn.add(w.record.churned);
        e.abandon_rates.extend(w.record.cart_abandon_rate);
        e.purchase_values.extend(w.record.avg_purchase_value);
    }

    map.into_iter()
        .map(|(tier, acc)| TierKpiRow {
            customer_tier: tier,
            total_customers: acc.customers,
            churn_rate: acc.churn.rate(),
            avg_cart_abandon_rate: average(&acc.abandon_rates),
            avg_purchase_value: average(&acc.purchase_values),
        })
        .collect()
}

pub fn generate_summary(
    window: &ReportWindow,
    records_loaded: usize,
    overall: &OverallKpiRow,
    at_risk_count: usize,
) -> SummaryStats {
    SummaryStats {
        reference_date: window.reference.date().to_string(),
        window_start: window.start.date().to_string(),
        window_days: window.days,
        records_loaded,
        total_customers: overall.total_customers,
        churned_customers: overall.churned_customers,
        churn_rate: overall.churn_rate,
        avg_cart_abandon_rate: overall.avg_cart_abandon_rate,
        revenue_proxy: overall.revenue_proxy,
        at_risk_customers: at_risk_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerRecord;
    use chrono::NaiveDate;

    fn windowed(country: &str, score: f64, days: i64, abandon: f64, churned: bool) -> WindowedRecord {
        WindowedRecord {
            record: CustomerRecord {
                customer_id: format!("{country}-{days}"),
                country: country.to_string(),
                gender: "Female".to_string(),
                last_purchase: NaiveDate::from_ymd_opt(2024, 3, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                spending_score: Some(score),
                cart_abandon_rate: Some(abandon),
                num_purchases: Some(2),
                avg_purchase_value: Some(score),
                website_visits_per_month: Some(4.0),
                churned: Some(churned),
            },
            days_since_purchase: days,
            tier: CustomerTier::from_score(score),
        }
    }

    fn sample() -> Vec<WindowedRecord> {
        vec![
            windowed("Germany", 80.0, 10, 0.5, false),
            windowed("France", 20.0, 20, 0.75, true),
            windowed("Germany", 50.0, 0, 0.25, true),
            windowed("Spain", 30.0, 30, 0.5, false),
        ]
    }

    #[test]
    fn overall_counts_and_rates() {
        let kpi = kpi_overall(&sample());
        assert_eq!(kpi.total_customers, 4);
        assert_eq!(kpi.active_customers + kpi.churned_customers, kpi.total_customers);
        assert_eq!(kpi.churned_customers, 2);
        assert_eq!(kpi.churn_rate, 0.5);
        assert_eq!(kpi.avg_purchase_value, 45.0);
        assert_eq!(kpi.avg_website_visits_per_month, 4.0);
        assert_eq!(kpi.avg_cart_abandon_rate, 0.5);
        assert_eq!(kpi.avg_days_since_purchase, 15.0);
        assert_eq!(kpi.revenue_proxy, 360.0);
    }

    #[test]
    fn overall_on_empty_window_is_zero_filled() {
        let kpi = kpi_overall(&[]);
        assert_eq!(kpi.total_customers, 0);
        assert_eq!(kpi.churn_rate, 0.0);
        assert_eq!(kpi.avg_cart_abandon_rate, 0.0);
        assert_eq!(kpi.revenue_proxy, 0.0);
        assert!(kpi_by_country(&[]).is_empty());
        assert!(kpi_by_tier(&[]).is_empty());
    }

    #[test]
    fn blank_values_are_left_out_of_means_and_counts() {
        let mut rows = sample();
        rows[0].record.website_visits_per_month = None;
        rows[1].record.cart_abandon_rate = None;
        rows[2].record.churned = None;
        rows[3].record.num_purchases = None;
        let kpi = kpi_overall(&rows);
        assert_eq!(kpi.total_customers, 4);
        assert_eq!(kpi.avg_website_visits_per_month, 4.0);
        // (0.5 + 0.25 + 0.5) / 3
        assert!((kpi.avg_cart_abandon_rate - 1.25 / 3.0).abs() < 1e-12);
        assert_eq!(kpi.churned_customers, 1);
        assert_eq!(kpi.active_customers, 2);
        assert_eq!(kpi.churn_rate, 0.25);
        // Spain's 30 x 2 drops out of 360
        assert_eq!(kpi.revenue_proxy, 300.0);
        assert!(kpi.avg_cart_abandon_rate.is_finite());

        let germany = kpi_by_country(&rows)
            .into_iter()
            .find(|r| r.country == "Germany")
            .unwrap();
        // only the 80-score row has a flag, and it did not churn
        assert_eq!(germany.churn_rate, 0.0);
        assert_eq!(germany.total_customers, 2);

        let low = &kpi_by_tier(&rows)[0];
        assert_eq!(low.customer_tier, CustomerTier::Low);
        // France's blank rate leaves only Spain's 0.5
        assert_eq!(low.avg_cart_abandon_rate, 0.5);
    }

    #[test]
    fn countries_sorted_by_abandon_then_recency() {
        let rows = kpi_by_country(&sample());
        let names: Vec<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        // France 0.75; Spain 0.5 / 30 days; Germany 0.375
        assert_eq!(names, vec!["France", "Spain", "Germany"]);
        let germany = &rows[2];
        assert_eq!(germany.total_customers, 2);
        assert_eq!(germany.churn_rate, 0.5);
        assert_eq!(germany.avg_days_since_purchase, 5.0);
        for pair in rows.windows(2) {
            assert!(pair[0].avg_cart_abandon_rate >= pair[1].avg_cart_abandon_rate);
        }
    }

    #[test]
    fn recency_breaks_abandon_ties() {
        let window = vec![
            windowed("Austria", 50.0, 3, 0.4, false),
            windowed("Belgium", 50.0, 9, 0.4, false),
        ];
        let names: Vec<String> = kpi_by_country(&window).into_iter().map(|r| r.country).collect();
        assert_eq!(names, vec!["Belgium", "Austria"]);
    }

    #[test]
    fn tiers_in_severity_order_and_only_present_ones() {
        let window = vec![
            windowed("Germany", 90.0, 1, 0.2, false),
            windowed("Germany", 10.0, 1, 0.6, true),
            windowed("Germany", 95.0, 1, 0.4, true),
        ];
        let rows = kpi_by_tier(&window);
        let tiers: Vec<CustomerTier> = rows.iter().map(|r| r.customer_tier).collect();
        assert_eq!(tiers, vec![CustomerTier::Low, CustomerTier::High]);
        let high = &rows[1];
        assert_eq!(high.total_customers, 2);
        assert_eq!(high.churn_rate, 0.5);
        assert!((high.avg_cart_abandon_rate - 0.3).abs() < 1e-12);
        assert_eq!(high.avg_purchase_value, 92.5);
    }

    #[test]
    fn summary_mirrors_overall() {
        let window = ReportWindow::ending_at(
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            30,
        );
        let overall = kpi_overall(&sample());
        let summary = generate_summary(&window, 10, &overall, 1);
        assert_eq!(summary.reference_date, "2024-03-31");
        assert_eq!(summary.window_start, "2024-03-01");
        assert_eq!(summary.records_loaded, 10);
        assert_eq!(summary.churn_rate, 0.5);
        assert_eq!(summary.at_risk_customers, 1);
    }
}
