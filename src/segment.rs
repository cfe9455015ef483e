//! At-risk segmentation over the windowed customers.

use crate::config::ReportConfig;
use crate::types::{AtRiskRow, WindowedRecord};
use crate::util::desc_missing_last;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtRiskRule {
    pub inactivity_days: i64,
    pub abandon_rate_threshold: f64,
}

impl Default for AtRiskRule {
    fn default() -> Self {
        AtRiskRule {
            inactivity_days: 30,
            abandon_rate_threshold: 0.9,
        }
    }
}

impl From<&ReportConfig> for AtRiskRule {
    fn from(cfg: &ReportConfig) -> Self {
        AtRiskRule {
            inactivity_days: cfg.inactivity_days,
            abandon_rate_threshold: cfg.abandon_rate_threshold,
        }
    }
}

impl AtRiskRule {
    pub fn matches(&self, w: &WindowedRecord) -> bool {
        w.days_since_purchase >= self.inactivity_days
            || w
                .record
                .cart_abandon_rate
                .map_or(false, |rate| rate >= self.abandon_rate_threshold)
    }
}

/// Most inactive first, then highest abandon rate with missing rates last.
/// The sort is stable, so full ties keep input order.
pub fn select_at_risk<'a>(window: &'a [WindowedRecord], rule: &AtRiskRule) -> Vec<&'a WindowedRecord> {
    let mut at_risk: Vec<&WindowedRecord> = window.iter().filter(|w| rule.matches(w)).collect();
    at_risk.sort_by(|a, b| {
        b.days_since_purchase
            .cmp(&a.days_since_purchase)
            .then_with(|| desc_missing_last(a.record.cart_abandon_rate, b.record.cart_abandon_rate))
    });
    at_risk
}

pub fn export_rows(at_risk: &[&WindowedRecord]) -> Vec<AtRiskRow> {
    at_risk.iter().map(|w| AtRiskRow::from(*w)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomerRecord, CustomerTier};
    use chrono::NaiveDate;

    fn windowed(id: &str, days: i64, abandon: f64) -> WindowedRecord {
        WindowedRecord {
            record: CustomerRecord {
                customer_id: id.to_string(),
                country: "Spain".to_string(),
                gender: "Male".to_string(),
                last_purchase: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                spending_score: Some(50.0),
                cart_abandon_rate: Some(abandon),
                num_purchases: Some(3),
                avg_purchase_value: Some(25.0),
                website_visits_per_month: Some(4.0),
                churned: Some(days > 20),
            },
            days_since_purchase: days,
            tier: CustomerTier::Medium,
        }
    }

    fn ids(rows: &[&WindowedRecord]) -> Vec<String> {
        rows.iter().map(|w| w.record.customer_id.clone()).collect()
    }

    #[test]
    fn inactivity_or_abandonment() {
        let window = vec![
            windowed("a", 5, 0.2),
            windowed("b", 35, 0.95),
            windowed("c", 10, 0.1),
            windowed("d", 40, 0.5),
        ];
        let at_risk = select_at_risk(&window, &AtRiskRule::default());
        assert_eq!(ids(&at_risk), vec!["d", "b"]);
    }

    #[test]
    fn abandon_only_rows_are_ordered_by_their_own_days() {
        let window = vec![
            windowed("low-days", 2, 0.97),
            windowed("inactive", 30, 0.1),
            windowed("mid-days", 12, 0.9),
            windowed("safe", 29, 0.89),
        ];
        let at_risk = select_at_risk(&window, &AtRiskRule::default());
        assert_eq!(ids(&at_risk), vec!["inactive", "mid-days", "low-days"]);
    }

    #[test]
    fn ties_break_on_abandon_rate_then_input_order() {
        let window = vec![
            windowed("x", 31, 0.3),
            windowed("y", 31, 0.6),
            windowed("z", 31, 0.3),
        ];
        let at_risk = select_at_risk(&window, &AtRiskRule::default());
        assert_eq!(ids(&at_risk), vec!["y", "x", "z"]);
    }

    #[test]
    fn missing_abandon_rate_only_counts_inactivity() {
        let mut blank_recent = windowed("blank-recent", 3, 0.0);
        blank_recent.record.cart_abandon_rate = None;
        let mut blank_old = windowed("blank-old", 31, 0.0);
        blank_old.record.cart_abandon_rate = None;
        let window = vec![blank_recent, blank_old, windowed("known-old", 31, 0.2)];
        let at_risk = select_at_risk(&window, &AtRiskRule::default());
        assert_eq!(ids(&at_risk), vec!["known-old", "blank-old"]);
    }

    #[test]
    fn rule_follows_config() {
        let cfg = ReportConfig {
            inactivity_days: 7,
            abandon_rate_threshold: 0.5,
            ..ReportConfig::default()
        };
        let rule = AtRiskRule::from(&cfg);
        assert!(rule.matches(&windowed("a", 7, 0.0)));
        assert!(rule.matches(&windowed("b", 0, 0.5)));
        assert!(!rule.matches(&windowed("c", 6, 0.49)));
    }

    #[test]
    fn export_keeps_the_retention_columns() {
        let window = vec![windowed("b", 35, 0.95)];
        let at_risk = select_at_risk(&window, &AtRiskRule::default());
        let rows = export_rows(&at_risk);
        assert_eq!(rows[0].customer_id, "b");
        assert_eq!(rows[0].days_since_purchase, 35);
        assert_eq!(rows[0].churned, Some(1));
        assert_eq!(rows[0].cart_abandon_rate, Some(0.95));
        assert_eq!(rows[0].customer_tier, CustomerTier::Medium);
    }
}
