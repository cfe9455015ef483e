use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One CSV row as it appears on disk. Every column is optional text so the
/// loader can report exactly which field on which line could not be read.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub customer_id: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub last_purchase_date: Option<String>,
    pub spending_score: Option<String>,
    pub cart_abandon_rate: Option<String>,
    pub num_purchases: Option<String>,
    pub avg_purchase_value: Option<String>,
    pub website_visits_per_month: Option<String>,
    pub churned: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub country: String,
    pub gender: String,
    pub last_purchase: NaiveDateTime,
    // Blank cells load as `None` and are left out of every mean and count.
    pub spending_score: Option<f64>,
    pub cart_abandon_rate: Option<f64>,
    pub num_purchases: Option<i64>,
    pub avg_purchase_value: Option<f64>,
    pub website_visits_per_month: Option<f64>,
    pub churned: Option<bool>,
}

/// Spending tier. Variant order is the report's severity order, so sorting
/// by `Ord` yields Low, Medium, High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CustomerTier {
    Low,
    Medium,
    High,
}

impl CustomerTier {
    pub const ALL: [CustomerTier; 3] = [CustomerTier::Low, CustomerTier::Medium, CustomerTier::High];

    /// Below 40 is Low, 40 through 70 inclusive is Medium, above 70 is High.
    /// A NaN score compares false against both bounds and lands in High.
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            CustomerTier::Low
        } else if score <= 70.0 {
            CustomerTier::Medium
        } else {
            CustomerTier::High
        }
    }

    /// A missing score behaves like NaN.
    pub fn from_optional_score(score: Option<f64>) -> Self {
        score.map_or(CustomerTier::High, CustomerTier::from_score)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerTier::Low => "Low",
            CustomerTier::Medium => "Medium",
            CustomerTier::High => "High",
        }
    }
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer inside the reporting window, with the derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedRecord {
    pub record: CustomerRecord,
    pub days_since_purchase: i64,
    pub tier: CustomerTier,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct OverallKpiRow {
    pub total_customers: usize,
    pub active_customers: usize,
    pub churned_customers: usize,
    #[tabled(display_with = "crate::util::display_rate")]
    pub churn_rate: f64,
    #[tabled(display_with = "crate::util::display_money")]
    pub avg_purchase_value: f64,
    #[tabled(display_with = "crate::util::display_decimal")]
    pub avg_website_visits_per_month: f64,
    #[tabled(display_with = "crate::util::display_rate")]
    pub avg_cart_abandon_rate: f64,
    #[tabled(display_with = "crate::util::display_decimal")]
    pub avg_days_since_purchase: f64,
    #[tabled(display_with = "crate::util::display_money")]
    pub revenue_proxy: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CountryKpiRow {
    pub country: String,
    pub total_customers: usize,
    #[tabled(display_with = "crate::util::display_rate")]
    pub churn_rate: f64,
    #[tabled(display_with = "crate::util::display_rate")]
    pub avg_cart_abandon_rate: f64,
    #[tabled(display_with = "crate::util::display_decimal")]
    pub avg_days_since_purchase: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct TierKpiRow {
    pub customer_tier: CustomerTier,
    pub total_customers: usize,
    #[tabled(display_with = "crate::util::display_rate")]
    pub churn_rate: f64,
    #[tabled(display_with = "crate::util::display_rate")]
    pub avg_cart_abandon_rate: f64,
    #[tabled(display_with = "crate::util::display_money")]
    pub avg_purchase_value: f64,
}

/// Column subset exported for the retention team.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct AtRiskRow {
    pub customer_id: String,
    pub country: String,
    pub gender: String,
    pub days_since_purchase: i64,
    #[tabled(display_with = "crate::util::display_optional")]
    pub cart_abandon_rate: Option<f64>,
    #[tabled(display_with = "crate::util::display_optional")]
    pub num_purchases: Option<i64>,
    #[tabled(display_with = "crate::util::display_optional")]
    pub avg_purchase_value: Option<f64>,
    #[tabled(display_with = "crate::util::display_optional")]
    pub churned: Option<u8>,
    pub customer_tier: CustomerTier,
}

impl From<&WindowedRecord> for AtRiskRow {
    fn from(w: &WindowedRecord) -> Self {
        AtRiskRow {
            customer_id: w.record.customer_id.clone(),
            country: w.record.country.clone(),
            gender: w.record.gender.clone(),
            days_since_purchase: w.days_since_purchase,
            cart_abandon_rate: w.record.cart_abandon_rate,
            num_purchases: w.record.num_purchases,
            avg_purchase_value: w.record.avg_purchase_value,
            churned: w.record.churned.map(u8::from),
            customer_tier: w.tier,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub reference_date: String,
    pub window_start: String,
    pub window_days: i64,
    pub records_loaded: usize,
    pub total_customers: usize,
    pub churned_customers: usize,
    pub churn_rate: f64,
    pub avg_cart_abandon_rate: f64,
    pub revenue_proxy: f64,
    pub at_risk_customers: usize,
}
