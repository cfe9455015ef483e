//! Executive charts rendered with Plotters.
//!
//! Both charts are 10 x 6 inch figures at 300 DPI with small margins, so the
//! plotted content fills the image.

use crate::error::{ReportError, Result};
use crate::types::TierKpiRow;
use crate::util::format_pct;
use log::{debug, warn};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use std::error::Error;
use std::path::Path;

pub const CHART_SIZE: (u32, u32) = (3000, 1800);

const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const FONT: &str = "sans-serif";
// Point sizes scaled up to 300 DPI.
const TITLE_FONT: u32 = 58;
const LABEL_FONT: u32 = 50;
const TICK_FONT: u32 = 40;
const ANNOTATION_FONT: u32 = 46;
const EDGE_WIDTH: u32 = 3;

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;

/// Equal-width bins over the observed range.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl HistogramBins {
    pub fn range(&self) -> (f64, f64) {
        (self.edges[0], self.edges[self.edges.len() - 1])
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// The last bin is closed on the right, so the maximum value is counted.
/// A single distinct value gets a unit-wide range centred on it; no values
/// at all give the range [0, 1].
pub fn histogram_bins(values: &[i64], bins: usize) -> HistogramBins {
    let bins = bins.max(1);
    let (lo, hi) = match (values.iter().min(), values.iter().max()) {
        (Some(&min), Some(&max)) if min == max => (min as f64 - 0.5, max as f64 + 0.5),
        (Some(&min), Some(&max)) => (min as f64, max as f64),
        _ => (0.0, 1.0),
    };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + width * i as f64 })
        .collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = ((v as f64 - lo) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }
    HistogramBins { edges, counts }
}

/// Upper y limit for the tier chart: 15% headroom over the tallest bar.
pub fn bar_axis_limit(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 && max.is_finite() {
        max * 1.15
    } else {
        1.0
    }
}

pub fn render_inactivity_histogram(days: &[i64], bins: usize, path: &Path) -> Result<HistogramBins> {
    let hist = histogram_bins(days, bins);
    if days.is_empty() {
        warn!("no at-risk customers; {} will have no bars", path.display());
    }
    draw_histogram(&hist, path).map_err(|e| ReportError::Chart(e.to_string()))?;
    debug!("histogram {:?} -> {}", hist.counts, path.display());
    Ok(hist)
}

pub fn render_abandon_rate_by_tier(rows: &[TierKpiRow], path: &Path) -> Result<()> {
    if rows.iter().all(|r| r.avg_cart_abandon_rate <= 0.0) {
        warn!("all tier abandon rates are zero; using a unit y axis");
    }
    draw_tier_bars(rows, path).map_err(|e| ReportError::Chart(e.to_string()))
}

fn draw_histogram(hist: &HistogramBins, path: &Path) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (lo, hi) = hist.range();
    let pad = (hi - lo) * 0.05;
    let y_max = hist.max_count().max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "At-Risk Customer Distribution by Inactivity",
            (FONT, TITLE_FONT).into_font().style(FontStyle::Bold),
        )
        .margin(30)
        .x_label_area_size(140)
        .y_label_area_size(170)
        .build_cartesian_2d((lo - pad)..(hi + pad), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_max_light_lines(0)
        .bold_line_style(BLACK.mix(0.3))
        .x_desc("Days Since Last Purchase")
        .y_desc("Number of At-Risk Customers")
        .axis_desc_style((FONT, LABEL_FONT))
        .label_style((FONT, TICK_FONT))
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .draw()?;

    let bar = |i: usize, style: ShapeStyle| {
        Rectangle::new(
            [(hist.edges[i], 0.0), (hist.edges[i + 1], hist.counts[i] as f64)],
            style,
        )
    };
    let occupied: Vec<usize> = (0..hist.counts.len()).filter(|&i| hist.counts[i] > 0).collect();
    chart.draw_series(occupied.iter().map(|&i| bar(i, STEEL_BLUE.filled())))?;
    chart.draw_series(occupied.iter().map(|&i| bar(i, BLACK.stroke_width(EDGE_WIDTH))))?;

    root.present()?;
    Ok(())
}

fn draw_tier_bars(rows: &[TierKpiRow], path: &Path) -> DrawResult<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let labels: Vec<&str> = rows.iter().map(|r| r.customer_tier.as_str()).collect();
    let bars: Vec<(u32, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i as u32, r.avg_cart_abandon_rate))
        .collect();
    let slots = rows.len().max(1) as u32;
    let y_max = bar_axis_limit(&bars.iter().map(|b| b.1).collect::<Vec<f64>>());

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Cart Abandon Rate by Customer Tier",
            (FONT, TITLE_FONT).into_font().style(FontStyle::Bold),
        )
        .margin(30)
        .x_label_area_size(140)
        .y_label_area_size(170)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_max_light_lines(0)
        .bold_line_style(BLACK.mix(0.3))
        .x_desc("Customer Tier")
        .y_desc("Average Cart Abandon Rate")
        .axis_desc_style((FONT, LABEL_FONT))
        .label_style((FONT, TICK_FONT))
        .x_label_formatter(&|v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).map(|s| s.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(STEEL_BLUE.filled())
            .margin(80)
            .data(bars.iter().copied()),
    )?;
    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLACK.stroke_width(EDGE_WIDTH))
            .margin(80)
            .data(bars.iter().copied()),
    )?;

    let annotation = TextStyle::from((FONT, ANNOTATION_FONT).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(bars.iter().map(|&(i, v)| {
        Text::new(format_pct(v, 1), (SegmentValue::CenterOf(i), v), annotation.clone())
    }))?;

    root.present()?;
    Ok(())
}
