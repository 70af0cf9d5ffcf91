//! SVG charts for the dashboard views.
//!
//! - `plot_time_series`: one line (with markers) per country over the year range
//! - `plot_comparison`: one bar per country, latest value in range
//!
//! Empty inputs render a placeholder titled "No data available for current selection".

use crate::metrics::group_thousands;
use crate::models::{CanonicalRow, YearRange};
use anyhow::{Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters_svg::SVGBackend;
use std::collections::BTreeMap;
use std::path::Path;

pub const NO_DATA_TITLE: &str = "No data available for current selection";

/// Microsoft Office (2013+) chart series palette.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

#[inline]
fn series_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

/// Heuristic: estimate pixel width of text (Plotters has no built-in text measuring).
fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    ((text.chars().count() as f32) * (font_px as f32) * 0.60).ceil() as u32
}

/// Padded (min, max) for the value axis; a flat series gets ±1.
fn value_bounds(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }
    let pad = (hi - lo) * 0.05;
    (if include_zero && lo == 0.0 { 0.0 } else { lo - pad }, hi + pad)
}

fn draw_no_data(root: &DrawingArea<SVGBackend<'_>, Shift>) -> Result<()> {
    let (w, h) = root.dim_in_pixel();
    let font_px = 20;
    let text_w = estimate_text_width_px(NO_DATA_TITLE, font_px);
    let x = (w.saturating_sub(text_w) / 2) as i32;
    let y = (h / 2) as i32 - font_px as i32 / 2;
    let style = (FontFamily::SansSerif, font_px).into_font().color(&BLACK);
    root.draw_text(NO_DATA_TITLE, &style, (x, y))
        .map_err(|e| anyhow!("{:?}", e))?;
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Multi-country line chart of one indicator over `range`.
pub fn plot_time_series<'a, P: AsRef<Path>>(
    rows: impl IntoIterator<Item = &'a CanonicalRow>,
    indicator: &str,
    range: YearRange,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let mut series: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for r in rows {
        if let Some(v) = r.value {
            series
                .entry(r.country.as_str())
                .or_default()
                .push((r.year as f64, v));
        }
    }

    let root = SVGBackend::new(out_path.as_ref(), (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    if series.is_empty() {
        return draw_no_data(&root);
    }
    for pts in series.values_mut() {
        pts.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    let (y_min, y_max) = value_bounds(series.values().flatten().map(|p| p.1), false);
    let (mut x_min, mut x_max) = (range.start as f64, range.end as f64);
    if x_max <= x_min {
        x_min -= 0.5;
        x_max += 0.5;
    }
    let year_span = range.end.saturating_sub(range.start).max(0) as usize + 1;

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .caption(
            format!("Evolution of {indicator} ({range})"),
            (FontFamily::SansSerif, 22),
        )
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &f64| format!("{x:.0}");
    let y_label_fmt = |y: &f64| group_thousands(*y, if (y_max - y_min) < 10.0 { 2 } else { 0 });
    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(indicator)
        .x_labels(year_span.min(12))
        .y_labels(8)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (idx, (country, pts)) in series.iter().enumerate() {
        let color = series_color(idx);
        chart
            .draw_series(LineSeries::new(pts.iter().copied(), color.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?
            .label(*country)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2)));
        chart
            .draw_series(pts.iter().map(|&p| Circle::new(p, 3, color.filled())))
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 12))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Bar chart comparing countries; bars are drawn in input order.
///
/// Intended for the output of `dataset::latest_per_country`.
pub fn plot_comparison<'a, P: AsRef<Path>>(
    rows: impl IntoIterator<Item = &'a CanonicalRow>,
    indicator: &str,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let bars: Vec<(&str, f64)> = rows
        .into_iter()
        .filter_map(|r| r.value.map(|v| (r.country.as_str(), v)))
        .collect();

    let root = SVGBackend::new(out_path.as_ref(), (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    if bars.is_empty() {
        return draw_no_data(&root);
    }

    let (y_min, y_max) = value_bounds(bars.iter().map(|b| b.1), true);
    let n = bars.len();

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .caption(indicator, (FontFamily::SansSerif, 22))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 64)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < n {
            bars[i as usize].0.to_string()
        } else {
            String::new()
        }
    };
    let y_label_fmt = |y: &f64| group_thousands(*y, if (y_max - y_min) < 10.0 { 2 } else { 0 });
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Country")
        .y_desc(indicator)
        .x_labels(n)
        .y_labels(8)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 11))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let color = series_color(0);
    chart
        .draw_series(bars.iter().enumerate().map(|(i, &(_, v))| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0f64.min(v)), (x + 0.4, 0.0f64.max(v))], color.filled())
        }))
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
