//! Per-minute load chart of one region: a single line with a light area beneath it.

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::AreaSeries;
use plotters::style::FontFamily;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;

use super::ensure_fonts_registered;
use super::types::{CHART_AREA_OPACITY, CHART_LINE, OutputFormat};
use super::util::{tick_label, tuple_color};
use crate::panel::{TimeSeries, minute_label};

pub const X_AXIS_TITLE: &str = "Time of Day";
pub const Y_AXIS_TITLE: &str = "Load (MW)";

/// Render `series` to `out_path` (`.svg` → SVG, anything else → PNG).
pub fn plot_series<P: AsRef<Path>>(
    series: &TimeSeries,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    if series.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    match OutputFormat::from_path(out_path) {
        OutputFormat::Svg => {
            let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
            draw_series_chart(root, series)?;
        }
        OutputFormat::Bitmap => {
            let root =
                BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
            draw_series_chart(root, series)?;
        }
    }
    log::info!("wrote chart of {} samples to {}", series.len(), path_string);
    Ok(())
}

fn draw_series_chart<DB>(root: DrawingArea<DB, Shift>, series: &TimeSeries) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let values: Vec<f64> = series.values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Err(anyhow!("no numeric values to plot"));
    }
    // y axis always starts at zero
    let y_min = values.iter().copied().fold(0.0, f64::min);
    let mut y_max = values.iter().copied().fold(0.0, f64::max);
    if (y_max - y_min).abs() < f64::EPSILON {
        y_max = y_min + 1.0;
    }
    let x_max = (series.len().saturating_sub(1)).max(1) as f64;

    let line = tuple_color(CHART_LINE);
    let points: Vec<(f64, f64)> = series
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, v)| (i as f64, *v))
        .collect();

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(series.selector.as_str(), (FontFamily::SansSerif, 20))
        .set_label_area_size(LabelAreaPosition::Left, 72)
        .set_label_area_size(LabelAreaPosition::Bottom, 48)
        .build_cartesian_2d(0.0..x_max, y_min..y_max * 1.05)
        .map_err(|e| anyhow!("{:?}", e))?;

    let x_label_fmt = |x: &f64| minute_label(x.max(0.0).round() as usize);
    let y_label_fmt = |v: &f64| tick_label(*v);
    chart
        .configure_mesh()
        .x_desc(X_AXIS_TITLE)
        .y_desc(Y_AXIS_TITLE)
        .x_labels(13)
        .y_labels(10)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .draw_series(
            AreaSeries::new(points, 0.0, line.mix(CHART_AREA_OPACITY).filled())
                .border_style(line.stroke_width(2)),
        )
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
