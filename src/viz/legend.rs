//! Choropleth legend panel, drawn in the lower-right corner of the map.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::util::{estimate_text_width_px, to_rgb_color, truncate_to_width};
use crate::choropleth::Legend;

// Layout constants (must match legend_panel_size)
const TITLE_FONT_PX: u32 = 14;
const FONT_PX: u32 = 12;
const PAD: i32 = 8;
const SWATCH: i32 = 14;
const SWATCH_GAP: i32 = 8;
const ROW_H: i32 = 18;
const TITLE_GAP: i32 = 6;
const MAX_PANEL_W: u32 = 260;
/// Distance from the right and bottom edges of the map.
pub const LEGEND_MARGIN: i32 = 10;
/// Extra bottom clearance so the panel never covers the attribution line.
pub const ATTRIBUTION_BAND: i32 = 20;

/// Width and height in pixels the panel for `legend` needs.
pub fn legend_panel_size(legend: &Legend) -> (i32, i32) {
    let title_w = estimate_text_width_px(&legend.title, TITLE_FONT_PX).min(MAX_PANEL_W) as i32;
    let rows_w = legend
        .rows
        .iter()
        .map(|r| SWATCH + SWATCH_GAP + estimate_text_width_px(&r.label(), FONT_PX) as i32)
        .max()
        .unwrap_or(0);
    let w = title_w.max(rows_w) + 2 * PAD;
    let h = PAD + TITLE_FONT_PX as i32 + TITLE_GAP + ROW_H * legend.rows.len() as i32 + PAD;
    (w, h)
}

/// Draw `legend` as a boxed panel anchored to the lower-right corner of `area`.
pub fn draw_legend<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, legend: &Legend) -> Result<()> {
    let (w_u32, h_u32) = area.dim_in_pixel();
    let (panel_w, panel_h) = legend_panel_size(legend);
    let x0 = (w_u32 as i32 - panel_w - LEGEND_MARGIN).max(0);
    let y0 = (h_u32 as i32 - panel_h - LEGEND_MARGIN - ATTRIBUTION_BAND).max(0);

    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + panel_w, y0 + panel_h)],
        WHITE.mix(0.85).filled(),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    area.draw(&Rectangle::new(
        [(x0, y0), (x0 + panel_w, y0 + panel_h)],
        RGBColor(170, 170, 170).stroke_width(1),
    ))
    .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let title_style: TextStyle = TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX))
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Top));
    let label_style: TextStyle = TextStyle::from((FontFamily::SansSerif, FONT_PX))
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    let title = truncate_to_width(&legend.title, TITLE_FONT_PX, MAX_PANEL_W);
    area.draw(&Text::new(title, (x0 + PAD, y0 + PAD), title_style))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    let mut y = y0 + PAD + TITLE_FONT_PX as i32 + TITLE_GAP;
    for row in &legend.rows {
        let center_y = y + ROW_H / 2;
        area.draw(&Rectangle::new(
            [
                (x0 + PAD, center_y - SWATCH / 2),
                (x0 + PAD + SWATCH, center_y + SWATCH / 2),
            ],
            to_rgb_color(row.color).filled(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        area.draw(&Text::new(
            row.label(),
            (x0 + PAD + SWATCH + SWATCH_GAP, center_y),
            label_style.clone(),
        ))
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        y += ROW_H;
    }
    Ok(())
}
