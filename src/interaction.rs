//! Hover, click and popup behavior of individual regions.

use crate::choropleth::{RegionLayer, RegionStyle};
use crate::metrics::MINUTE_SAMPLES_TO_HOURS;
use crate::models::{Feature, Properties};
use serde::Serialize;

/// `adm1` value used by layers that have no first-level subdivision.
pub const PLACEHOLDER_ADMIN: &str = "dummy";
pub const ANALYZE_LABEL: &str = "Analyze Region";

/// Display name of a region: `"{adm2} ({adm1})"`, or just `adm2` for placeholder `adm1`.
pub fn region_name(props: &Properties) -> String {
    let adm2 = props.display("adm2").unwrap_or_default();
    match props.display("adm1") {
        Some(adm1) if adm1 != PLACEHOLDER_ADMIN => format!("{adm2} ({adm1})"),
        _ => adm2,
    }
}

/// Popup heading: region name followed by the ISO3 code.
pub fn popup_title(props: &Properties) -> String {
    let name = region_name(props);
    match props.display("ISO3") {
        Some(iso) => format!("{name} {iso}"),
        None => name,
    }
}

/// One statistic line of a popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupRow {
    pub label: &'static str,
    pub value: Option<f64>,
    pub decimals: usize,
    pub unit: &'static str,
}

impl PopupRow {
    fn scaled(
        props: &Properties,
        label: &'static str,
        key: &str,
        factor: f64,
        decimals: usize,
        unit: &'static str,
    ) -> Self {
        Self {
            label,
            value: props.number(key).map(|v| v * factor),
            decimals,
            unit,
        }
    }

    /// Formatted value with unit, or `"n/a"`.
    pub fn value_text(&self) -> String {
        match self.value {
            None => "n/a".to_string(),
            Some(v) if self.unit.is_empty() => format!("{v:.*}", self.decimals),
            Some(v) => format!("{v:.*} {}", self.decimals, self.unit),
        }
    }

    pub fn text(&self) -> String {
        format!("{}: {}", self.label, self.value_text())
    }
}

/// The seven popup statistics of a region, in display order.
pub fn popup_rows(props: &Properties) -> Vec<PopupRow> {
    vec![
        PopupRow::scaled(props, "Peak max", "max", 1e-6, 2, "MW"),
        PopupRow::scaled(props, "Mean", "mean", 1e-6, 2, "MW"),
        PopupRow::scaled(
            props,
            "Aggregated",
            "sum",
            MINUTE_SAMPLES_TO_HOURS * 1e-6,
            0,
            "MWh/year",
        ),
        PopupRow::scaled(props, "Estimated Households Number", "num_hh", 1.0, 0, ""),
        PopupRow::scaled(props, "Household Peak max", "hh_max", 1.0, 2, "W"),
        PopupRow::scaled(props, "Household mean", "hh_mean", 1.0, 2, "W"),
        PopupRow::scaled(
            props,
            "Household aggregated",
            "hh_sum",
            MINUTE_SAMPLES_TO_HOURS * 1e-3,
            0,
            "kWh/year",
        ),
    ]
}

/// An open popup. `button_id` is unique for the lifetime of the handler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub feature: usize,
    pub title: String,
    pub rows: Vec<PopupRow>,
    pub button_id: String,
    #[serde(skip)]
    pub properties: Properties,
}

impl Popup {
    pub fn to_text(&self) -> String {
        let mut out = self.title.clone();
        for row in &self.rows {
            out.push('\n');
            out.push_str(&row.text());
        }
        out
    }

    /// HTML fragment with the same content and the analyze button.
    pub fn to_html(&self) -> String {
        let mut html = format!("<h4>{}</h4>\n", escape_html(&self.title));
        for row in &self.rows {
            html.push_str(&format!(
                "<b>{}:</b> {}<br>\n",
                escape_html(row.label),
                escape_html(&row.value_text())
            ));
        }
        html.push_str(&format!(
            "<button id=\"{}\">{}</button>\n",
            escape_html(&self.button_id),
            ANALYZE_LABEL
        ));
        html
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Per-region pointer state over the active layer.
#[derive(Debug, Clone, Default)]
pub struct RegionInteractionHandler {
    next_button: u64,
    hovered: Option<usize>,
    /// Features raised by hover, most recent last.
    front: Vec<usize>,
    popup: Option<Popup>,
}

impl RegionInteractionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight `feature` and bring it to the front.
    pub fn hover(&mut self, feature: usize) {
        self.hovered = Some(feature);
        self.front.retain(|&f| f != feature);
        self.front.push(feature);
    }

    /// Revert the hovered region to its base style. It keeps its raised position.
    pub fn unhover(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Current style of `feature`: the layer's base style, emphasized while hovered.
    pub fn style_for(&self, layer: &RegionLayer, feature: usize) -> Option<RegionStyle> {
        let base = layer.style(feature)?;
        Some(if self.hovered == Some(feature) {
            base.highlighted()
        } else {
            base
        })
    }

    /// Bottom-to-top drawing order for `len` features.
    pub fn draw_order(&self, len: usize) -> Vec<usize> {
        let mut is_raised = vec![false; len];
        let raised: Vec<usize> = self.front.iter().copied().filter(|&f| f < len).collect();
        for &f in &raised {
            is_raised[f] = true;
        }
        let mut order: Vec<usize> = (0..len).filter(|&f| !is_raised[f]).collect();
        order.extend(raised);
        order
    }

    /// Open a popup for `feature`. Each call yields a fresh button id.
    pub fn open_popup(&mut self, index: usize, feature: &Feature) -> &Popup {
        self.next_button += 1;
        let popup = Popup {
            feature: index,
            title: popup_title(&feature.properties),
            rows: popup_rows(&feature.properties),
            button_id: format!("analyse-btn-{}", self.next_button),
            properties: feature.properties.clone(),
        };
        log::debug!("opened popup {} for feature {index}", popup.button_id);
        self.popup.insert(popup)
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Property mapping bound to `button_id`, if that popup is still open.
    pub fn activate(&self, button_id: &str) -> Option<&Properties> {
        self.popup
            .as_ref()
            .filter(|p| p.button_id == button_id)
            .map(|p| &p.properties)
    }

    /// Forget hover and raise state after the layer was replaced. Button ids keep counting.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.front.clear();
        self.popup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn raised_features_draw_last() {
        let mut h = RegionInteractionHandler::new();
        h.hover(1);
        h.hover(0);
        h.unhover();
        assert_eq!(h.draw_order(4), vec![2, 3, 1, 0]);
    }

    #[test]
    fn name_without_adm1() {
        let props = Properties::from_iter([("adm2", json!("Ikeja"))]);
        assert_eq!(region_name(&props), "Ikeja");
    }
}
