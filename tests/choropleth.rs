mod common;

use loadmap_rs::choropleth::{
    BASE_FILL_OPACITY, BASE_WEIGHT, HIGHLIGHT_BORDER, HIGHLIGHT_WEIGHT, LegendBound, RegionStyle,
};
use loadmap_rs::color::{DEFAULT_COLORS, FALLBACK_COLOR};
use loadmap_rs::{ChoroplethRenderer, ClassifyError, Feature, FeatureCollection, Metric, Properties};
use serde_json::json;

#[test]
fn render_styles_every_region_and_builds_legend() {
    let fc = common::ten_regions();
    let mut renderer = ChoroplethRenderer::default();
    let layer = renderer.render(&fc, Metric::HouseholdMean).unwrap();

    assert_eq!(layer.len(), 10);
    assert_eq!(layer.styles().len(), 10);
    assert_eq!(layer.breakpoints().property(), "hh_mean");
    assert_eq!(layer.breakpoints().thresholds().len(), 9);
    assert_eq!(layer.metric(), Metric::HouseholdMean);
    assert_eq!(layer.class_of(0), Some(0));
    assert_eq!(layer.class_of(9), Some(9));
    assert_eq!(layer.style(4), Some(RegionStyle::base(DEFAULT_COLORS[4])));
    let style = layer.style(4).unwrap();
    assert_eq!(style.border, style.fill);
    assert_eq!(style.weight, BASE_WEIGHT);
    assert_eq!(style.fill_opacity, BASE_FILL_OPACITY);

    let legend = renderer.legend().unwrap();
    assert_eq!(legend.title, "Household Mean (W)");
    assert_eq!(legend.rows.len(), 10);
    assert_eq!(legend.rows[0].label(), "≤ 19.00");
    assert_eq!(legend.rows[8].label(), "≤ 91.00");
    assert_eq!(legend.rows[9].label(), "> 91.00");
    assert_eq!(legend.rows[9].bound, LegendBound::Above(91.0));
    assert_eq!(legend.rows[0].color, DEFAULT_COLORS[0]);
    assert_eq!(legend.rows[9].color, DEFAULT_COLORS[9]);
}

#[test]
fn legend_values_use_display_units() {
    let fc = common::values(
        "max",
        &[json!(0.0), json!(10_000_000.0)],
    );
    let mut renderer = ChoroplethRenderer::default();
    renderer.render(&fc, Metric::Max).unwrap();
    let legend = renderer.legend().unwrap();
    assert_eq!(legend.title, "Peak max (MW)");
    assert_eq!(legend.rows[0].label(), "≤ 1.00");
    assert_eq!(legend.rows[0].value_text(), "1.00");
}

#[test]
fn unitless_metric_title_has_no_parentheses() {
    let fc = common::ten_regions();
    let mut renderer = ChoroplethRenderer::default();
    renderer.render(&fc, Metric::HouseholdCount).unwrap();
    assert_eq!(renderer.legend().unwrap().title, "Household Number");
}

#[test]
fn rerender_replaces_layer_and_legend() {
    let fc = common::ten_regions();
    let mut renderer = ChoroplethRenderer::default();
    let first = renderer.render(&fc, Metric::Max).unwrap().id();
    for metric in Metric::ALL {
        renderer.render(&fc, metric).unwrap();
        assert_eq!(renderer.layer_count(), 1);
        assert_eq!(renderer.legend_count(), 1);
    }
    let last = renderer.layer().unwrap();
    assert_ne!(last.id(), first);
    assert_eq!(last.metric(), Metric::Cluster);
    assert_eq!(first.to_string(), "layer-1");
}

#[test]
fn failed_render_keeps_previous_layer() {
    let fc = common::ten_regions();
    let mut renderer = ChoroplethRenderer::default();
    let id = renderer.render(&fc, Metric::HouseholdMean).unwrap().id();

    let no_values = common::values("hh_mean", &[json!(null)]);
    let err = renderer.render(&no_values, Metric::HouseholdMean).unwrap_err();
    assert!(matches!(err, ClassifyError::NoNumericValues { .. }));
    assert_eq!(renderer.layer().unwrap().id(), id);
    assert_eq!(renderer.legend_count(), 1);
}

#[test]
fn regions_without_value_use_fallback() {
    let mut fc = common::ten_regions();
    fc.features.push(Feature::new(
        Some(common::square(20.0, 0.0, 1.0)),
        Properties::from_iter([("adm2", json!("Nowhere"))]),
    ));
    let mut renderer = ChoroplethRenderer::default();
    let layer = renderer.render(&fc, Metric::HouseholdMean).unwrap();
    assert_eq!(layer.class_of(10), None);
    assert_eq!(layer.style(10).unwrap().fill, FALLBACK_COLOR);
}

#[test]
fn highlight_keeps_fill() {
    let base = RegionStyle::base(DEFAULT_COLORS[2]);
    let hi = base.highlighted();
    assert_eq!(hi.fill, base.fill);
    assert_eq!(hi.border, HIGHLIGHT_BORDER);
    assert_eq!(hi.weight, HIGHLIGHT_WEIGHT);
    assert!(hi.fill_opacity < base.fill_opacity);
}

#[test]
fn empty_collection_cannot_render() {
    let mut renderer = ChoroplethRenderer::default();
    assert!(renderer.render(&FeatureCollection::default(), Metric::Max).is_err());
    assert_eq!(renderer.layer_count(), 0);
    assert_eq!(renderer.legend_count(), 0);
}
