mod common;

use loadmap_rs::map::BaseMap;
use loadmap_rs::panel::{Selector, TimeSeries};
use loadmap_rs::{Dashboard, Metric, viz};
use std::fs;

fn dashboard() -> Dashboard {
    let mut d = Dashboard::with_defaults(common::ten_regions());
    d.select_metric(Metric::HouseholdMean).unwrap();
    d.fit_to_regions(640, 480);
    d
}

#[test]
fn map_to_svg_and_png() {
    let dir = tempfile::tempdir().unwrap();
    let d = dashboard();
    let scene = d.scene(640, 480);
    assert_eq!(scene.regions.len(), 10);

    let svg = dir.path().join("map.svg");
    viz::render_map(&scene, &svg).unwrap();
    let text = fs::read_to_string(&svg).unwrap();
    assert!(text.starts_with("<svg"));
    assert!(text.contains("Household Mean (W)"));
    assert!(text.contains("OpenStreetMap"));

    let png = dir.path().join("map.png");
    viz::render_map(&scene, &png).unwrap();
    assert!(fs::metadata(&png).unwrap().len() > 0);
}

#[test]
fn rgb_buffer_matches_viewport() {
    let mut d = dashboard();
    d.select_base_map(BaseMap::Dark);
    d.hover(3);
    let rgb = viz::render_map_rgb(&d.scene(320, 200)).unwrap();
    assert_eq!(rgb.len(), 320 * 200 * 3);
    // dark background in the untouched top-left corner
    let (r, g, b) = BaseMap::Dark.background();
    assert_eq!(&rgb[..3], &[r, g, b]);
}

#[test]
fn empty_scene_still_renders() {
    let d = Dashboard::with_defaults(Default::default());
    let scene = d.scene(200, 100);
    assert!(scene.regions.is_empty());
    assert!(scene.legend.is_none());
    let rgb = viz::render_map_rgb(&scene).unwrap();
    assert_eq!(rgb.len(), 200 * 100 * 3);
}

#[test]
fn load_chart_svg() {
    let dir = tempfile::tempdir().unwrap();
    let values: Vec<f64> = (0..1440)
        .map(|i| 50.0 + 30.0 * (i as f64 / 1440.0 * std::f64::consts::TAU).sin())
        .collect();
    let series = TimeSeries::new(Selector::new("Ikeja", "Lagos"), values);
    let out = dir.path().join("profile.svg");
    viz::plot_series(&series, &out, 800, 400).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("Time of Day"));
    assert!(text.contains("Load (MW)"));
}
