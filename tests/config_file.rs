use loadmap_rs::DashboardConfig;
use loadmap_rs::api::LayerSource;
use loadmap_rs::map::BaseMap;
use loadmap_rs::panel::Selector;
use loadmap_rs::{Metric, Properties};
use serde_json::json;
use std::io::Write;

#[test]
fn loads_file_with_schema_overrides() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    write!(
        tmp,
        r##"{{
            "backend_url": "http://10.0.0.5:9000",
            "layers": "https://example.org/layers.geojson",
            "initial_metric": "hh_max",
            "base_map": "dark",
            "num_classes": 3,
            "palette": ["#ffffff", "#888888", "#000000"],
            "schema": {{ "overrides": {{ "GHA": "level1_first" }} }}
        }}"##
    )
    .unwrap();

    let cfg = DashboardConfig::load(Some(tmp.path())).unwrap();
    assert_eq!(cfg.initial_metric, Metric::HouseholdMax);
    assert_eq!(cfg.base_map, BaseMap::Dark);
    assert_eq!(cfg.num_classes, 3);
    assert_eq!(
        cfg.layer_source(),
        LayerSource::Url("https://example.org/layers.geojson".into())
    );
    assert_eq!(cfg.client().unwrap().base_url, "http://10.0.0.5:9000");

    // overrides replace the built-in table
    let schema = cfg.source_schema();
    let gha = Properties::from_iter([
        ("ISO3", json!("GHA")),
        ("level_0", json!("Greater Accra")),
        ("level_1", json!("Accra")),
    ]);
    assert_eq!(
        schema.selector_for(&gha).unwrap(),
        Selector::new("Accra", "Greater Accra")
    );
}

#[test]
fn rejects_invalid_settings() {
    assert!(DashboardConfig::from_json_str(r##"{"num_classes": 1, "palette": ["#000000"]}"##).is_err());
    assert!(DashboardConfig::from_json_str(r#"{"width": 0}"#).is_err());
    assert!(DashboardConfig::from_json_str(r#"{"initial_metric": "median"}"#).is_err());
    assert!(DashboardConfig::load(Some(std::path::Path::new("/nonexistent/loadmap.json"))).is_err());
}
