mod common;

use loadmap_rs::models::LoadError;
use loadmap_rs::{FeatureCollection, GeoPoint};
use std::io::Write;

#[test]
fn parses_polygons_and_multipolygons() {
    let fc = FeatureCollection::from_geojson_str(&common::geojson_text()).unwrap();
    assert_eq!(fc.len(), 2);
    assert!(fc.iter().all(|f| f.geometry.is_some()));
    let nga = &fc.get(0).unwrap().properties;
    assert_eq!(nga.text("ISO3"), Some("NGA"));
    assert_eq!(nga.number("num_hh"), Some(900.0));

    let b = fc.bounds().unwrap();
    assert_eq!((b.min().x, b.min().y), (-1.0, 5.0));
    assert_eq!((b.max().x, b.max().y), (4.0, 7.0));
}

#[test]
fn hit_testing() {
    let fc = FeatureCollection::from_geojson_str(&common::geojson_text()).unwrap();
    assert_eq!(fc.feature_at(GeoPoint::new(6.5, 3.5)), Some(0));
    assert_eq!(fc.feature_at(GeoPoint::new(5.5, -0.5)), Some(1));
    assert_eq!(fc.feature_at(GeoPoint::new(0.0, 0.0)), None);
}

#[test]
fn overlapping_regions_respect_draw_order() {
    let fc = loadmap_rs::FeatureCollection::new(vec![
        loadmap_rs::Feature::new(Some(common::square(0.0, 0.0, 2.0)), Default::default()),
        loadmap_rs::Feature::new(Some(common::square(1.0, 1.0, 2.0)), Default::default()),
    ]);
    let p = GeoPoint::new(1.5, 1.5);
    assert_eq!(fc.hit_test(p, &[0, 1]), Some(1));
    assert_eq!(fc.hit_test(p, &[1, 0]), Some(0));
}

#[test]
fn string_numbers_are_not_numeric() {
    let fc = FeatureCollection::from_geojson_str(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":null,"properties":{"max":"12"}},
            {"type":"Feature","geometry":null,"properties":{"max":3.5}},
            {"type":"Feature","geometry":null,"properties":null}
        ]}"#,
    )
    .unwrap();
    assert_eq!(fc.len(), 3);
    assert_eq!(fc.numeric_values("max"), vec![3.5]);
    assert_eq!(fc.get(0).unwrap().properties.display("max").as_deref(), Some("12"));
    assert!(fc.bounds().is_none());
}

#[test]
fn single_feature_is_rejected() {
    let err = FeatureCollection::from_geojson_str(
        r#"{"type":"Feature","geometry":null,"properties":{}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, LoadError::NotAFeatureCollection("Feature")));
}

#[test]
fn reads_from_file() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    tmp.write_all(common::geojson_text().as_bytes()).unwrap();
    let fc = FeatureCollection::from_path(tmp.path()).unwrap();
    assert_eq!(fc.len(), 2);
    assert!(FeatureCollection::from_path(tmp.path().with_extension("missing")).is_err());
}

#[test]
fn reader_reports_broken_json() {
    let fc = FeatureCollection::from_reader(common::geojson_text().as_bytes()).unwrap();
    assert_eq!(fc.len(), 2);

    let err = FeatureCollection::from_reader(&b"{\"type\": \"FeatureCollection\", "[..]).unwrap_err();
    assert!(matches!(err, LoadError::Json(_)));
    assert!(err.to_string().starts_with("invalid JSON"));
}
