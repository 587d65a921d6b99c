#![allow(dead_code)]

use geo::{Geometry, LineString, Polygon};
use loadmap_rs::{Feature, FeatureCollection, Properties};
use serde_json::{Value, json};

/// Axis-aligned square with its lower-left corner at (`lon`, `lat`).
pub fn square(lon: f64, lat: f64, size: f64) -> Geometry<f64> {
    Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            (lon, lat),
            (lon + size, lat),
            (lon + size, lat + size),
            (lon, lat + size),
            (lon, lat),
        ]),
        vec![],
    ))
}

/// A region with full Nigerian-style properties.
pub fn region(adm1: &str, adm2: &str, iso3: &str, hh_mean: f64) -> Properties {
    Properties::from_iter([
        ("adm1", json!(adm1)),
        ("adm2", json!(adm2)),
        ("ISO3", json!(iso3)),
        ("level_0", json!(adm1)),
        ("level_1", json!(adm2)),
        ("max", json!(12_345_678.0)),
        ("mean", json!(5_000_000.0)),
        ("sum", json!(6_000_000_000.0)),
        ("num_hh", json!(1500)),
        ("hh_max", json!(410.5)),
        ("hh_mean", json!(hh_mean)),
        ("hh_sum", json!(120_000.0)),
        ("cluster", json!(3)),
    ])
}

/// Ten side-by-side squares along the equator with `hh_mean` 10, 20, ..., 100.
pub fn ten_regions() -> FeatureCollection {
    FeatureCollection::new(
        (0..10)
            .map(|i| {
                let v = 10.0 * (i + 1) as f64;
                Feature::new(
                    Some(square(i as f64, 0.0, 1.0)),
                    region("Lagos", &format!("Area {i}"), "NGA", v),
                )
            })
            .collect(),
    )
}

/// Single-property regions without geometry.
pub fn values(key: &str, vals: &[Value]) -> FeatureCollection {
    FeatureCollection::new(
        vals.iter()
            .map(|v| Feature::new(None, Properties::from_iter([(key, v.clone())])))
            .collect(),
    )
}

/// GeoJSON text of two adjacent squares (NGA and GHA).
pub fn geojson_text() -> String {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[3.0, 6.0], [4.0, 6.0], [4.0, 7.0], [3.0, 7.0], [3.0, 6.0]]]
                },
                "properties": {
                    "adm1": "Lagos", "adm2": "Ikeja", "ISO3": "NGA",
                    "level_0": "Lagos", "level_1": "Ikeja",
                    "max": 2000000.0, "mean": 1000000.0, "sum": 600000000.0,
                    "num_hh": 900, "hh_max": 300.0, "hh_mean": 120.0, "hh_sum": 60000.0,
                    "cluster": 1
                }
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[-1.0, 5.0], [0.0, 5.0], [0.0, 6.0], [-1.0, 6.0], [-1.0, 5.0]]]]
                },
                "properties": {
                    "adm1": "dummy", "adm2": "Accra", "ISO3": "GHA",
                    "level_0": "Greater Accra", "level_1": "Accra",
                    "max": 4000000.0, "mean": 3000000.0, "sum": 900000000.0,
                    "num_hh": 1200, "hh_max": 500.0, "hh_mean": 220.0, "hh_sum": 80000.0,
                    "cluster": 2
                }
            }
        ]
    })
    .to_string()
}
