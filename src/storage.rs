use crate::choropleth::RegionLayer;
use crate::interaction::{popup_rows, region_name};
use crate::models::FeatureCollection;
use crate::panel::{TimeSeries, minute_label};
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One exported sample of a load series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    pub index: usize,
    pub label: String,
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Stamp the per-minute samples onto `day`, starting at 00:00.
pub fn series_records(series: &TimeSeries, day: NaiveDate) -> Vec<SeriesRecord> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    series
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| SeriesRecord {
            index: i,
            label: minute_label(i),
            timestamp: midnight + Duration::minutes(i as i64),
            value: *v,
        })
        .collect()
}

/// Save a series as CSV with header `index,label,timestamp,value`.
pub fn save_series_csv<P: AsRef<Path>>(series: &TimeSeries, day: NaiveDate, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for rec in series_records(series, day) {
        wtr.serialize(rec)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct SeriesDocument<'a> {
    selector: &'a str,
    day: NaiveDate,
    samples: Vec<SeriesRecord>,
}

/// Save a series as a pretty JSON object `{ selector, day, samples: [...] }`.
pub fn save_series_json<P: AsRef<Path>>(series: &TimeSeries, day: NaiveDate, path: P) -> Result<()> {
    let path = path.as_ref();
    let doc = SeriesDocument {
        selector: series.selector.as_str(),
        day,
        samples: series_records(series, day),
    };
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(&doc)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save by extension: `.json` → JSON, anything else → CSV.
pub fn save_series<P: AsRef<Path>>(series: &TimeSeries, day: NaiveDate, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => save_series_json(series, day, path),
        _ => save_series_csv(series, day, path),
    }
}

/// One row per region: name, ISO3, class index under `layer`, then the popup quantities
/// in display units (empty when missing).
pub fn save_regions_csv<P: AsRef<Path>>(
    collection: &FeatureCollection,
    layer: Option<&RegionLayer>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;

    let mut header = vec!["name".to_string(), "iso3".to_string(), "class".to_string()];
    header.extend(popup_rows(&Default::default()).into_iter().map(|r| match r.unit {
        "" => r.label.to_string(),
        unit => format!("{} ({unit})", r.label),
    }));
    wtr.write_record(&header)?;

    for (idx, feature) in collection.iter().enumerate() {
        let props = &feature.properties;
        let mut record = vec![
            region_name(props),
            props.display("ISO3").unwrap_or_default(),
            layer
                .and_then(|l| l.class_of(idx))
                .map(|c| c.to_string())
                .unwrap_or_default(),
        ];
        record.extend(
            popup_rows(props)
                .into_iter()
                .map(|r| r.value.map(|v| format!("{v:.*}", r.decimals)).unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    log::info!("wrote {} regions to {}", collection.len(), path.display());
    Ok(())
}
