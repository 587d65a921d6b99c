use loadmap_rs::FetchError;
use loadmap_rs::panel::{
    Applied, DetailPanelController, FieldOrder, NoDataReason, PanelState, Selector, SourceSchema,
    minute_labels,
};
use loadmap_rs::Properties;
use serde_json::json;

fn props(iso3: &str, level_0: &str, level_1: &str) -> Properties {
    Properties::from_iter([
        ("ISO3", json!(iso3)),
        ("level_0", json!(level_0)),
        ("level_1", json!(level_1)),
    ])
}

#[test]
fn selector_order_depends_on_country() {
    let schema = SourceSchema::default();
    let nga = schema.selector_for(&props("NGA", "Lagos", "Ikeja")).unwrap();
    assert_eq!(nga.as_str(), "('Ikeja', 'Lagos')");
    let gha = schema.selector_for(&props("GHA", "Greater Accra", "Accra")).unwrap();
    assert_eq!(gha.as_str(), "('Greater Accra', 'Accra')");
    assert_eq!(gha.encoded(), "('Greater%20Accra'%2C%20'Accra')");
}

#[test]
fn custom_schema_fields() {
    let schema = SourceSchema::new("country", "a", "b", FieldOrder::Level1First)
        .with_override("KEN", FieldOrder::Level0First);
    let p = Properties::from_iter([("country", json!("KEN")), ("a", json!("x")), ("b", json!("y"))]);
    assert_eq!(schema.selector_for(&p).unwrap(), Selector::new("x", "y"));
    let p = Properties::from_iter([("a", json!("x")), ("b", json!("y"))]);
    assert_eq!(schema.selector_for(&p).unwrap(), Selector::new("y", "x"));
}

#[test]
fn successful_request_renders_chart() {
    let mut panel = DetailPanelController::new(SourceSchema::default());
    assert!(!panel.is_open());
    let req = panel.open(&props("NGA", "Lagos", "Ikeja")).unwrap();
    assert_eq!(panel.pending(), Some(req.token));
    assert_eq!(panel.header().unwrap(), "Analyzing: NGA ('Ikeja', 'Lagos')");

    let values: Vec<f64> = (0..1440).map(|i| i as f64).collect();
    let applied = panel.complete(req.token, Ok(values));
    let chart = panel.chart().unwrap();
    assert_eq!(applied, Applied::Rendered(chart.id));
    assert_eq!(chart.series.len(), 1440);
    assert_eq!(chart.series.labels()[1439], "23:59");
    assert!(panel.pending().is_none());
}

#[test]
fn labels_follow_series_length() {
    let labels = minute_labels(180);
    assert_eq!(labels.len(), 180);
    assert_eq!(labels[0], "00:00");
    assert_eq!(labels[179], "02:59");
}

#[test]
fn not_found_shows_no_data() {
    let mut panel = DetailPanelController::new(SourceSchema::default());
    let req = panel.open(&props("GHA", "Greater Accra", "Accra")).unwrap();
    let applied = panel.complete(req.token, Err(FetchError::NotFound(req.selector.to_string())));
    assert_eq!(applied, Applied::Empty);
    match panel.state() {
        PanelState::Empty { selector, reason } => {
            assert_eq!(selector.as_ref(), Some(&req.selector));
            assert_eq!(*reason, NoDataReason::NotFound);
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert!(panel.is_open());
    assert!(panel.chart().is_none());
}

#[test]
fn server_error_reason() {
    let mut panel = DetailPanelController::new(SourceSchema::default());
    let req = panel.open(&props("NGA", "Kano", "Fagge")).unwrap();
    panel.complete(req.token, Err(FetchError::Status { status: 500 }));
    let PanelState::Empty { reason, .. } = panel.state() else {
        panic!("expected empty panel");
    };
    assert_eq!(reason.to_string(), "server error: 500");
}

#[test]
fn stale_response_is_dropped() {
    let mut panel = DetailPanelController::new(SourceSchema::default());
    let first = panel.open(&props("NGA", "Lagos", "Ikeja")).unwrap();
    let second = panel.open(&props("NGA", "Kano", "Fagge")).unwrap();
    assert_ne!(first.token, second.token);

    // the slow first response arrives after the second request was issued
    assert_eq!(panel.complete(first.token, Ok(vec![1.0; 10])), Applied::Stale);
    assert_eq!(panel.pending(), Some(second.token));

    assert!(matches!(
        panel.complete(second.token, Ok(vec![2.0; 10])),
        Applied::Rendered(_)
    ));
    assert_eq!(panel.chart().unwrap().series.selector, second.selector);
    assert_eq!(panel.complete(second.token, Ok(vec![3.0])), Applied::Stale);
}

#[test]
fn closing_invalidates_pending_request() {
    let mut panel = DetailPanelController::new(SourceSchema::default());
    let req = panel.open(&props("NGA", "Lagos", "Ikeja")).unwrap();
    panel.close();
    assert_eq!(panel.complete(req.token, Ok(vec![1.0])), Applied::Stale);
    assert!(!panel.is_open());
    assert!(panel.header().is_none());
}

#[test]
fn new_chart_replaces_previous() {
    let mut panel = DetailPanelController::new(SourceSchema::default());
    let a = panel.open(&props("NGA", "Lagos", "Ikeja")).unwrap();
    let Applied::Rendered(first) = panel.complete(a.token, Ok(vec![1.0, 2.0])) else {
        panic!("first chart not rendered");
    };
    let b = panel.open(&props("NGA", "Kano", "Fagge")).unwrap();
    // loading hides the old chart
    assert!(panel.chart().is_none());
    let Applied::Rendered(second) = panel.complete(b.token, Ok(vec![3.0])) else {
        panic!("second chart not rendered");
    };
    assert_ne!(first, second);
    assert_eq!(panel.chart().unwrap().series.values, vec![3.0]);
}

#[test]
fn missing_field_yields_empty_panel() {
    let mut panel = DetailPanelController::new(SourceSchema::default());
    let p = Properties::from_iter([("ISO3", json!("NGA")), ("level_0", json!("Lagos"))]);
    assert!(panel.open(&p).is_none());
    assert_eq!(
        panel.state(),
        &PanelState::Empty {
            selector: None,
            reason: NoDataReason::MissingField("level_1".into())
        }
    );
    assert_eq!(panel.header().unwrap(), "Analyzing: NGA");
}
