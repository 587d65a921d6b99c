use loadmap_rs::FetchError;
use loadmap_rs::GeoPoint;
use loadmap_rs::api::{
    Client, LayerSource, SeriesSource, check_status, parse_geocode, parse_series,
};
use loadmap_rs::panel::{NoDataReason, Selector};
use reqwest::StatusCode;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

/// Answer one connection per canned `(status line, body)` on a local port; returns the base URL.
fn serve(responses: Vec<(&'static str, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        }
    });
    format!("http://{addr}")
}

#[test]
fn parse_series_array() {
    let v = parse_series("[0.0, 1.5, 2e3]").unwrap();
    assert_eq!(v, vec![0.0, 1.5, 2000.0]);
    assert!(parse_series("[]").unwrap().is_empty());
}

#[test]
fn parse_series_rejects_garbage() {
    let err = parse_series(r#"{"detail": "Not Found"}"#).unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
    assert!(matches!(
        NoDataReason::from(&err),
        NoDataReason::Malformed(_)
    ));
}

#[test]
fn parse_geocode_takes_first_result() {
    let body = r#"[
        {"lat": "6.6018", "lon": "3.3515", "display_name": "Ikeja, Lagos, Nigeria"},
        {"lat": "0", "lon": "0", "display_name": "elsewhere"}
    ]"#;
    let hit = parse_geocode(body).unwrap().unwrap();
    assert_eq!(hit.point, GeoPoint::new(6.6018, 3.3515));
    assert_eq!(hit.display_name.as_deref(), Some("Ikeja, Lagos, Nigeria"));
}

#[test]
fn parse_geocode_empty_and_bad_coordinates() {
    assert_eq!(parse_geocode("[]").unwrap(), None);
    let err = parse_geocode(r#"[{"lat": "north", "lon": "3.0"}]"#).unwrap_err();
    assert!(matches!(err, FetchError::InvalidCoordinate(ref s) if s == "north"));
}

#[test]
fn status_mapping() {
    assert!(check_status(StatusCode::OK, "x").is_ok());
    assert!(matches!(
        check_status(StatusCode::NOT_FOUND, "('a', 'b')"),
        Err(FetchError::NotFound(ref what)) if what == "('a', 'b')"
    ));
    let err = check_status(StatusCode::BAD_GATEWAY, "x").unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 502 }));
    assert_eq!(NoDataReason::from(&err), NoDataReason::ServerError(502));
}

#[test]
fn request_urls() {
    let client = Client::new("http://localhost:8000/", "https://geo.example.org").unwrap();
    assert_eq!(
        client.series_url(&Selector::new("Ikeja", "Lagos")),
        "http://localhost:8000/get_data/('Ikeja'%2C%20'Lagos')"
    );
    assert_eq!(
        client.geocode_url(" Port Harcourt "),
        "https://geo.example.org/search?format=json&q=Port%20Harcourt"
    );
}

#[test]
fn layer_source_kinds() {
    assert_eq!(
        LayerSource::parse("https://example.org/layers.geojson"),
        LayerSource::Url("https://example.org/layers.geojson".into())
    );
    assert_eq!(
        LayerSource::parse("/static/data/webmap_layers.geojson"),
        LayerSource::Backend("/static/data/webmap_layers.geojson".into())
    );
    assert_eq!(
        LayerSource::parse("data/regions.geojson"),
        LayerSource::File("data/regions.geojson".into())
    );
}

#[test]
fn client_maps_status_before_reading_body() {
    // error bodies hold a valid series that must never reach the chart
    let base = serve(vec![
        ("404 Not Found", "[1.0, 2.0]"),
        ("500 Internal Server Error", "[3.0]"),
        ("200 OK", "[0.5, 1.5]"),
    ]);
    let client = Client::new(base, "http://127.0.0.1:9").unwrap();
    let selector = Selector::new("Ikeja", "Lagos");

    let err = client.fetch_series(&selector).unwrap_err();
    assert!(matches!(err, FetchError::NotFound(ref what) if what == "('Ikeja', 'Lagos')"));
    let err = client.fetch_series(&selector).unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 500 }));
    assert_eq!(client.fetch_series(&selector).unwrap(), vec![0.5, 1.5]);
}
